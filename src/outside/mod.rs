mod command;
mod ytdl;

pub use ytdl::{VideoProvider, Ytdl};
