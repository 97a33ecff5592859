mod video;

pub use video::{AudioStream, CaptionRecord, CaptionTrack, VideoHandle};
