mod batch;
mod cli;
mod counter;
mod logging;
mod metadata_log;
mod outside;
mod pacing;
mod paths;
mod result;
mod types;
mod writers;

use std::time::Duration;

use clap::Parser;
use miette::miette;
use tracing::{info, Level};

use crate::{batch::BatchOptions, cli::Args, outside::Ytdl, pacing::Pacer, paths::PathBuilder};

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logging::init_logging(level)?;

    if !args.urls_in.is_file() {
        return Err(miette!("url list must be a file: {}", args.urls_in.display()));
    }

    let provider = Ytdl::new()?;
    let paths = PathBuilder::new(&args.out);
    let pacer = Pacer::new(Duration::from_secs_f64(args.delay.max(0.0)));

    if args.resume > 0 {
        info!("Resuming from video {}", args.resume);
    }

    let opts = BatchOptions {
        language: args.language,
        group: args.group,
        include_audio: args.audio,
        include_auto: args.auto,
        convert_srt: args.srt,
        include_titles: args.titles,
        include_channels: args.channels,
        resume_from: args.resume,
        limit_to: args.limit,
    };

    batch::process_videos(&provider, &paths, &pacer, &args.urls_in, &opts)?;

    info!("All videos processed");
    Ok(())
}
