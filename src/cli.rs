use std::path::PathBuf;

use clap::Parser;

macro_rules! arg_env {
    ($v:literal) => {
        concat!("CAPGRAB_", $v)
    };
}

/// Download available caption tracks, audio streams, and metadata
/// from a list of web video URLs.
///
/// Each line of the URL list is either a bare URL or a tab-delimited
/// `url<TAB>channel_name<TAB>channel_id` record.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to a file containing the URLs to scrape
    #[clap(env=arg_env!("URLS_IN"))]
    pub urls_in: PathBuf,

    /// Filter captions by language name (e.g. "Korean").
    /// If unspecified, all caption tracks will be downloaded
    #[clap(short, long, env=arg_env!("LANGUAGE"))]
    pub language: Option<String>,

    /// A name for the group, used for output subfolders and the log file.
    /// If unspecified, channel names will be used
    #[clap(short = 'n', long, value_name = "NAME", env=arg_env!("GROUP"))]
    pub group: Option<String>,

    /// Include automatically-generated captions
    #[clap(short, long)]
    pub auto: bool,

    /// Download audio in addition to captions
    #[clap(short = 's', long)]
    pub audio: bool,

    /// Include video titles in caption and audio filenames
    #[clap(short, long)]
    pub titles: bool,

    /// Organize captions and audio into folders by channel
    #[clap(short, long)]
    pub channels: bool,

    /// Convert captions to SRT format
    #[clap(long)]
    pub srt: bool,

    /// Resume downloading from the Nth video, skipping the lines before it
    #[clap(long, value_name = "N", default_value_t = 0)]
    pub resume: u64,

    /// Limit processing to N videos from the resume point (-1 for no limit)
    #[clap(long, value_name = "N", default_value_t = -1, allow_hyphen_values = true)]
    pub limit: i64,

    /// The path to the corpus output directory
    #[clap(long, default_value = "corpus", env=arg_env!("OUT"))]
    pub out: PathBuf,

    /// Seconds to wait between network operations, to stay polite
    /// toward the upstream service
    #[clap(long, value_name = "SECS", default_value_t = 1.0, env=arg_env!("DELAY"))]
    pub delay: f64,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,
}
