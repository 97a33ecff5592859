use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::{debug, error, info, warn};

use crate::{
    counter::ChannelCounter,
    metadata_log::{log_filename, MetadataLog, MetadataRow},
    outside::VideoProvider,
    pacing::Pacer,
    paths::PathBuilder,
    result::{Error, Result},
    types::{CaptionRecord, CaptionTrack, VideoHandle},
    writers::{write_audio, write_caption, WriteOptions},
};

/// Container format fetched when audio is requested
const AUDIO_MIME: &str = "audio/mp4";

/// Settings for one batch run, fixed at startup
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub language: Option<String>,
    pub group: Option<String>,
    pub include_audio: bool,
    pub include_auto: bool,
    pub convert_srt: bool,
    pub include_titles: bool,
    pub include_channels: bool,
    /// 1-based ordinal of the first line to resolve; lines before it are
    /// skipped without touching the network
    pub resume_from: u64,
    /// Halt after this many processed videos, -1 for no limit
    pub limit_to: i64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            language: None,
            group: None,
            include_audio: false,
            include_auto: false,
            convert_srt: false,
            include_titles: false,
            include_channels: false,
            resume_from: 0,
            limit_to: -1,
        }
    }
}

/// Download captions, optional audio, and metadata for a list of videos.
///
/// No per-video or per-track failure aborts the run; only opening the URL
/// list or the metadata log can fail here.
pub fn process_videos(
    provider: &dyn VideoProvider,
    paths: &PathBuilder,
    pacer: &Pacer,
    urls_path: &Path,
    opts: &BatchOptions,
) -> Result<()> {
    let log_path = paths
        .logs_dir()?
        .join(log_filename(urls_path, opts.group.as_deref()));
    let mut log = MetadataLog::create(&log_path)?;

    let urls_in = File::open(urls_path).map_err(|e| {
        Error::from(e).wrap_err_with(|| format!("Could not open {}", urls_path.display()))
    })?;

    let mut counter = ChannelCounter::new();
    let mut ordinal: u64 = 0;
    let mut processed: i64 = 0;

    for line in BufReader::new(urls_in).lines() {
        let line = line?;
        ordinal += 1;

        // Cheap skip: lines below the resume point are never resolved
        if ordinal < opts.resume_from {
            continue;
        }

        let url = parse_url_line(&line);

        let video = match provider.resolve(url) {
            Ok(video) => video,
            Err(Error::Malformed(msg)) => {
                warn!("Video {ordinal}: could not retrieve URL ({url}): {msg}");
                continue;
            }
            Err(err @ (Error::NotFound | Error::Unavailable)) => {
                warn!("Video {ordinal}: {err} ({url})");
                continue;
            }
            Err(err) => {
                error!("Video {ordinal}: an unexpected error occurred ({url}): {err}");
                continue;
            }
        };

        if let Err(err) = process_video(provider, paths, pacer, &video, &mut counter, &mut log, opts)
        {
            error!("Video {ordinal}: could not log metadata ({url}): {err}");
        }
        processed += 1;

        if opts.limit_to != -1 && processed >= opts.limit_to {
            info!("Limit reached; halting");
            break;
        }

        // Be considerate toward the upstream service
        pacer.after_video();
    }

    Ok(())
}

/// Download captions, audio (optional), and metadata for a single video.
///
/// The per-channel position comes from the counter; a metadata row is
/// emitted if and only if at least one caption track was written.
pub fn process_video(
    provider: &dyn VideoProvider,
    paths: &PathBuilder,
    pacer: &Pacer,
    video: &VideoHandle,
    counter: &mut ChannelCounter,
    log: &mut MetadataLog,
    opts: &BatchOptions,
) -> Result<()> {
    let position = counter.bump(&video.author);

    let write_opts = WriteOptions {
        group: opts.group.as_deref(),
        convert_srt: opts.convert_srt,
        include_title: opts.include_titles,
        include_channel: opts.include_channels,
    };

    let mut caption_records = Vec::new();
    for track in &video.captions {
        if !track_matches(track, opts.language.as_deref(), opts.include_auto) {
            continue;
        }

        if write_caption(provider, paths, track, video, position, &write_opts) {
            caption_records.push(CaptionRecord(track.code.clone(), track.name.clone()));
        }
        pacer.after_caption();
    }

    if opts.include_audio {
        match video.first_stream(AUDIO_MIME) {
            Some(stream) => write_audio(provider, paths, stream, video, position, &write_opts),
            None => debug!(
                "Video {position}: no {AUDIO_MIME} stream available for channel {} ({})",
                video.author, video.title
            ),
        }
    }

    if !caption_records.is_empty() {
        log.append(&MetadataRow::new(video, position, caption_records))?;
    }

    Ok(())
}

/// Whether the track passes the language/auto policy.
///
/// Without a language filter every track is taken, auto-generated ones
/// included. With a filter, the track's display name must contain the
/// requested substring and auto tracks need the explicit opt-in.
fn track_matches(track: &CaptionTrack, language: Option<&str>, include_auto: bool) -> bool {
    match language {
        None => true,
        Some(language) => track.name.contains(language) && (include_auto || !track.is_auto()),
    }
}

/// A line is either tab-delimited `url<TAB>channel_name<TAB>channel_id`
/// or a bare URL; anything that does not split is taken whole.
fn parse_url_line(line: &str) -> &str {
    let line = line.trim_end_matches('\r');
    line.split('\t').next().unwrap_or(line)
}
