use tracing::{debug, error};

use crate::{
    outside::VideoProvider,
    paths::{safe_filename, OutputKind, PathBuilder},
    types::{AudioStream, CaptionTrack, VideoHandle},
};

/// Output naming and placement settings shared by all writes of one run
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions<'a> {
    pub group: Option<&'a str>,
    pub convert_srt: bool,
    pub include_title: bool,
    pub include_channel: bool,
}

/// Download one caption track next to its language/auto siblings.
///
/// Returns true only on a confirmed successful write. Every failure is
/// logged with the video's position, author, and title, and reported as
/// false; nothing is raised further.
pub fn write_caption(
    provider: &dyn VideoProvider,
    paths: &PathBuilder,
    track: &CaptionTrack,
    video: &VideoHandle,
    position: u64,
    opts: &WriteOptions,
) -> bool {
    let channel = opts.include_channel.then_some(video.author.as_str());
    let dir = match paths.resolve_output_dir(OutputKind::Captions, opts.group, Some(track), channel)
    {
        Ok(dir) => dir,
        Err(e) => {
            error!(
                "Video {position}: could not create caption directory for channel {} ({}): {e}",
                video.author, video.title
            );
            return false;
        }
    };

    let extension = if opts.convert_srt { "srt" } else { "vtt" };
    let dest = dir.join(format!(
        "{}.{extension}",
        filename_stem(video, position, opts.include_title)
    ));

    match provider.download_caption(&video.id, track, &dest, opts.convert_srt) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Video {position}: could not download caption track {} for channel {} ({}): {e}",
                track.code, video.author, video.title
            );
            false
        }
    }
}

/// Download one audio stream, best-effort.
///
/// A file already present at the destination is left untouched and no
/// transfer happens. Failures are logged and swallowed; the caller never
/// learns of them.
pub fn write_audio(
    provider: &dyn VideoProvider,
    paths: &PathBuilder,
    stream: &AudioStream,
    video: &VideoHandle,
    position: u64,
    opts: &WriteOptions,
) {
    let channel = opts.include_channel.then_some(video.author.as_str());
    let dir = match paths.resolve_output_dir(OutputKind::Audio, opts.group, None, channel) {
        Ok(dir) => dir,
        Err(e) => {
            error!(
                "Video {position}: could not create audio directory for channel {} ({}): {e}",
                video.author, video.title
            );
            return;
        }
    };

    let dest = dir.join(format!(
        "{}.{}",
        filename_stem(video, position, opts.include_title),
        stream.ext
    ));

    if dest.exists() {
        debug!(
            "Video {position}: audio already present at {}, skipping",
            dest.display()
        );
        return;
    }

    if let Err(e) = provider.download_audio(&video.id, stream, &dest) {
        error!(
            "Video {position}: could not save audio stream for channel {} ({}): {e}",
            video.author, video.title
        );
    }
}

/// `<safe-author>_<position>` with the sanitized title appended when requested
fn filename_stem(video: &VideoHandle, position: u64, include_title: bool) -> String {
    let author = safe_filename(&video.author);
    if include_title {
        format!("{author}_{position}_{}", safe_filename(&video.title))
    } else {
        format!("{author}_{position}")
    }
}
