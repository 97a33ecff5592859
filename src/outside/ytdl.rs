use std::{
    ffi::OsStr,
    fs,
    path::Path,
    process::{Command, Output},
    sync::OnceLock,
};

use regex::Regex;
use serde_json::Value;

use super::command::{assert_success_command, run_command, Capture, YT_DL, YT_DLP};
use crate::{
    result::{bail, Error, Result},
    types::{AudioStream, CaptionTrack, VideoHandle},
};

/// Interface to the video platform: resolving URLs into video handles
/// and downloading individual tracks.
pub trait VideoProvider {
    /// Resolve a video URL into its metadata and downloadable tracks.
    ///
    /// Failures are classified into the [`Error`] taxonomy so the caller
    /// can pick a log level and keep the batch going.
    fn resolve(&self, url: &str) -> Result<VideoHandle>;

    /// Download one caption track to the destination path.
    /// `convert_srt` selects SRT output instead of the native VTT.
    fn download_caption(
        &self,
        video_id: &str,
        track: &CaptionTrack,
        dest: &Path,
        convert_srt: bool,
    ) -> Result<()>;

    /// Download one audio stream to the destination path.
    fn download_audio(&self, video_id: &str, stream: &AudioStream, dest: &Path) -> Result<()>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
pub struct Ytdl {
    program: &'static str,
}

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new() -> Result<Self> {
        // Check `yt-dlp`
        if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self { program: YT_DLP })
        } else if assert_success_command(YT_DL, |cmd| cmd.arg("--version")).is_ok() {
            // Check `youtube-dl`
            Ok(Self { program: YT_DL })
        } else {
            bail("Neither yt-dlp nor youtube-dl found")
        }
    }

    /// Run the command and classify `ERROR:` lines on stderr into the
    /// typed failure taxonomy. In other cases, return the output handle.
    fn run_classified<F>(&self, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(self.program, f, capture | Capture::STDERR)?;

        let stderr = String::from_utf8_lossy(&res.stderr);
        if let Some(err) = classify_stderr(&stderr) {
            Err(err)
        } else {
            Ok(res)
        }
    }
}

impl VideoProvider for Ytdl {
    fn resolve(&self, url: &str) -> Result<VideoHandle> {
        let res = self.run_classified(
            |cmd| {
                cmd.arg("-q")
                    .arg("--skip-download")
                    .arg("-j")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT,
        )?;

        if !res.status.success() {
            let stderr = String::from_utf8_lossy(&res.stderr);
            return Err(Error::Malformed(format!(
                "metadata query failed: {}",
                stderr.trim()
            )));
        }

        let output = String::from_utf8_lossy(&res.stdout);
        parse_video(&output)
    }

    fn download_caption(
        &self,
        video_id: &str,
        track: &CaptionTrack,
        dest: &Path,
        convert_srt: bool,
    ) -> Result<()> {
        // yt-dlp decides its own subtitle filename suffixes, so download
        // into a scratch directory and move the result to the destination
        let scratch = tempfile::tempdir()?;

        let (sub_flag, lang) = match track.auto_base_language() {
            Some(base) => ("--write-auto-subs", base),
            None => ("--write-subs", track.code.as_str()),
        };
        let target_ext = if convert_srt { "srt" } else { "vtt" };

        let res = self.run_classified(
            |cmd| {
                let cmd = cmd
                    .arg("-q")
                    .arg("--skip-download")
                    .arg(sub_flag)
                    .args(["--sub-langs", lang])
                    .args(["--sub-format", "vtt/best"]);

                if convert_srt {
                    cmd.args(["--convert-subs", "srt"]);
                }

                cmd.args([OsStr::new("-P"), scratch.path().as_os_str()])
                    .args(["-o", "track"])
                    .arg("--")
                    .arg(video_id)
            },
            Capture::empty(),
        )?;

        if !res.status.success() {
            return bail("Command did run but was not successful");
        }

        let produced = find_by_extension(scratch.path(), target_ext)?
            .ok_or_else(|| Error::Malformed(format!("no .{target_ext} file was produced")))?;

        // Rename can fail across filesystems, so copy instead
        fs::copy(&produced, dest).map_err(|e| {
            Error::from(e).wrap_err_with(|| format!("Could not write {}", dest.display()))
        })?;
        Ok(())
    }

    fn download_audio(&self, video_id: &str, stream: &AudioStream, dest: &Path) -> Result<()> {
        let res = self.run_classified(
            |cmd| {
                cmd.arg("-q")
                    .args([OsStr::new("-o"), dest.as_os_str()])
                    .arg("--no-continue") // Or else fails when file already exists, even an empty one
                    .args(["-f", &stream.format_id])
                    .arg("--add-metadata")
                    // 2 lines below to force setting the video title & uploader (https://github.com/yt-dlp/yt-dlp/issues/904)
                    .args(["--parse-metadata", "%(title)s:%(meta_title)s"])
                    .args(["--parse-metadata", "%(uploader)s:%(meta_artist)s"])
                    .arg("--")
                    .arg(video_id)
            },
            Capture::empty(),
        )?;

        if res.status.success() {
            Ok(())
        } else {
            bail("Command did run but was not successful")
        }
    }
}

/// Map `ERROR:` lines of the program's stderr to a typed failure
fn classify_stderr(stderr: &str) -> Option<Error> {
    static NOT_FOUND: OnceLock<Regex> = OnceLock::new();
    static UNAVAILABLE: OnceLock<Regex> = OnceLock::new();
    static TRANSIENT: OnceLock<Regex> = OnceLock::new();

    let not_found = NOT_FOUND.get_or_init(|| {
        Regex::new(r"(?i)does not exist|not found|is not a valid url|unsupported url|incomplete( youtube)? id").unwrap()
    });
    let unavailable = UNAVAILABLE.get_or_init(|| {
        Regex::new(r"(?i)unavailable|private video|has been removed|account.*terminated|members-only").unwrap()
    });
    let transient = TRANSIENT.get_or_init(|| {
        Regex::new(r"(?i)timed? ?out|connection|network|temporar|http error (429|5\d\d)").unwrap()
    });

    for line in stderr.lines().filter(|l| l.starts_with("ERROR:")) {
        if not_found.is_match(line) {
            return Some(Error::NotFound);
        }
        if unavailable.is_match(line) {
            return Some(Error::Unavailable);
        }
        if transient.is_match(line) {
            return Some(Error::Transient(line.trim().to_owned()));
        }
    }
    None
}

/// Parse the single-video `-j` JSON dump into a [`VideoHandle`]
fn parse_video(json_text: &str) -> Result<VideoHandle> {
    let json: Value = serde_json::from_str(json_text)
        .map_err(|e| Error::Malformed(format!("invalid metadata JSON: {e}")))?;
    let json = json
        .as_object()
        .ok_or_else(|| Error::Malformed("metadata is not a JSON object".to_owned()))?;

    let require_str = |key: &str| -> Result<String> {
        json.get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::Malformed(format!("key '{key}' missing or not a string")))
    };
    let get_str = |key: &str| -> String {
        json.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    };
    let get_u64 = |key: &str| json.get(key).and_then(Value::as_u64).unwrap_or(0);

    let keywords = json
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let mut captions = parse_caption_tracks(json.get("subtitles"), false);
    captions.extend(parse_caption_tracks(json.get("automatic_captions"), true));

    Ok(VideoHandle {
        id: require_str("id")?,
        author: require_str("uploader").or_else(|_| require_str("channel"))?,
        title: require_str("title")?,
        description: get_str("description"),
        keywords,
        length: get_u64("duration"),
        publish_date: get_str("upload_date"),
        views: get_u64("view_count"),
        rating: json.get("average_rating").and_then(Value::as_f64),
        captions,
        streams: parse_audio_streams(json.get("formats")),
    })
}

/// Collect the caption tracks of one `subtitles`-shaped JSON map.
/// Auto-generated tracks get the `a.` code prefix.
fn parse_caption_tracks(map: Option<&Value>, auto: bool) -> Vec<CaptionTrack> {
    let Some(map) = map.and_then(Value::as_object) else {
        return Vec::new();
    };

    map.iter()
        // yt-dlp lists the live chat replay among the subtitles
        .filter(|(lang, _)| lang.as_str() != "live_chat")
        .map(|(lang, entries)| {
            let name = entries
                .as_array()
                .and_then(|a| a.first())
                .and_then(|e| e.get("name"))
                .and_then(Value::as_str)
                .unwrap_or(lang)
                .to_owned();

            let code = if auto {
                format!("a.{lang}")
            } else {
                lang.clone()
            };
            CaptionTrack::new(code, name)
        })
        .collect()
}

/// Collect the audio-only entries of the `formats` JSON array
fn parse_audio_streams(formats: Option<&Value>) -> Vec<AudioStream> {
    let Some(formats) = formats.and_then(Value::as_array) else {
        return Vec::new();
    };

    formats
        .iter()
        .filter(|f| {
            let audio = f.get("acodec").and_then(Value::as_str).unwrap_or("none") != "none";
            let video = f.get("vcodec").and_then(Value::as_str).unwrap_or("none") != "none";
            audio && !video
        })
        .filter_map(|f| {
            let format_id = f.get("format_id")?.as_str()?.to_owned();
            let ext = f
                .get("ext")
                .and_then(Value::as_str)
                .unwrap_or("m4a")
                .to_owned();
            let mime_type = match ext.as_str() {
                "m4a" | "mp4" => "audio/mp4".to_owned(),
                other => format!("audio/{other}"),
            };
            Some(AudioStream {
                format_id,
                mime_type,
                ext,
            })
        })
        .collect()
}

/// The first file in the directory with the given extension, if any
fn find_by_extension(dir: &Path, extension: &str) -> Result<Option<std::path::PathBuf>> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(OsStr::to_str) == Some(extension) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unavailable_and_not_found() {
        let gone = "ERROR: [youtube] dQw4w9WgXcQ: Video unavailable";
        assert!(matches!(classify_stderr(gone), Some(Error::Unavailable)));

        let bad = "ERROR: 'https:/broken' is not a valid URL";
        assert!(matches!(classify_stderr(bad), Some(Error::NotFound)));

        let flaky = "ERROR: unable to download: HTTP Error 429: Too Many Requests";
        assert!(matches!(classify_stderr(flaky), Some(Error::Transient(_))));

        // Non-ERROR lines are ignored
        assert!(classify_stderr("WARNING: video unavailable-ish").is_none());
        assert!(classify_stderr("").is_none());
    }

    #[test]
    fn parses_metadata_with_both_caption_kinds() {
        let json = r#"{
            "id": "abc123",
            "uploader": "Chan",
            "title": "A Video",
            "description": "desc",
            "tags": ["one", "two"],
            "duration": 63,
            "upload_date": "20210601",
            "view_count": 42,
            "average_rating": 4.5,
            "subtitles": {
                "ko": [{"ext": "vtt", "name": "Korean"}],
                "live_chat": [{"ext": "json"}]
            },
            "automatic_captions": {
                "en": [{"ext": "vtt", "name": "English (auto-generated)"}]
            },
            "formats": [
                {"format_id": "22", "acodec": "mp4a", "vcodec": "avc1", "ext": "mp4"},
                {"format_id": "140", "acodec": "mp4a", "vcodec": "none", "ext": "m4a"},
                {"format_id": "249", "acodec": "opus", "vcodec": "none", "ext": "webm"}
            ]
        }"#;

        let video = parse_video(json).unwrap();
        assert_eq!(video.id, "abc123");
        assert_eq!(video.author, "Chan");
        assert_eq!(video.length, 63);
        assert_eq!(video.rating, Some(4.5));

        // live_chat is not a caption track
        assert_eq!(
            video.captions,
            vec![
                CaptionTrack::new("ko", "Korean"),
                CaptionTrack::new("a.en", "English (auto-generated)"),
            ]
        );

        // The muxed format 22 is not an audio stream
        assert_eq!(video.streams.len(), 2);
        assert_eq!(
            video.first_stream("audio/mp4").map(|s| s.format_id.as_str()),
            Some("140")
        );
    }

    #[test]
    fn missing_required_key_is_malformed() {
        let err = parse_video(r#"{"id": "abc123", "title": "A Video"}"#).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));

        let err = parse_video("not json at all").unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }
}
