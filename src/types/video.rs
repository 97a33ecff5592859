use serde::Serialize;

/// Code prefix marking an automatically-generated caption track
const AUTO_PREFIX: &str = "a.";

/// A resolved video and everything downloadable from it.
///
/// Immutable once resolved; owned by the batch driver for the duration
/// of one URL and discarded after.
#[derive(Debug, Clone)]
pub struct VideoHandle {
    pub id: String,
    pub author: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    /// Duration in seconds
    pub length: u64,
    pub publish_date: String,
    pub views: u64,
    pub rating: Option<f64>,
    pub captions: Vec<CaptionTrack>,
    pub streams: Vec<AudioStream>,
}

impl VideoHandle {
    /// The first downloadable stream with the given MIME type, if any
    pub fn first_stream(&self, mime_type: &str) -> Option<&AudioStream> {
        self.streams.iter().find(|s| s.mime_type == mime_type)
    }
}

/// A timed-text track attached to a video.
///
/// Auto-generated tracks carry an `a.` code prefix (e.g. `a.en`),
/// human-authored tracks use the bare language code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub code: String,
    pub name: String,
}

impl CaptionTrack {
    pub fn new<S1: Into<String>, S2: Into<String>>(code: S1, name: S2) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    pub fn is_auto(&self) -> bool {
        self.code.starts_with(AUTO_PREFIX)
    }

    /// The base language code of an auto-generated track (`a.en` -> `en`).
    /// Return None for human-authored tracks.
    pub fn auto_base_language(&self) -> Option<&str> {
        self.code.strip_prefix(AUTO_PREFIX)
    }
}

/// A selectable audio stream, filterable by MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub format_id: String,
    pub mime_type: String,
    /// File extension of the stream container, without the dot
    pub ext: String,
}

/// (code, display name) pair recorded for every caption track
/// successfully written to disk. Serializes as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionRecord(pub String, pub String);
