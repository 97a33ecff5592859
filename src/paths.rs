use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    result::{Error, Result},
    types::CaptionTrack,
};

const CAPTIONS_ROOT: &str = "raw_subtitles";
const AUDIO_ROOT: &str = "raw_audio";
const LOGS_ROOT: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Captions,
    Audio,
}

/// Computes and creates output directories under the corpus root.
///
/// Layout: `<root>/raw_subtitles/[<group>/]{auto/<lang>|manual/<code>}/[<channel>/]`
/// and `<root>/raw_audio/[<group>/][<channel>/]`.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    root: PathBuf,
}

impl PathBuilder {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve the output directory for one write and make sure it exists.
    ///
    /// The caption track is only consulted for [`OutputKind::Captions`],
    /// where it selects the `auto/<lang>` or `manual/<code>` subfolder.
    pub fn resolve_output_dir(
        &self,
        kind: OutputKind,
        group: Option<&str>,
        track: Option<&CaptionTrack>,
        channel: Option<&str>,
    ) -> Result<PathBuf> {
        let mut dir = self.root.join(match kind {
            OutputKind::Captions => CAPTIONS_ROOT,
            OutputKind::Audio => AUDIO_ROOT,
        });

        if let Some(group) = group {
            dir.push(group);
        }

        if kind == OutputKind::Captions {
            if let Some(track) = track {
                match track.auto_base_language() {
                    Some(base) => {
                        dir.push("auto");
                        dir.push(base);
                    }
                    None => {
                        dir.push("manual");
                        dir.push(&track.code);
                    }
                }
            }
        }

        if let Some(channel) = channel {
            dir.push(safe_filename(channel));
        }

        fs::create_dir_all(&dir).map_err(|e| {
            Error::from(e).wrap_err_with(|| format!("Could not create {}", dir.display()))
        })?;
        Ok(dir)
    }

    /// The metadata log directory, created on first use
    pub fn logs_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join(LOGS_ROOT);
        fs::create_dir_all(&dir).map_err(|e| {
            Error::from(e).wrap_err_with(|| format!("Could not create {}", dir.display()))
        })?;
        Ok(dir)
    }
}

/// Strip path separators, reserved characters, and control characters
/// so channel names and titles are safe as file or folder names.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
