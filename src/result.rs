use std::fmt::Display;

use miette::miette;

/// Failure kinds surfaced by the video provider.
///
/// The batch driver inspects the kind to decide the log level and whether
/// to keep going; nothing here is allowed to abort a run.
#[derive(Debug)]
pub enum Error {
    /// The URL does not resolve to any known video
    NotFound,

    /// The video exists but cannot be fetched (private, removed, region-locked)
    Unavailable,

    /// The provider answered with something that could not be parsed
    Malformed(String),

    /// Network-level failure that may succeed on a later run
    Transient(String),

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Miette(miette!("{err}"))
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => miette!("Video not found"),
            Error::Unavailable => miette!("Video unavailable"),
            Error::Malformed(msg) => miette!("Malformed provider response: {msg}"),
            Error::Transient(msg) => miette!("Transient provider failure: {msg}"),
            Error::Miette(err) => err,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound => write!(f, "video not found"),
            Error::Unavailable => write!(f, "video unavailable"),
            Error::Malformed(msg) => write!(f, "malformed provider response: {msg}"),
            Error::Transient(msg) => write!(f, "transient provider failure: {msg}"),
            Error::Miette(err) => write!(f, "{err}"),
        }
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }
}

pub fn bail<T>(msg: &str) -> Result<T> {
    Err(Error::Miette(miette!("{msg}")))
}

pub type Result<T> = std::result::Result<T, Error>;
