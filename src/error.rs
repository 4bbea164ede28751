//! Terminal failures of a single extraction run.
//!
//! None of these are recovered from inside the pipeline. The binary turns each
//! variant into one diagnostic line and a distinct exit code so callers can
//! script around the exact stage that failed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Google Drive URL: {url}")]
    InvalidInputUrl { url: String },

    /// The page no longer carries the stream map key. Usually means the host
    /// changed its page format.
    #[error("stream manifest not found in Google Drive response")]
    ManifestNotFound,

    #[error("stream manifest in Google Drive response is not terminated")]
    ManifestUnterminated,

    #[error("stream record #{index} ({record:?}) is malformed: {reason}")]
    RecordParse {
        index: usize,
        record: String,
        reason: String,
    },

    #[error("gave up fetching page after {attempts} attempt(s): {last_failure}")]
    FetchExhausted { attempts: u32, last_failure: String },

    #[error("page fetch cancelled")]
    Cancelled,
}

impl Error {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidInputUrl { .. } => 2,
            Error::ManifestNotFound | Error::ManifestUnterminated => 3,
            Error::RecordParse { .. } => 4,
            Error::FetchExhausted { .. } => 5,
            Error::Cancelled => 6,
        }
    }
}
