use std::{io, path::PathBuf};

/// Errors raised while probing or decoding an Ogg/Vorbis file.
#[derive(thiserror::Error, Debug)]
pub enum OggPcmError {
    #[error("cannot open Ogg/Vorbis file {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("cannot create PCM file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error reading from Ogg stream: {0}")]
    StreamRead(String),
    #[error("error writing PCM output: {0}")]
    Write(#[source] io::Error),
    #[error("unsupported configuration: {0}")]
    Unsupported(String),
    #[cfg(feature = "aac")]
    #[error("AAC encode error: {0}")]
    Encode(String),
    #[error("{role} task failed: {details}")]
    TaskJoin { role: &'static str, details: String },
}

impl OggPcmError {
    pub(crate) fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        OggPcmError::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<lewton::VorbisError> for OggPcmError {
    fn from(err: lewton::VorbisError) -> Self {
        OggPcmError::StreamRead(err.to_string())
    }
}
