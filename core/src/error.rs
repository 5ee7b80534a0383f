use crate::types::FrameIndex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("Malformed snapshot at frame {frame}: {reason}")]
    MalformedSnapshot { frame: FrameIndex, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ObserverError {
    pub fn malformed(frame: FrameIndex, reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot { frame, reason: reason.into() }
    }
}

pub type ObserverResult<T> = Result<T, ObserverError>;
