//! Conversion error type

use thiserror::Error;

/// Terminal errors of one conversion. There is no partial-result mode: once
/// one of these is recorded the result string stays empty.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Serializing the assembled document failed.
    #[error("serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The translation worker went away before reporting completion.
    #[error("translation worker exited before completion")]
    WorkerGone,
}
