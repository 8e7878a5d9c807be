//! Error taxonomy for a transfer run.
//!
//! Only `InvalidArguments` and `FetchFailed` ever halt a run. The per-line
//! and per-record variants are produced, logged and then dropped by the
//! parser and the workflow.

use crate::defaults::Defaults;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Missing or unusable `--from`/`--to` values
    #[error("invalid command line arguments: {0}")]
    InvalidArguments(String),

    /// The source enumeration call failed; nothing was migrated
    #[error("failed to get credstash data from {env}")]
    FetchFailed {
        env: String,
        #[source]
        source: StoreError,
    },

    /// Fewer than two distinct double quotes in a span
    #[error("no quotes found in span of {len} bytes")]
    NoQuotesFound { len: usize },

    /// A dump line without a usable `"key": "value"` shape
    #[error("cannot process line of {len} bytes")]
    MalformedRecordLine { len: usize },

    #[error("failed to delete {key} in {env}")]
    DeleteFailed {
        key: String,
        env: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to set {key} in {env} (is it already set?)")]
    PutFailed {
        key: String,
        env: String,
        #[source]
        source: StoreError,
    },
}

impl TransferError {
    /// Process exit status for errors that end the run.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            TransferError::InvalidArguments(_) => Defaults::EXIT_INVALID_ARGUMENTS,
            TransferError::FetchFailed { .. } => Defaults::EXIT_FETCH_FAILED,
            _ => Defaults::EXIT_FAILURE,
        }
    }
}
