// 8.0.2: top level error for session operations. each boundary keeps its own kind.

use crate::config::ConfigError;
use crate::input::RejectedInput;
use crate::provider::{ProviderError, SubmissionError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Rejected input: {0}")]
    RejectedInput(#[from] RejectedInput),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

pub type Result<T> = std::result::Result<T, Error>;
