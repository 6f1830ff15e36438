use qrvmc_core::LoaderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}: {}", .0.code().name(), .0.message())]
    Loader(#[from] LoaderError),
}

impl HarnessError {
    /// Process exit status: 2 for loader failures, 1 for tooling failures.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Loader(_) => 2,
            Self::Io(_) | Self::Json(_) => 1,
        }
    }
}
