use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidUsage,
    InternalInconsistency,
}

#[derive(Error, Debug)]
pub enum DenoiseError {
    // Missing or mismatched bindings, bad options, missing or malformed weights
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Calls made in the wrong filter state
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    // Dimension or graph mismatches the build should have ruled out
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl DenoiseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DenoiseError::Configuration(_) => ErrorKind::Configuration,
            DenoiseError::InvalidUsage(_) => ErrorKind::InvalidUsage,
            DenoiseError::InternalInconsistency(_) => ErrorKind::InternalInconsistency,
            DenoiseError::ThreadPool(_) => ErrorKind::Configuration,
        }
    }

    pub fn config<T: ToString>(msg: T) -> Self {
        DenoiseError::Configuration(msg.to_string())
    }

    pub fn usage<T: ToString>(msg: T) -> Self {
        DenoiseError::InvalidUsage(msg.to_string())
    }

    pub fn internal<T: ToString>(msg: T) -> Self {
        DenoiseError::InternalInconsistency(msg.to_string())
    }
}
