//! Engine error type

/// Errors surfaced by the annotation engine
///
/// All of these are local and recoverable; the host decides whether to show
/// feedback or ignore them.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation not supported for {0}")]
    NotSupported(&'static str),

    #[error("drawing surface error: {0}")]
    Surface(String),

    #[error("font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
