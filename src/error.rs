use thiserror::Error;

/// Main error type for the decision core
#[derive(Error, Debug)]
pub enum SharplineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Artifact errors
    #[error("Malformed pick artifact: {0}")]
    MalformedArtifact(String),

    // Generation collaborator errors
    #[error("Pick generation failed: {0}")]
    Generation(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SharplineError
pub type Result<T> = std::result::Result<T, SharplineError>;

/// Specific error types for the external pick generator
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("Generator returned an empty response")]
    EmptyResponse,

    #[error("Timeout after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

impl From<GenerationError> for SharplineError {
    fn from(err: GenerationError) -> Self {
        SharplineError::Generation(err.to_string())
    }
}
