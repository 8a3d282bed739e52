//! Error types for host-side tooling

/// Error type for ROM loading, configuration and rendering
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a configuration or script file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WAV encoder failure
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// ROM image that cannot be mapped
    #[error("ROM format error: {0}")]
    RomFormat(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid write script
    #[error("Script error: {0}")]
    Script(String),
}

/// Result type for host-side operations
pub type Result<T> = std::result::Result<T, SimError>;
