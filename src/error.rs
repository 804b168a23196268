use thiserror::Error;

/// Errors that can occur while importing notes as recipes
#[derive(Error, Debug)]
pub enum ImportError {
    /// The note is missing its title or body
    #[error("Malformed note: {0}")]
    MalformedNote(String),

    /// Failed to fetch a page or build an HTTP client
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// A URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The export file is not well-formed XML
    #[error("Failed to read note export: {0}")]
    EnexError(#[from] quick_xml::Error),

    /// Reading an export or writing output failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serializing a recipe record failed
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
