//! Error types for conf-drivers

/// Result type for conf-drivers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing configuration resources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    Parse { format: String, message: String },

    #[error("Failed to render {format} content: {message}")]
    Render { format: String, message: String },

    #[error("No driver for extension: {extension}")]
    UnsupportedFormat { extension: String },

    #[error(transparent)]
    Model(#[from] conf_model::Error),

    #[error(transparent)]
    Fs(#[from] conf_fs::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn render(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            format: format.into(),
            message: message.into(),
        }
    }
}
