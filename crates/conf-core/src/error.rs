//! Error types for conf-core

/// Result type for conf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort loading, merging or binding.
///
/// Failures resolving a single parameter are not errors of this kind; they
/// are [`conf_model::ParameterError`]s recorded on the parameter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid resolver options
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// A configurable target rejected a value
    #[error("Cannot set field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    // Transparent wrappers for underlying crate errors
    /// Model error from conf-model, fatal to the layer being merged
    #[error(transparent)]
    Model(#[from] conf_model::Error),

    /// Driver error from conf-drivers
    #[error(transparent)]
    Drivers(#[from] conf_drivers::Error),

    /// Filesystem error from conf-fs
    #[error(transparent)]
    Fs(#[from] conf_fs::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
