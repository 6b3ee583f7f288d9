//! Error types for conf-expr

use conf_model::ParameterError;

/// Result type for expression evaluation
pub type Result<T> = std::result::Result<T, Error>;

/// Expression failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Unsafe operation: {operation}")]
    Unsafe { operation: String },

    #[error("Unknown name: {name}")]
    NameResolution { name: String },

    #[error("{message}")]
    Evaluation { message: String },

    #[error("Unknown expression language: {name}")]
    UnknownLanguage { name: String },

    /// Failure of a referenced parameter, passed through unchanged
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

impl Error {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}

impl From<Error> for ParameterError {
    fn from(err: Error) -> Self {
        match err {
            Error::Syntax { position, message } => {
                ParameterError::ExpressionSyntax { position, message }
            }
            Error::Unsafe { operation } => ParameterError::UnsafeExpression { operation },
            Error::NameResolution { name } => ParameterError::NameResolution { name },
            Error::Evaluation { message } => ParameterError::Evaluation { message },
            Error::UnknownLanguage { name } => ParameterError::UnknownLanguage { name },
            Error::Parameter(inner) => inner,
        }
    }
}
