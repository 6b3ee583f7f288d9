//! Error types for conf-model

/// Result type for conf-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that corrupt the model while it is being built.
///
/// These are fatal to the layer being loaded or merged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Duplicate parameter {category}.{parameter} in layer {layer}")]
    DuplicateName {
        layer: String,
        category: String,
        parameter: String,
    },

    #[error("Invalid name pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unknown parameter type: {text}")]
    UnknownType { text: String },

    #[error("Type declared for {category}.{parameter} in layer {layer} without a value")]
    OrphanType {
        layer: String,
        category: String,
        parameter: String,
    },
}

/// A failure attached to a single parameter during resolution.
///
/// Parameter errors never abort a resolution pass; they are recorded on the
/// parameter and reported alongside the values that did resolve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("Unresolvable reference {reference}: {reason}")]
    Reference { reference: String, reason: String },

    #[error("Cyclic reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error("Invalid expression at offset {position}: {message}")]
    ExpressionSyntax { position: usize, message: String },

    #[error("Unsafe expression: {operation} is not allowed")]
    UnsafeExpression { operation: String },

    #[error("Cannot resolve name {name}")]
    NameResolution { name: String },

    #[error("Cannot convert {value} to {target}: {reason}")]
    TypeConversion {
        value: String,
        target: String,
        reason: String,
    },

    #[error("Expression evaluation failed: {message}")]
    Evaluation { message: String },

    #[error("Unknown expression language: {name}")]
    UnknownLanguage { name: String },
}

impl ParameterError {
    pub fn reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}
