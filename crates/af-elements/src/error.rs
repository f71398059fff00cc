//! Error types for element construction and evaluation.

use af_core::error::AfError;
use thiserror::Error;

/// Errors that can occur constructing or evaluating flow elements.
#[derive(Error, Debug, Clone)]
pub enum ElementError {
    #[error("Invalid parameter: {what}")]
    InvalidParam { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },
}

pub type ElementResult<T> = Result<T, ElementError>;

impl From<ElementError> for AfError {
    fn from(e: ElementError) -> Self {
        match e {
            ElementError::InvalidParam { what } => AfError::InvalidArg { what },
            ElementError::NonPhysical { what } => AfError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ElementError::InvalidParam { what: "C" };
        assert!(err.to_string().contains("C"));
    }

    #[test]
    fn error_conversion() {
        let elem_err = ElementError::NonPhysical { what: "density" };
        let af_err: AfError = elem_err.into();
        assert!(matches!(af_err, AfError::InvalidArg { .. }));
    }
}
