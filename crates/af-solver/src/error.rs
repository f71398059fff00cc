//! Error types for solver operations.

use af_core::AfError;
use af_network::NetworkError;
use thiserror::Error;

/// Errors that prevent a solve from producing a result.
///
/// Numeric non-convergence is deliberately absent: it is reported through
/// the result's `converged` flag instead.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Topology error: {0}")]
    Topology(#[from] NetworkError),

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for AfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Topology(err) => err.into(),
            SolverError::InvalidConfig { what } => AfError::InvalidArg { what },
        }
    }
}
