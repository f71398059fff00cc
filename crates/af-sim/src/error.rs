//! Error types for transient simulation.

use af_core::AfError;
use af_solver::SolverError;
use af_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Airflow solve failed to converge at t={time}s (halt on failure requested)")]
    StepFailed { time: f64 },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<SimError> for AfError {
    fn from(e: SimError) -> Self {
        AfError::Invariant {
            what: e.to_string(),
        }
    }
}
