//! Boundary error types.

use std::path::PathBuf;

use af_elements::ElementError;
use af_network::NetworkError;
use af_sim::SimError;
use af_solver::SolverError;
use thiserror::Error;

/// Errors at the JSON boundary.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown flow element reference: {name}")]
    UnknownElementRef { name: String },

    #[error("Invalid element on link {link}: {source}")]
    Element { link: i64, source: ElementError },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),
}

pub type IoResult<T> = Result<T, IoError>;
