//! Error types for the transport step.

use af_core::AfError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Zone id {zone} not found in the network")]
    ZoneNotFound { zone: i64 },

    #[error("Zone {zone} ({name}) needs a positive volume for transport")]
    MissingVolume { zone: i64, name: String },

    #[error("Time step must be positive (got {dt})")]
    NonPositiveTimeStep { dt: f64 },

    #[error("Transport system is singular for species {species}")]
    SingularSystem { species: i64 },
}

pub type TransportResult<T> = Result<T, TransportError>;

impl From<TransportError> for AfError {
    fn from(err: TransportError) -> Self {
        AfError::Invariant {
            what: err.to_string(),
        }
    }
}
