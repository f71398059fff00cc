//! af-transport: contaminant species transport for airflow networks.
//!
//! Advances per-zone, per-species concentrations with a well-mixed zone
//! mass balance. The scheme is implicit (backward Euler) with upwind
//! advection, so species ride the air and never flow against it, and the
//! step stays stable beyond the explicit outflow·Δt/V bound.
//!
//! Also provides:
//! - Species definitions (molar mass, decay, outdoor background)
//! - Source/sink models (constant, exponential decay, pressure driven,
//!   concentration cutoff)
//! - Piecewise-linear schedules
//! - Occupant exposure tracking

pub mod error;
pub mod occupant;
pub mod schedule;
pub mod species;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use occupant::{ExposureRecord, Occupant};
pub use schedule::Schedule;
pub use species::{Source, SourceKind, Species};
pub use transport::{TransportSolver, TransportStep};
