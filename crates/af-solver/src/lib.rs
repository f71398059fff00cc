//! af-solver: steady-state airflow network solver.
//!
//! Newton-Raphson over the unknown pressures at normal nodes, enforcing
//! mass continuity at every node. Two globalization strategies are
//! available: plain sub-relaxation and a trust-region step clamp (default).
//!
//! Non-convergence is not an error: the returned [`SteadyResult`] carries
//! `converged = false` together with the last iterate, so callers can
//! inspect partial pressures and flows or retry with a different
//! configuration. Topology failures, by contrast, produce no result.

pub mod error;
pub mod solver;
pub mod steady;

pub use error::{SolverError, SolverResult};
pub use solver::{Solver, SolverConfig, SolverMethod};
pub use steady::SteadyResult;
