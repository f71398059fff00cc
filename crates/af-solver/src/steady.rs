//! Steady-state solve results.

/// Immutable snapshot of one steady-state airflow solve.
///
/// Arrays are indexed by node/link position in the owning network. Ambient
/// nodes report their fixed boundary pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyResult {
    /// True when the max residual met tolerance within the iteration cap.
    pub converged: bool,
    /// Newton iterations performed.
    pub iterations: usize,
    /// Max absolute nodal mass residual at exit (kg/s).
    pub max_residual: f64,
    /// Gauge pressure per node (Pa).
    pub pressures: Vec<f64>,
    /// Air density per node (kg/m³).
    pub densities: Vec<f64>,
    /// Signed mass flow per link, positive = from→to (kg/s).
    pub mass_flows: Vec<f64>,
    /// Volumetric flow per link, mass flow over upstream density (m³/s).
    pub volume_flows: Vec<f64>,
}
