//! Core trait for flow element models.

/// Result of a flow calculation: mass flow rate and its derivative w.r.t. Δp.
///
/// Positive mass flow means flow in the link's from→to direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowAnswer {
    /// Mass flow rate (kg/s)
    pub mass_flow: f64,
    /// d(mass_flow)/d(Δp), used for Jacobian assembly (kg/(s·Pa))
    pub derivative: f64,
}

/// Trait for flow elements relating a pressure difference to a mass flow.
///
/// Elements are deterministic functions of their parameters and inputs:
/// the same (Δp, ρ) always produces the same answer, bit for bit.
pub trait FlowModel {
    /// Compute mass flow rate and derivative given the pressure difference
    /// Δp = p_from − p_to (Pa, including stack correction) and the air
    /// density at the link (kg/m³).
    fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer;

    /// Human-readable type name, matching the JSON `type` tag.
    fn type_name(&self) -> &'static str;
}
