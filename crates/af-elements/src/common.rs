//! Common constants and helpers for element calculations.

use crate::error::{ElementError, ElementResult};
use af_core::numeric::ensure_finite;

/// Pressure difference below which power-law elements are linearized (Pa)
pub const DP_MIN: f64 = 1e-3;

/// Dynamic viscosity of air near room temperature (Pa·s)
pub const MU_AIR: f64 = 1.81e-5;

/// Ensure a value is finite, returning ElementError if not.
pub fn check_finite(value: f64, what: &'static str) -> ElementResult<()> {
    ensure_finite(value, what).map_err(|_| ElementError::NonPhysical { what })?;
    Ok(())
}

/// Validate a flow exponent: 0.5 = fully turbulent, 1.0 = laminar.
pub fn check_exponent(n: f64) -> ElementResult<()> {
    if !(0.5..=1.0).contains(&n) {
        return Err(ElementError::InvalidParam {
            what: "flow exponent n must be in [0.5, 1.0]",
        });
    }
    Ok(())
}
