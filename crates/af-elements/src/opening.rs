//! Large-opening (doorway/window) element with bidirectional exchange.

use af_core::units::constants::G0_MPS2;

use crate::common::DP_MIN;
use crate::error::{ElementError, ElementResult};
use crate::traits::{FlowAnswer, FlowModel};

/// Two-way flow through a large opening (door, window).
///
/// The bulk term driving the pressure solve is the orifice equation
/// Q = Cd·A·√(2·|Δp|/ρ). Density stratification across the opening also
/// drives counter-flowing streams that carry no net mass; that exchange is
/// exposed separately through [`TwoWayFlow::exchange`] and consumed by the
/// contaminant transport step, since it moves species but not air mass.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoWayFlow {
    /// Discharge coefficient (typically 0.6-0.78)
    cd: f64,
    /// Opening area (m²)
    area: f64,
}

impl TwoWayFlow {
    pub fn new(cd: f64, area: f64) -> ElementResult<Self> {
        if cd <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "TwoWayFlow Cd must be positive",
            });
        }
        if area <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "TwoWayFlow area must be positive",
            });
        }
        Ok(Self { cd, area })
    }

    pub fn discharge_coefficient(&self) -> f64 {
        self.cd
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Buoyancy-driven bidirectional exchange rate (kg/s in each direction).
    ///
    /// When the zones on either side are stratified (ρ_from ≠ ρ_to), warm
    /// air crosses the top of the opening while cool air returns along the
    /// bottom. The two streams cancel in the air mass balance but mix
    /// species. Exchange flow per the integrated opening profile:
    /// Q_ex = Cd·(A/3)·√(g·|Δρ|·H/ρ̄) with H = √A as the characteristic
    /// opening height.
    pub fn exchange(&self, rho_from: f64, rho_to: f64) -> f64 {
        let d_rho = (rho_from - rho_to).abs();
        if d_rho < 1e-12 {
            return 0.0;
        }
        let rho_mean = 0.5 * (rho_from + rho_to);
        let height = self.area.sqrt();
        let q_ex = self.cd * (self.area / 3.0) * (G0_MPS2 * d_rho * height / rho_mean).sqrt();
        rho_mean * q_ex
    }
}

impl FlowModel for TwoWayFlow {
    fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer {
        let abs_dp = delta_p.abs();

        if abs_dp < DP_MIN {
            // Chord through the orifice law at DP_MIN keeps flow continuous
            let slope = self.cd * self.area * (2.0 * density / DP_MIN).sqrt();
            return FlowAnswer {
                mass_flow: slope * delta_p,
                derivative: slope,
            };
        }

        let sign = if delta_p >= 0.0 { 1.0 } else { -1.0 };
        let q = self.cd * self.area * (2.0 * abs_dp / density).sqrt();

        FlowAnswer {
            mass_flow: density * q * sign,
            // d(ṁ)/d(Δp) = 0.5·Cd·A·√(2ρ/|Δp|)
            derivative: 0.5 * self.cd * self.area * (2.0 * density / abs_dp).sqrt(),
        }
    }

    fn type_name(&self) -> &'static str {
        "TwoWayFlow"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_params() {
        assert!(TwoWayFlow::new(0.0, 2.0).is_err());
        assert!(TwoWayFlow::new(0.65, -2.0).is_err());
    }

    #[test]
    fn bulk_flow_matches_orifice_equation() {
        let opening = TwoWayFlow::new(0.65, 2.0).unwrap();
        let rho: f64 = 1.2;
        let dp: f64 = 10.0;
        let expected = rho * 0.65 * 2.0 * (2.0 * dp / rho).sqrt();
        let answer = opening.flow(dp, rho);
        assert!((answer.mass_flow - expected).abs() < 1e-12);
    }

    #[test]
    fn reverse_dp_reverses_flow() {
        let opening = TwoWayFlow::new(0.65, 2.0).unwrap();
        let fwd = opening.flow(10.0, 1.2);
        let rev = opening.flow(-10.0, 1.2);
        assert!((fwd.mass_flow + rev.mass_flow).abs() < 1e-12);
    }

    #[test]
    fn exchange_zero_without_stratification() {
        let opening = TwoWayFlow::new(0.65, 2.0).unwrap();
        assert_eq!(opening.exchange(1.2, 1.2), 0.0);
    }

    #[test]
    fn exchange_grows_with_density_difference() {
        let opening = TwoWayFlow::new(0.65, 2.0).unwrap();
        let small = opening.exchange(1.20, 1.21);
        let large = opening.exchange(1.16, 1.25);
        assert!(small > 0.0);
        assert!(large > small);
    }
}
