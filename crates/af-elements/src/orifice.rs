//! Power-law orifice element.

use crate::common::{DP_MIN, check_exponent};
use crate::error::{ElementError, ElementResult};
use crate::traits::{FlowAnswer, FlowModel};

/// Power-law orifice: ṁ = ρ·C·|Δp|ⁿ·sign(Δp).
///
/// Models cracks, vents, and other leakage paths. Below `DP_MIN` the law is
/// replaced by the chord through (DP_MIN, flow(DP_MIN)) so the flow stays
/// continuous and the derivative stays bounded as n < 1 drives the true
/// slope to infinity at Δp = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerLawOrifice {
    /// Flow coefficient (m³/(s·Paⁿ))
    c: f64,
    /// Flow exponent: 0.5 = turbulent, 1.0 = laminar, typical 0.5-0.65
    n: f64,
    /// Chord slope of the linear regime, without the density factor
    linear_slope: f64,
}

impl PowerLawOrifice {
    pub fn new(c: f64, n: f64) -> ElementResult<Self> {
        if c <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "flow coefficient C must be positive",
            });
        }
        check_exponent(n)?;

        // Chord slope at the DP_MIN boundary: flow(DP_MIN)/DP_MIN = C·DP_MINⁿ⁻¹.
        // Guarantees flow continuity where the two regimes meet.
        let linear_slope = c * DP_MIN.powf(n - 1.0);

        Ok(Self { c, n, linear_slope })
    }

    pub fn flow_coefficient(&self) -> f64 {
        self.c
    }

    pub fn flow_exponent(&self) -> f64 {
        self.n
    }
}

impl FlowModel for PowerLawOrifice {
    fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer {
        let abs_dp = delta_p.abs();

        if abs_dp < DP_MIN {
            // Linearized regime: avoid derivative singularity near zero
            let slope = density * self.linear_slope;
            FlowAnswer {
                mass_flow: slope * delta_p,
                derivative: slope,
            }
        } else {
            let sign = if delta_p >= 0.0 { 1.0 } else { -1.0 };
            let flow = self.c * abs_dp.powf(self.n);
            FlowAnswer {
                mass_flow: density * flow * sign,
                // d(ṁ)/d(Δp) = ρ·n·C·|Δp|ⁿ⁻¹, always positive
                derivative: density * self.n * self.c * abs_dp.powf(self.n - 1.0),
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "PowerLawOrifice"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_bad_params() {
        assert!(PowerLawOrifice::new(0.0, 0.65).is_err());
        assert!(PowerLawOrifice::new(-1.0, 0.65).is_err());
        assert!(PowerLawOrifice::new(0.002, 0.4).is_err());
        assert!(PowerLawOrifice::new(0.002, 1.2).is_err());
    }

    #[test]
    fn zero_dp_zero_flow() {
        let orifice = PowerLawOrifice::new(0.002, 0.65).unwrap();
        let answer = orifice.flow(0.0, 1.2);
        assert_eq!(answer.mass_flow, 0.0);
        assert!(answer.derivative > 0.0);
        assert!(answer.derivative.is_finite());
    }

    #[test]
    fn antisymmetric_in_dp() {
        let orifice = PowerLawOrifice::new(0.002, 0.65).unwrap();
        let fwd = orifice.flow(25.0, 1.2);
        let rev = orifice.flow(-25.0, 1.2);
        assert!((fwd.mass_flow + rev.mass_flow).abs() < 1e-15);
        assert!((fwd.derivative - rev.derivative).abs() < 1e-15);
    }

    #[test]
    fn continuous_at_linearization_boundary() {
        let orifice = PowerLawOrifice::new(0.002, 0.65).unwrap();
        let below = orifice.flow(DP_MIN * (1.0 - 1e-9), 1.2);
        let above = orifice.flow(DP_MIN * (1.0 + 1e-9), 1.2);
        assert!((below.mass_flow - above.mass_flow).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn monotone_in_dp(
            c in 1e-5..1.0f64,
            n in 0.5..1.0f64,
            dp_a in -100.0..100.0f64,
            dp_b in -100.0..100.0f64,
        ) {
            let orifice = PowerLawOrifice::new(c, n).unwrap();
            let (lo, hi) = if dp_a <= dp_b { (dp_a, dp_b) } else { (dp_b, dp_a) };
            let flow_lo = orifice.flow(lo, 1.2).mass_flow;
            let flow_hi = orifice.flow(hi, 1.2).mass_flow;
            prop_assert!(flow_lo <= flow_hi + 1e-12);
        }

        #[test]
        fn derivative_always_positive(
            c in 1e-5..1.0f64,
            n in 0.5..1.0f64,
            dp in -1000.0..1000.0f64,
        ) {
            let orifice = PowerLawOrifice::new(c, n).unwrap();
            let answer = orifice.flow(dp, 1.2);
            prop_assert!(answer.derivative > 0.0);
            prop_assert!(answer.derivative.is_finite());
        }
    }
}
