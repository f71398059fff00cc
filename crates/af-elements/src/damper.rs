//! Damper element: a power-law orifice with a variable opening fraction.

use crate::common::{DP_MIN, check_exponent};
use crate::error::{ElementError, ElementResult};
use crate::traits::{FlowAnswer, FlowModel};

/// Minimum effective coefficient treated as fully closed.
const C_EFF_CLOSED: f64 = 1e-15;

/// Damper with a mutable opening fraction.
///
/// Effective coefficient C_eff = C_max·fraction. Fully open reproduces the
/// equivalent power-law orifice; fully closed yields zero flow with a tiny
/// positive derivative so the Jacobian row stays nonsingular. The fraction
/// is the only element state mutable after construction, which is what lets
/// control networks drive dampers between solves.
#[derive(Debug, Clone, PartialEq)]
pub struct Damper {
    /// Flow coefficient at full open (m³/(s·Paⁿ))
    c_max: f64,
    /// Flow exponent (0.5-1.0)
    n: f64,
    /// Opening fraction in [0, 1]
    fraction: f64,
    /// Effective coefficient = c_max·fraction
    c_eff: f64,
}

impl Damper {
    pub fn new(c_max: f64, n: f64, fraction: f64) -> ElementResult<Self> {
        if c_max <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "damper Cmax must be positive",
            });
        }
        check_exponent(n)?;

        let fraction = fraction.clamp(0.0, 1.0);
        Ok(Self {
            c_max,
            n,
            fraction,
            c_eff: c_max * fraction,
        })
    }

    pub fn c_max(&self) -> f64 {
        self.c_max
    }

    pub fn flow_exponent(&self) -> f64 {
        self.n
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Set the opening fraction, clamped to [0, 1].
    pub fn set_fraction(&mut self, fraction: f64) {
        self.fraction = fraction.clamp(0.0, 1.0);
        self.c_eff = self.c_max * self.fraction;
    }
}

impl FlowModel for Damper {
    fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer {
        if self.c_eff < C_EFF_CLOSED {
            return FlowAnswer {
                mass_flow: 0.0,
                derivative: C_EFF_CLOSED,
            };
        }

        let abs_dp = delta_p.abs();

        if abs_dp < DP_MIN {
            let slope = density * self.c_eff * DP_MIN.powf(self.n - 1.0);
            FlowAnswer {
                mass_flow: slope * delta_p,
                derivative: slope,
            }
        } else {
            let sign = if delta_p >= 0.0 { 1.0 } else { -1.0 };
            FlowAnswer {
                mass_flow: density * self.c_eff * abs_dp.powf(self.n) * sign,
                derivative: density * self.n * self.c_eff * abs_dp.powf(self.n - 1.0),
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "Damper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orifice::PowerLawOrifice;
    use proptest::prelude::*;

    #[test]
    fn fraction_clamps() {
        let mut damper = Damper::new(0.01, 0.65, 1.5).unwrap();
        assert_eq!(damper.fraction(), 1.0);
        damper.set_fraction(-0.3);
        assert_eq!(damper.fraction(), 0.0);
        damper.set_fraction(0.4);
        assert_eq!(damper.fraction(), 0.4);
    }

    #[test]
    fn closed_damper_blocks_flow() {
        let damper = Damper::new(0.01, 0.65, 0.0).unwrap();
        for dp in [0.0, 5.0, -50.0, 1000.0] {
            let answer = damper.flow(dp, 1.2);
            assert_eq!(answer.mass_flow, 0.0);
            assert!(answer.derivative > 0.0);
        }
    }

    #[test]
    fn full_open_matches_orifice() {
        let damper = Damper::new(0.01, 0.65, 1.0).unwrap();
        let orifice = PowerLawOrifice::new(0.01, 0.65).unwrap();
        for dp in [-80.0, -0.5, 0.0, 0.5, 80.0] {
            let d = damper.flow(dp, 1.2);
            let o = orifice.flow(dp, 1.2);
            assert!((d.mass_flow - o.mass_flow).abs() < 1e-12);
            assert!((d.derivative - o.derivative).abs() < 1e-12);
        }
    }

    proptest! {
        #[test]
        fn flow_scales_with_fraction(
            frac_a in 0.0..1.0f64,
            frac_b in 0.0..1.0f64,
            dp in 0.1..500.0f64,
        ) {
            let mut damper = Damper::new(0.01, 0.65, frac_a).unwrap();
            let flow_a = damper.flow(dp, 1.2).mass_flow;
            damper.set_fraction(frac_b);
            let flow_b = damper.flow(dp, 1.2).mass_flow;
            if frac_a <= frac_b {
                prop_assert!(flow_a <= flow_b + 1e-12);
            } else {
                prop_assert!(flow_b <= flow_a + 1e-12);
            }
        }
    }
}
