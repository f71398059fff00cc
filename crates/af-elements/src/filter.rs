//! Filter element: power-law airflow path with species removal.

use crate::common::{DP_MIN, check_exponent};
use crate::error::{ElementError, ElementResult};
use crate::traits::{FlowAnswer, FlowModel};

/// Filter passing airflow as a power-law orifice while removing a fraction
/// of carried contaminants: C_out = C_in·(1 − η).
///
/// The efficiency does not affect the air mass balance; it is applied by the
/// transport step to concentrations advected through the link.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Flow coefficient (m³/(s·Paⁿ))
    c: f64,
    /// Flow exponent (0.5-1.0)
    n: f64,
    /// Removal efficiency η in [0, 1]
    efficiency: f64,
}

impl Filter {
    pub fn new(c: f64, n: f64, efficiency: f64) -> ElementResult<Self> {
        if c <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "filter C must be positive",
            });
        }
        check_exponent(n)?;

        Ok(Self {
            c,
            n,
            efficiency: efficiency.clamp(0.0, 1.0),
        })
    }

    pub fn flow_coefficient(&self) -> f64 {
        self.c
    }

    pub fn flow_exponent(&self) -> f64 {
        self.n
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }
}

impl FlowModel for Filter {
    fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer {
        let abs_dp = delta_p.abs();

        if abs_dp < DP_MIN {
            let slope = density * self.c * DP_MIN.powf(self.n - 1.0);
            FlowAnswer {
                mass_flow: slope * delta_p,
                derivative: slope,
            }
        } else {
            let sign = if delta_p >= 0.0 { 1.0 } else { -1.0 };
            FlowAnswer {
                mass_flow: density * self.c * abs_dp.powf(self.n) * sign,
                derivative: density * self.n * self.c * abs_dp.powf(self.n - 1.0),
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "Filter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_clamps() {
        let filter = Filter::new(0.004, 0.6, 1.4).unwrap();
        assert_eq!(filter.efficiency(), 1.0);
        let filter = Filter::new(0.004, 0.6, -0.2).unwrap();
        assert_eq!(filter.efficiency(), 0.0);
    }

    #[test]
    fn airflow_ignores_efficiency() {
        let leaky = Filter::new(0.004, 0.6, 0.0).unwrap();
        let tight = Filter::new(0.004, 0.6, 0.99).unwrap();
        let a = leaky.flow(30.0, 1.2);
        let b = tight.flow(30.0, 1.2);
        assert_eq!(a.mass_flow, b.mass_flow);
    }
}
