//! Duct element with Darcy-Weisbach friction.

use crate::common::{DP_MIN, MU_AIR};
use crate::error::{ElementError, ElementResult};
use crate::traits::{FlowAnswer, FlowModel};

/// Straight duct with wall friction and minor losses.
///
/// The forward relation is Δp = (f·L/D + ΣK)·½·ρ·v² with the friction
/// factor f from the Swamee-Jain correlation (laminar 64/Re below the
/// transition). The network solver needs ṁ(Δp), so the relation is
/// inverted by bisection; the derivative comes from a secant around the
/// solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Duct {
    /// Duct length (m)
    length: f64,
    /// Inner diameter (m)
    diameter: f64,
    /// Absolute surface roughness (m)
    roughness: f64,
    /// Sum of minor-loss K factors (fittings, bends, entries)
    sum_k: f64,
}

impl Duct {
    pub fn new(length: f64, diameter: f64, roughness: f64, sum_k: f64) -> ElementResult<Self> {
        if length <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "duct length must be positive",
            });
        }
        if diameter <= 0.0 {
            return Err(ElementError::InvalidParam {
                what: "duct diameter must be positive",
            });
        }
        if roughness < 0.0 {
            return Err(ElementError::InvalidParam {
                what: "duct roughness must be non-negative",
            });
        }
        if sum_k < 0.0 {
            return Err(ElementError::InvalidParam {
                what: "duct sumK must be non-negative",
            });
        }
        Ok(Self {
            length,
            diameter,
            roughness,
            sum_k,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    pub fn sum_k(&self) -> f64 {
        self.sum_k
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * self.diameter * self.diameter / 4.0
    }

    /// Swamee-Jain friction factor; 64/Re in the laminar regime.
    fn friction_factor(&self, reynolds: f64) -> f64 {
        if reynolds < 2300.0 {
            64.0 / reynolds.max(1.0)
        } else {
            let e_d = self.roughness / self.diameter;
            let a = e_d / 3.7;
            let b = 5.74 / reynolds.powf(0.9);
            let f = 0.25 / (a + b).log10().powi(2);
            f.max(1e-4)
        }
    }

    /// Pressure drop magnitude for a flow magnitude.
    fn pressure_drop_for_mdot(&self, rho: f64, mdot_abs: f64) -> f64 {
        if mdot_abs <= 0.0 {
            return 0.0;
        }
        let area = self.area();
        let velocity = mdot_abs / (rho * area);
        let reynolds = rho * velocity * self.diameter / MU_AIR;
        let f = self.friction_factor(reynolds);

        (f * self.length / self.diameter + self.sum_k) * 0.5 * rho * velocity * velocity
    }

    /// Invert Δp(ṁ) by bisection for a non-negative pressure drop.
    fn solve_mdot(&self, rho: f64, dp_abs: f64) -> f64 {
        const MAX_ITER: usize = 60;

        if dp_abs <= 0.0 {
            return 0.0;
        }

        // Actual friction factor never drops below the turbulent floor, so
        // the loss coefficient floor bounds the velocity from above.
        let k_floor = (self.sum_k + 1e-4 * self.length / self.diameter).max(1e-6);
        let v_max = (2.0 * dp_abs / (rho * k_floor)).sqrt();
        let mut lo = 0.0;
        let mut hi = 2.0 * rho * self.area() * v_max;

        let tol = (1e-9 * dp_abs).max(1e-12);
        for _ in 0..MAX_ITER {
            let mid = 0.5 * (lo + hi);
            let dp_mid = self.pressure_drop_for_mdot(rho, mid);
            if (dp_mid - dp_abs).abs() < tol {
                return mid;
            }
            if dp_mid < dp_abs {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

impl FlowModel for Duct {
    fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer {
        let abs_dp = delta_p.abs();

        if abs_dp < DP_MIN {
            // Chord through the solution at DP_MIN, same treatment as the
            // power-law family
            let mdot_at_min = self.solve_mdot(density, DP_MIN);
            let slope = mdot_at_min / DP_MIN;
            return FlowAnswer {
                mass_flow: slope * delta_p,
                derivative: slope,
            };
        }

        let sign = if delta_p >= 0.0 { 1.0 } else { -1.0 };
        let mdot_abs = self.solve_mdot(density, abs_dp);

        // Secant slope around the operating point
        let ddp = (1e-3 * abs_dp).max(DP_MIN);
        let mdot_hi = self.solve_mdot(density, abs_dp + ddp);
        let derivative = ((mdot_hi - mdot_abs) / ddp).max(1e-12);

        FlowAnswer {
            mass_flow: sign * mdot_abs,
            derivative,
        }
    }

    fn type_name(&self) -> &'static str {
        "Duct"
    }
}
