//! Outdoor ambient conditions.

use af_core::units::constants::T_REF;

/// Ambient (outdoor) conditions shared by the network's boundary nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ambient {
    /// Outdoor temperature (K)
    pub temperature: f64,
    /// Outdoor gauge pressure (Pa)
    pub pressure: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Wind direction (degrees from north)
    pub wind_direction: f64,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            temperature: T_REF,
            pressure: 0.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
        }
    }
}
