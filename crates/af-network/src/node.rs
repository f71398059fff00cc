//! Zone nodes.

use af_core::units::constants::{P_ATM, T_REF, air_density};
use af_core::units::{Length, Pressure, Temperature, Volume};

/// Node category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Standard room/zone node with unknown pressure.
    Normal,
    /// Outdoor environment: pressure is a boundary condition, not an unknown.
    Ambient,
}

/// A zone node: a control volume with uniform pressure, temperature, and
/// (in transient mode) contaminant concentration.
///
/// Pressures are gauge (relative to atmospheric); density follows the ideal
/// gas law from the absolute pressure and temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub name: String,
    pub kind: NodeKind,
    temperature: f64, // K
    elevation: f64,   // m, base elevation of the zone
    volume: f64,      // m³, meaningful for Normal nodes only
    pressure: f64,    // Pa gauge
    density: f64,     // kg/m³, derived
}

impl Node {
    pub fn new(id: i64, name: impl Into<String>, kind: NodeKind) -> Self {
        let mut node = Self {
            id,
            name: name.into(),
            kind,
            temperature: T_REF,
            elevation: 0.0,
            volume: 0.0,
            pressure: 0.0,
            density: 0.0,
        };
        node.update_density();
        node
    }

    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature.value;
        self.update_density();
        self
    }

    pub fn with_elevation(mut self, elevation: Length) -> Self {
        self.elevation = elevation.value;
        self
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume.value;
        self
    }

    pub fn with_pressure(mut self, pressure: Pressure) -> Self {
        self.pressure = pressure.value;
        self.update_density();
        self
    }

    /// Temperature (K).
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
        self.update_density();
    }

    /// Base elevation (m).
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn set_elevation(&mut self, elevation: f64) {
        self.elevation = elevation;
    }

    /// Zone volume (m³).
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    /// Gauge pressure (Pa).
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
    }

    /// Air density (kg/m³), from the last density update.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Recompute density from the ideal gas law at the current state.
    pub fn update_density(&mut self) {
        if self.temperature > 0.0 {
            self.density = air_density(P_ATM + self.pressure, self.temperature);
        }
    }

    /// Override the derived density (used for non-trace species feedback).
    pub fn set_density(&mut self, density: f64) {
        self.density = density;
    }

    /// Ambient nodes carry a fixed boundary pressure.
    pub fn is_known_pressure(&self) -> bool {
        self.kind == NodeKind::Ambient
    }
}
