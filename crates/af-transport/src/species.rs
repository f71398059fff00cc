//! Species and source/sink definitions.

use af_core::units::constants::M_AIR;

/// A contaminant species tracked by the transport step.
///
/// Species are owned by the transport configuration and referenced by index
/// from the concentration arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: i64,
    pub name: String,
    /// Molar mass (kg/mol), e.g. CO₂ = 0.044
    pub molar_mass: f64,
    /// First-order decay constant (1/s), 0 = no decay
    pub decay_rate: f64,
    /// Outdoor background concentration (kg/m³)
    pub outdoor_concentration: f64,
    /// Trace species carry no density feedback; non-trace species shift the
    /// zone air density through the mixture gas constant
    pub is_trace: bool,
}

impl Species {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            molar_mass: M_AIR,
            decay_rate: 0.0,
            outdoor_concentration: 0.0,
            is_trace: true,
        }
    }

    pub fn with_molar_mass(mut self, molar_mass: f64) -> Self {
        self.molar_mass = molar_mass;
        self
    }

    pub fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    pub fn with_outdoor_concentration(mut self, concentration: f64) -> Self {
        self.outdoor_concentration = concentration;
        self
    }

    pub fn non_trace(mut self) -> Self {
        self.is_trace = false;
        self
    }
}

/// Source model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// G·schedule(t) generation with optional first-order removal sink.
    Constant,
    /// mult·G₀·e^(−elapsed/τ)·schedule(t): liquid spill, spray burst.
    ExponentialDecay,
    /// Generation proportional to |p_zone|: pressure-driven entry.
    PressureDriven,
    /// Generation G while C < cutoff, 0 above it.
    CutoffConcentration,
}

/// Source/sink for one species in one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub zone_id: i64,
    pub species_id: i64,
    pub kind: SourceKind,
    /// Base generation rate (kg/s); G₀ for the decay kind
    pub generation_rate: f64,
    /// First-order removal rate coefficient (1/s), sink term
    pub removal_rate: f64,
    /// Schedule id for time variation; None = always on
    pub schedule_id: Option<i64>,
    /// Time constant τ for ExponentialDecay (s)
    pub decay_time_constant: f64,
    /// Activation time for ExponentialDecay (s)
    pub start_time: f64,
    /// Scaling multiplier for ExponentialDecay
    pub multiplier: f64,
    /// Generation per Pa for PressureDriven (kg/(s·Pa))
    pub pressure_coefficient: f64,
    /// Concentration threshold for CutoffConcentration (kg/m³)
    pub cutoff_concentration: f64,
}

impl Source {
    /// Constant source with optional removal sink.
    pub fn constant(zone_id: i64, species_id: i64, generation_rate: f64, removal_rate: f64) -> Self {
        Self {
            zone_id,
            species_id,
            kind: SourceKind::Constant,
            generation_rate,
            removal_rate,
            schedule_id: None,
            decay_time_constant: 3600.0,
            start_time: 0.0,
            multiplier: 1.0,
            pressure_coefficient: 0.0,
            cutoff_concentration: 0.0,
        }
    }

    /// Exponentially decaying source (spill, spray).
    pub fn decay(zone_id: i64, species_id: i64, g0: f64, tau: f64, start_time: f64) -> Self {
        Self {
            kind: SourceKind::ExponentialDecay,
            generation_rate: g0,
            decay_time_constant: tau,
            start_time,
            ..Self::constant(zone_id, species_id, 0.0, 0.0)
        }
    }

    /// Pressure-driven source: G = coefficient·|p_zone|.
    pub fn pressure_driven(zone_id: i64, species_id: i64, coefficient: f64) -> Self {
        Self {
            kind: SourceKind::PressureDriven,
            pressure_coefficient: coefficient,
            ..Self::constant(zone_id, species_id, 0.0, 0.0)
        }
    }

    /// Cutoff source: G while the zone concentration stays below `cutoff`.
    pub fn cutoff(zone_id: i64, species_id: i64, generation_rate: f64, cutoff: f64) -> Self {
        Self {
            kind: SourceKind::CutoffConcentration,
            generation_rate,
            cutoff_concentration: cutoff,
            ..Self::constant(zone_id, species_id, 0.0, 0.0)
        }
    }

    pub fn with_schedule(mut self, schedule_id: i64) -> Self {
        self.schedule_id = Some(schedule_id);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}
