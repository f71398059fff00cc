//! Occupant exposure tracking.

/// Per-species exposure accumulated by one occupant.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureRecord {
    pub species_idx: usize,
    /// Total inhaled mass (kg)
    pub cumulative_dose: f64,
    /// Maximum concentration encountered (kg/m³)
    pub peak_concentration: f64,
    /// Time when the peak occurred (s)
    pub time_at_peak: f64,
    /// Total time spent in non-zero concentration (s)
    pub total_exposure_time: f64,
}

/// An occupant breathing in a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub id: i64,
    pub name: String,
    /// Node index of the zone the occupant is in
    pub zone_idx: usize,
    /// Breathing rate (m³/s); 1.2e-4 ≈ 7.2 L/min at rest
    pub breathing_rate: f64,
    pub exposure: Vec<ExposureRecord>,
}

impl Occupant {
    pub fn new(id: i64, name: impl Into<String>, zone_idx: usize) -> Self {
        Self {
            id,
            name: name.into(),
            zone_idx,
            breathing_rate: 1.2e-4,
            exposure: Vec::new(),
        }
    }

    pub fn with_breathing_rate(mut self, rate: f64) -> Self {
        self.breathing_rate = rate;
        self
    }

    /// Reset exposure records for the given species count.
    pub fn init_exposure(&mut self, num_species: usize) {
        self.exposure = (0..num_species)
            .map(|species_idx| ExposureRecord {
                species_idx,
                cumulative_dose: 0.0,
                peak_concentration: 0.0,
                time_at_peak: 0.0,
                total_exposure_time: 0.0,
            })
            .collect();
    }

    /// Integrate exposure over one step given the occupant zone's
    /// per-species concentrations.
    pub fn update_exposure(&mut self, zone_concentrations: &[f64], t: f64, dt: f64) {
        for record in &mut self.exposure {
            let Some(&conc) = zone_concentrations.get(record.species_idx) else {
                continue;
            };

            record.cumulative_dose += self.breathing_rate * conc * dt;

            if conc > record.peak_concentration {
                record.peak_concentration = conc;
                record.time_at_peak = t;
            }

            if conc > 1e-15 {
                record.total_exposure_time += dt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dose_accumulates_linearly() {
        let mut occupant = Occupant::new(1, "Worker", 0).with_breathing_rate(1.0e-4);
        occupant.init_exposure(1);

        occupant.update_exposure(&[2.0e-3], 0.0, 60.0);
        occupant.update_exposure(&[2.0e-3], 60.0, 60.0);

        let record = &occupant.exposure[0];
        assert!((record.cumulative_dose - 1.0e-4 * 2.0e-3 * 120.0).abs() < 1e-15);
        assert_eq!(record.total_exposure_time, 120.0);
    }

    #[test]
    fn peak_tracks_time() {
        let mut occupant = Occupant::new(1, "Worker", 0);
        occupant.init_exposure(1);

        occupant.update_exposure(&[1.0e-3], 0.0, 60.0);
        occupant.update_exposure(&[5.0e-3], 60.0, 60.0);
        occupant.update_exposure(&[2.0e-3], 120.0, 60.0);

        let record = &occupant.exposure[0];
        assert_eq!(record.peak_concentration, 5.0e-3);
        assert_eq!(record.time_at_peak, 60.0);
    }

    #[test]
    fn zero_concentration_adds_no_exposure_time() {
        let mut occupant = Occupant::new(1, "Worker", 0);
        occupant.init_exposure(1);
        occupant.update_exposure(&[0.0], 0.0, 60.0);
        assert_eq!(occupant.exposure[0].total_exposure_time, 0.0);
        assert_eq!(occupant.exposure[0].cumulative_dose, 0.0);
    }
}
