//! Implicit well-mixed zone transport step.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use af_network::Network;

use crate::error::{TransportError, TransportResult};
use crate::schedule::Schedule;
use crate::species::{Source, SourceKind, Species};

/// Snapshot of one transport step.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportStep {
    /// Time at the end of the step (s)
    pub time: f64,
    /// Concentrations `[zone][species]` (kg/m³)
    pub concentrations: Vec<Vec<f64>>,
}

/// Contaminant transport solver.
///
/// Holds the species catalog, sources, schedules, and the carried
/// concentration state. Each [`TransportSolver::step`] advances every
/// species by one backward-Euler step against the airflows currently
/// stored on the network's links:
///
///   (V/Δt + ΣQ_out + λV + R·V)·C^{n+1} − ΣQ_in·(1−η)·C_up^{n+1}
///     = V/Δt·Cⁿ + generation
///
/// Upwind advection: the carried concentration is always the upstream
/// zone's. Ambient zones are boundary conditions pinned to each species'
/// outdoor concentration.
#[derive(Debug, Clone, Default)]
pub struct TransportSolver {
    species: Vec<Species>,
    sources: Vec<Source>,
    schedules: HashMap<i64, Schedule>,
    /// Concentrations `[zone][species]` (kg/m³)
    concentrations: Vec<Vec<f64>>,
    num_zones: usize,
}

impl TransportSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_species(&mut self, species: Vec<Species>) {
        self.species = species;
    }

    pub fn set_sources(&mut self, sources: Vec<Source>) {
        self.sources = sources;
    }

    pub fn set_schedules(&mut self, schedules: Vec<Schedule>) {
        self.schedules = schedules.into_iter().map(|s| (s.id, s)).collect();
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn concentrations(&self) -> &[Vec<f64>] {
        &self.concentrations
    }

    /// Size the concentration state to the network and apply outdoor
    /// boundary values. Fails if a normal zone is missing its volume.
    pub fn initialize(&mut self, network: &Network) -> TransportResult<()> {
        if !self.species.is_empty() {
            for node in network.nodes() {
                if !node.is_known_pressure() && node.volume() <= 0.0 {
                    return Err(TransportError::MissingVolume {
                        zone: node.id,
                        name: node.name.clone(),
                    });
                }
            }
        }

        self.num_zones = network.node_count();
        self.concentrations = vec![vec![0.0; self.species.len()]; self.num_zones];

        for (i, node) in network.nodes().iter().enumerate() {
            if node.is_known_pressure() {
                for (key, species) in self.species.iter().enumerate() {
                    self.concentrations[i][key] = species.outdoor_concentration;
                }
            }
        }

        Ok(())
    }

    /// Seed an initial concentration (kg/m³) for one zone and species.
    pub fn set_initial_concentration(&mut self, zone_idx: usize, species_idx: usize, conc: f64) {
        if zone_idx < self.num_zones && species_idx < self.species.len() {
            self.concentrations[zone_idx][species_idx] = conc;
        }
    }

    fn schedule_value(&self, schedule_id: Option<i64>, t: f64) -> f64 {
        match schedule_id {
            None => 1.0,
            Some(id) => self.schedules.get(&id).map_or(1.0, |s| s.value(t)),
        }
    }

    /// Advance all species from t to t + dt against the link flows stored
    /// on the network.
    pub fn step(&mut self, network: &Network, t: f64, dt: f64) -> TransportResult<TransportStep> {
        if dt <= 0.0 {
            return Err(TransportError::NonPositiveTimeStep { dt });
        }

        if !self.species.is_empty() {
            for key in 0..self.species.len() {
                self.step_species(network, key, t, dt)?;
            }

            // Ambient zones stay at the outdoor background
            for (i, node) in network.nodes().iter().enumerate() {
                if node.is_known_pressure() {
                    for (key, species) in self.species.iter().enumerate() {
                        self.concentrations[i][key] = species.outdoor_concentration;
                    }
                }
            }
        }

        Ok(TransportStep {
            time: t + dt,
            concentrations: self.concentrations.clone(),
        })
    }

    fn step_species(
        &mut self,
        network: &Network,
        key: usize,
        t: f64,
        dt: f64,
    ) -> TransportResult<()> {
        let num_zones = network.node_count();

        // Equation index per zone; ambient zones are boundaries
        let mut unknown_map: Vec<Option<usize>> = Vec::with_capacity(num_zones);
        let mut num_unknown = 0;
        for node in network.nodes() {
            if node.is_known_pressure() {
                unknown_map.push(None);
            } else {
                unknown_map.push(Some(num_unknown));
                num_unknown += 1;
            }
        }

        if num_unknown == 0 {
            return Ok(());
        }

        let mut a = DMatrix::zeros(num_unknown, num_unknown);
        let mut b = DVector::zeros(num_unknown);

        // Storage and decay terms
        for (i, node) in network.nodes().iter().enumerate() {
            let Some(eq) = unknown_map[i] else { continue };
            let volume = node.volume();

            a[(eq, eq)] += volume / dt;
            b[eq] += volume / dt * self.concentrations[i][key];

            let lambda = self.species[key].decay_rate;
            if lambda > 0.0 {
                a[(eq, eq)] += lambda * volume;
            }
        }

        // Advection terms, upwind
        for link in network.links() {
            let i = link.from.index() as usize;
            let j = link.to.index() as usize;
            let mass_flow = link.mass_flow();
            // Filter links remove a fraction of what they carry
            let pass = 1.0 - link.element().filter_efficiency().unwrap_or(0.0);

            if mass_flow > 0.0 {
                // i → j: C_i leaves i, (1−η)·C_i enters j
                let q = mass_flow / network.node(link.from).density();
                self.advect(&mut a, &mut b, &unknown_map, key, i, j, q, pass);
            } else if mass_flow < 0.0 {
                // j → i
                let q = -mass_flow / network.node(link.to).density();
                self.advect(&mut a, &mut b, &unknown_map, key, j, i, q, pass);
            }

            // Stratified large openings mix counter-flowing streams that
            // carry species but no net air mass
            if let Some(opening) = link.element().as_two_way() {
                let rho_i = network.node(link.from).density();
                let rho_j = network.node(link.to).density();
                let exchange = opening.exchange(rho_i, rho_j);
                if exchange > 0.0 {
                    self.advect(&mut a, &mut b, &unknown_map, key, i, j, exchange / rho_i, 1.0);
                    self.advect(&mut a, &mut b, &unknown_map, key, j, i, exchange / rho_j, 1.0);
                }
            }
        }

        // Source and sink terms, evaluated at the end of the step
        for source in &self.sources {
            if source.species_id != self.species[key].id {
                continue;
            }
            let zone = network
                .node_id(source.zone_id)
                .map_err(|_| TransportError::ZoneNotFound {
                    zone: source.zone_id,
                })?;
            let zone_idx = zone.index() as usize;
            let Some(eq) = unknown_map[zone_idx] else {
                continue;
            };

            let schedule_mult = self.schedule_value(source.schedule_id, t + dt);

            match source.kind {
                SourceKind::Constant => {
                    b[eq] += source.generation_rate * schedule_mult;
                }
                SourceKind::ExponentialDecay => {
                    let elapsed = (t + dt) - source.start_time;
                    if elapsed >= 0.0 && source.decay_time_constant > 0.0 {
                        b[eq] += source.multiplier
                            * source.generation_rate
                            * (-elapsed / source.decay_time_constant).exp()
                            * schedule_mult;
                    }
                }
                SourceKind::PressureDriven => {
                    let pressure = network.node(zone).pressure().abs();
                    b[eq] += source.pressure_coefficient * pressure * schedule_mult;
                }
                SourceKind::CutoffConcentration => {
                    if self.concentrations[zone_idx][key] < source.cutoff_concentration {
                        b[eq] += source.generation_rate * schedule_mult;
                    }
                }
            }

            if source.removal_rate > 0.0 {
                let volume = network.node(zone).volume();
                a[(eq, eq)] += source.removal_rate * volume;
            }
        }

        let c_new = a.lu().solve(&b).ok_or(TransportError::SingularSystem {
            species: self.species[key].id,
        })?;

        debug!(species = %self.species[key].name, "transport step solved");

        // Physical floor: round-off must not drive mass negative
        for (i, eq) in unknown_map.iter().enumerate() {
            if let Some(eq) = eq {
                self.concentrations[i][key] = c_new[*eq].max(0.0);
            }
        }

        Ok(())
    }

    /// Add one upwind advection stream from zone `up` into zone `down` with
    /// volumetric rate `q` (m³/s) and pass fraction `pass` = 1−η.
    #[allow(clippy::too_many_arguments)]
    fn advect(
        &self,
        a: &mut DMatrix<f64>,
        b: &mut DVector<f64>,
        unknown_map: &[Option<usize>],
        key: usize,
        up: usize,
        down: usize,
        q: f64,
        pass: f64,
    ) {
        let eq_up = unknown_map[up];
        let eq_down = unknown_map[down];

        if let Some(eq_up) = eq_up {
            // Outflow leaves the upstream zone at full strength
            a[(eq_up, eq_up)] += q;
        }
        if let Some(eq_down) = eq_down {
            match eq_up {
                Some(eq_up) => a[(eq_down, eq_up)] -= q * pass,
                // Ambient upstream: boundary concentration on the RHS
                None => b[eq_down] += q * pass * self.concentrations[up][key],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use af_core::units::m3;
    use af_elements::{Filter, PowerLawOrifice};
    use af_network::{Node, NodeKind};

    fn orifice() -> af_elements::Element {
        PowerLawOrifice::new(0.002, 0.65).unwrap().into()
    }

    /// Two rooms joined to each other and to outdoors; flows set by hand.
    fn two_room_network() -> Network {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Outdoor", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "RoomA", NodeKind::Normal).with_volume(m3(40.0)))
            .unwrap();
        network
            .add_node(Node::new(3, "RoomB", NodeKind::Normal).with_volume(m3(60.0)))
            .unwrap();
        network.add_link(10, 2, 3, 0.0, orifice()).unwrap();
        network.add_link(11, 1, 2, 0.0, orifice()).unwrap();
        network.add_link(12, 3, 1, 0.0, orifice()).unwrap();
        network.update_densities();
        network
    }

    fn total_mass(solver: &TransportSolver, network: &Network, key: usize) -> f64 {
        network
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_known_pressure())
            .map(|(i, n)| solver.concentrations()[i][key] * n.volume())
            .sum()
    }

    #[test]
    fn missing_volume_is_rejected() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Outdoor", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "Room", NodeKind::Normal))
            .unwrap();

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "CO2")]);
        assert!(matches!(
            solver.initialize(&network),
            Err(TransportError::MissingVolume { zone: 2, .. })
        ));
    }

    #[test]
    fn sealed_exchange_conserves_mass() {
        // Counter-flowing streams between the two rooms only: zero net
        // airflow, and total species mass is invariant
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Outdoor", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "RoomA", NodeKind::Normal).with_volume(m3(40.0)))
            .unwrap();
        network
            .add_node(Node::new(3, "RoomB", NodeKind::Normal).with_volume(m3(60.0)))
            .unwrap();
        network.add_link(10, 2, 3, 0.0, orifice()).unwrap();
        network.add_link(11, 2, 3, 0.0, orifice()).unwrap();
        network.update_densities();
        network.link_mut(network.link_id(10).unwrap()).set_mass_flow(0.02);
        network.link_mut(network.link_id(11).unwrap()).set_mass_flow(-0.02);

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "Tracer")]);
        solver.initialize(&network).unwrap();
        solver.set_initial_concentration(1, 0, 1.0e-3);

        let before = total_mass(&solver, &network, 0);
        let mut t = 0.0;
        for _ in 0..400 {
            solver.step(&network, t, 60.0).unwrap();
            t += 60.0;
        }
        let after = total_mass(&solver, &network, 0);

        assert!(
            (before - after).abs() < 1e-9 * before.max(1.0),
            "mass drifted from {before} to {after}"
        );
        // Symmetric exchange mixes the rooms toward a common concentration
        let c = solver.concentrations();
        assert!((c[1][0] - c[2][0]).abs() < 1e-6);
    }

    #[test]
    fn decay_removes_mass() {
        let network = two_room_network();

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "Radon").with_decay_rate(1e-3)]);
        solver.initialize(&network).unwrap();
        solver.set_initial_concentration(1, 0, 1.0e-3);

        let before = total_mass(&solver, &network, 0);
        solver.step(&network, 0.0, 600.0).unwrap();
        let after = total_mass(&solver, &network, 0);
        assert!(after < before);
        assert!(after > 0.0);
    }

    #[test]
    fn constant_source_raises_concentration() {
        let network = two_room_network();

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "CO2").with_molar_mass(0.044)]);
        solver.set_sources(vec![Source::constant(2, 1, 1.0e-6, 0.0)]);
        solver.initialize(&network).unwrap();

        solver.step(&network, 0.0, 60.0).unwrap();
        let c = solver.concentrations();
        assert!(c[1][0] > 0.0);
        // 1 µg/s for 60 s into 40 m³
        assert!((c[1][0] - 1.0e-6 * 60.0 / 40.0).abs() < 1e-12);
    }

    #[test]
    fn ambient_inflow_carries_outdoor_background() {
        let network = {
            let mut n = two_room_network();
            // Outdoor air flows into RoomA, onward to RoomB, and back out
            n.link_mut(n.link_id(11).unwrap()).set_mass_flow(0.05);
            n.link_mut(n.link_id(10).unwrap()).set_mass_flow(0.05);
            n.link_mut(n.link_id(12).unwrap()).set_mass_flow(0.05);
            n
        };

        let mut solver = TransportSolver::new();
        solver.set_species(vec![
            Species::new(1, "CO2").with_outdoor_concentration(7.2e-4),
        ]);
        solver.initialize(&network).unwrap();

        let mut t = 0.0;
        for _ in 0..200 {
            solver.step(&network, t, 60.0).unwrap();
            t += 60.0;
        }

        // Long ventilation washes both rooms to the outdoor background
        let c = solver.concentrations();
        assert!((c[1][0] - 7.2e-4).abs() < 1e-6);
        assert!((c[2][0] - 7.2e-4).abs() < 1e-6);
    }

    #[test]
    fn filter_link_attenuates_carried_species() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Outdoor", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "Dirty", NodeKind::Normal).with_volume(m3(40.0)))
            .unwrap();
        network
            .add_node(Node::new(3, "Clean", NodeKind::Normal).with_volume(m3(40.0)))
            .unwrap();
        network
            .add_link(10, 2, 3, 0.0, Filter::new(0.004, 0.6, 0.9).unwrap().into())
            .unwrap();
        network.add_link(11, 1, 2, 0.0, orifice()).unwrap();
        network.add_link(12, 3, 1, 0.0, orifice()).unwrap();
        network.update_densities();
        network.link_mut(network.link_id(11).unwrap()).set_mass_flow(0.05);
        network.link_mut(network.link_id(10).unwrap()).set_mass_flow(0.05);
        network.link_mut(network.link_id(12).unwrap()).set_mass_flow(0.05);

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "Dust")]);
        solver.set_sources(vec![Source::constant(2, 1, 1.0e-6, 0.0)]);
        solver.initialize(&network).unwrap();

        let mut t = 0.0;
        for _ in 0..500 {
            solver.step(&network, t, 60.0).unwrap();
            t += 60.0;
        }

        let c = solver.concentrations();
        // 90% filter: downstream sits near a tenth of upstream
        assert!(c[2][0] > 0.0);
        let ratio = c[2][0] / c[1][0];
        assert!(
            (ratio - 0.1).abs() < 0.01,
            "filter pass ratio {ratio} should be ~0.1"
        );
    }

    #[test]
    fn large_step_remains_stable_and_non_negative() {
        // Outflow·Δt/V far beyond the explicit stability bound
        let network = {
            let mut n = two_room_network();
            n.link_mut(n.link_id(11).unwrap()).set_mass_flow(-1.0); // RoomA → Outdoor
            n
        };

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "Tracer")]);
        solver.initialize(&network).unwrap();
        solver.set_initial_concentration(1, 0, 1.0e-3);

        // Q·Δt/V = (1/1.2)·3600/40 ≈ 75
        let step = solver.step(&network, 0.0, 3600.0).unwrap();
        for zone in &step.concentrations {
            for &c in zone {
                assert!(c >= 0.0);
                assert!(c.is_finite());
            }
        }
        assert!(step.concentrations[1][0] < 1.0e-3);
    }

    #[test]
    fn scheduled_source_follows_schedule() {
        let network = two_room_network();

        let mut schedule = Schedule::new(5, "off-then-on");
        schedule.add_point(0.0, 0.0);
        schedule.add_point(600.0, 0.0);
        schedule.add_point(601.0, 1.0);

        let mut solver = TransportSolver::new();
        solver.set_species(vec![Species::new(1, "VOC")]);
        solver.set_sources(vec![Source::constant(2, 1, 1.0e-6, 0.0).with_schedule(5)]);
        solver.set_schedules(vec![schedule]);
        solver.initialize(&network).unwrap();

        solver.step(&network, 0.0, 300.0).unwrap();
        assert_eq!(solver.concentrations()[1][0], 0.0);

        solver.step(&network, 900.0, 300.0).unwrap();
        assert!(solver.concentrations()[1][0] > 0.0);
    }
}
