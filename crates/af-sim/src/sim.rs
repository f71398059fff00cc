//! Transient simulation runner.

use tracing::{info, warn};

use af_core::units::constants::{M_AIR, P_ATM, R_AIR};
use af_network::Network;
use af_solver::{Solver, SolverMethod, SteadyResult};
use af_transport::{Occupant, Schedule, Source, Species, TransportSolver};

use crate::controls::{Actuator, ActuatorKind, Controller, Sensor, SensorKind};
use crate::error::{SimError, SimResult};

/// Transient run configuration.
#[derive(Debug, Clone)]
pub struct TransientConfig {
    /// Start time (s)
    pub start_time: f64,
    /// End time (s)
    pub end_time: f64,
    /// Time step (s)
    pub time_step: f64,
    /// Recording interval (s)
    pub output_interval: f64,
    /// Airflow update strategy
    pub method: SolverMethod,
    /// Abort the run when a step's airflow solve fails to converge
    pub halt_on_failure: bool,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 3600.0,
            time_step: 60.0,
            output_interval: 60.0,
            method: SolverMethod::default(),
            halt_on_failure: false,
        }
    }
}

/// One recorded time step.
#[derive(Debug, Clone)]
pub struct TimeStepRecord {
    /// Time at the end of the step (s)
    pub time: f64,
    /// Airflow snapshot for this step
    pub airflow: SteadyResult,
    /// Concentrations `[zone][species]`; empty without species
    pub concentrations: Vec<Vec<f64>>,
}

/// Result of a transient run.
#[derive(Debug, Clone)]
pub struct TransientResult {
    /// False when the run was cancelled or halted before the end time
    pub completed: bool,
    pub history: Vec<TimeStepRecord>,
}

/// Progress callback: (current time, end time) → keep going?
pub type ProgressCallback = Box<dyn FnMut(f64, f64) -> bool>;

/// Transient simulation over a network.
///
/// Step order: control loop, quasi-steady airflow, contaminant transport
/// (with optional non-trace density feedback), occupant exposure,
/// recording.
#[derive(Default)]
pub struct TransientSimulation {
    config: TransientConfig,
    species: Vec<Species>,
    sources: Vec<Source>,
    schedules: Vec<Schedule>,
    occupants: Vec<Occupant>,
    sensors: Vec<Sensor>,
    controllers: Vec<Controller>,
    actuators: Vec<Actuator>,
    progress: Option<ProgressCallback>,
}

impl TransientSimulation {
    pub fn new(config: TransientConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TransientConfig {
        &self.config
    }

    pub fn set_species(&mut self, species: Vec<Species>) {
        self.species = species;
    }

    pub fn set_sources(&mut self, sources: Vec<Source>) {
        self.sources = sources;
    }

    pub fn set_schedules(&mut self, schedules: Vec<Schedule>) {
        self.schedules = schedules;
    }

    pub fn set_occupants(&mut self, occupants: Vec<Occupant>) {
        self.occupants = occupants;
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn set_controls(
        &mut self,
        sensors: Vec<Sensor>,
        controllers: Vec<Controller>,
        actuators: Vec<Actuator>,
    ) {
        self.sensors = sensors;
        self.controllers = controllers;
        self.actuators = actuators;
    }

    /// Install a progress callback; returning false cancels the run.
    pub fn set_progress_callback(&mut self, callback: impl FnMut(f64, f64) -> bool + 'static) {
        self.progress = Some(Box::new(callback));
    }

    /// Run the transient simulation.
    pub fn run(&mut self, network: &mut Network) -> SimResult<TransientResult> {
        if self.config.time_step <= 0.0 {
            return Err(SimError::InvalidConfig {
                what: "time_step must be positive",
            });
        }
        if self.config.end_time < self.config.start_time {
            return Err(SimError::InvalidConfig {
                what: "end_time must not precede start_time",
            });
        }
        if self.config.output_interval <= 0.0 {
            return Err(SimError::InvalidConfig {
                what: "output_interval must be positive",
            });
        }

        let airflow_solver = Solver::new(self.config.method);

        let has_species = !self.species.is_empty();
        let mut transport = TransportSolver::new();
        if has_species {
            transport.set_species(self.species.clone());
            transport.set_sources(self.sources.clone());
            transport.set_schedules(self.schedules.clone());
            transport.initialize(network)?;
            for occupant in &mut self.occupants {
                occupant.init_exposure(self.species.len());
            }
        }

        let mut result = TransientResult {
            completed: false,
            history: Vec::new(),
        };

        let mut t = self.config.start_time;
        let dt = self.config.time_step;

        // Initial airflow solve and record
        let mut airflow = airflow_solver.solve(network)?;
        result.history.push(TimeStepRecord {
            time: t,
            airflow: airflow.clone(),
            concentrations: transport.concentrations().to_vec(),
        });
        let mut next_output = self.config.start_time + self.config.output_interval;

        info!(
            start = self.config.start_time,
            end = self.config.end_time,
            dt,
            "transient run started"
        );

        while t < self.config.end_time - 1e-10 {
            // Land the final step exactly on the end time
            let current_dt = dt.min(self.config.end_time - t);

            // Control loop: sample, regulate, actuate
            if !self.controllers.is_empty() {
                update_sensors(&mut self.sensors, network, &transport);
                update_controllers(&mut self.controllers, &self.sensors);
                apply_actuators(&mut self.actuators, &self.controllers, network);
            }

            // Quasi-steady airflow at this step's state
            airflow = airflow_solver.solve(network)?;
            if !airflow.converged {
                if self.config.halt_on_failure {
                    return Err(SimError::StepFailed { time: t });
                }
                warn!(time = t, "airflow step did not converge");
            }

            // Species transport and density feedback
            let mut concentrations = Vec::new();
            if has_species {
                let step = transport.step(network, t, current_dt)?;
                concentrations = step.concentrations;

                if self.species.iter().any(|s| !s.is_trace) {
                    apply_density_feedback(network, &self.species, transport.concentrations());
                    let resolved = airflow_solver.solve(network)?;
                    if resolved.converged {
                        airflow = resolved;
                    }
                }
            }

            t += current_dt;

            if has_species {
                for occupant in &mut self.occupants {
                    if let Some(zone) = transport.concentrations().get(occupant.zone_idx) {
                        let zone = zone.clone();
                        occupant.update_exposure(&zone, t, current_dt);
                    }
                }
            }

            if t >= next_output - 1e-10 || t >= self.config.end_time - 1e-10 {
                result.history.push(TimeStepRecord {
                    time: t,
                    airflow: airflow.clone(),
                    concentrations,
                });
                next_output += self.config.output_interval;
            }

            if let Some(progress) = self.progress.as_mut() {
                if !progress(t, self.config.end_time) {
                    info!(time = t, "transient run cancelled");
                    return Ok(result);
                }
            }
        }

        result.completed = true;
        info!(steps = result.history.len(), "transient run completed");
        Ok(result)
    }
}

fn update_sensors(sensors: &mut [Sensor], network: &Network, transport: &TransportSolver) {
    let concentrations = transport.concentrations();
    for sensor in sensors {
        sensor.last_reading = match sensor.kind {
            SensorKind::Concentration { zone, species } => concentrations
                .get(zone)
                .and_then(|z| z.get(species))
                .copied()
                .unwrap_or(sensor.last_reading),
            SensorKind::Pressure { node } => network
                .nodes()
                .get(node)
                .map_or(sensor.last_reading, |n| n.pressure()),
            SensorKind::Temperature { node } => network
                .nodes()
                .get(node)
                .map_or(sensor.last_reading, |n| n.temperature()),
            SensorKind::MassFlow { link } => network
                .links()
                .get(link)
                .map_or(sensor.last_reading, |l| l.mass_flow()),
        };
    }
}

fn update_controllers(controllers: &mut [Controller], sensors: &[Sensor]) {
    for controller in controllers {
        if let Some(sensor) = sensors.iter().find(|s| s.id == controller.sensor_id) {
            controller.update(sensor.last_reading);
        }
    }
}

fn apply_actuators(actuators: &mut [Actuator], controllers: &[Controller], network: &mut Network) {
    for actuator in actuators {
        let Some(controller) = controllers.iter().find(|c| c.actuator_id == actuator.id) else {
            continue;
        };
        actuator.current_value = controller.output;

        match actuator.kind {
            ActuatorKind::DamperFraction => {
                if let Some(link) = network.links_mut().get_mut(actuator.link) {
                    if let Some(damper) = link.element_mut().as_damper_mut() {
                        damper.set_fraction(actuator.current_value);
                    }
                }
            }
        }
    }
}

/// Non-trace species shift the zone gas constant:
/// R_mix = R_air·(1 + Σ w_k·(M_air/M_k − 1)) with mass fractions w_k.
fn apply_density_feedback(network: &mut Network, species: &[Species], concentrations: &[Vec<f64>]) {
    for i in 0..network.node_count() {
        if network.nodes()[i].is_known_pressure() {
            continue;
        }
        let Some(zone_conc) = concentrations.get(i) else {
            continue;
        };

        let node = &mut network.nodes_mut()[i];
        let rho_base = if node.density() > 0.0 {
            node.density()
        } else {
            1.2
        };

        let mut correction = 0.0;
        for (key, spec) in species.iter().enumerate() {
            if spec.is_trace || spec.molar_mass <= 0.0 {
                continue;
            }
            let Some(&conc) = zone_conc.get(key) else {
                continue;
            };
            let mass_fraction = conc / rho_base;
            correction += mass_fraction * (M_AIR / spec.molar_mass - 1.0);
        }

        let r_mix = R_AIR * (1.0 + correction);
        if r_mix > 0.0 && node.temperature() > 0.0 {
            node.set_density((P_ATM + node.pressure()) / (r_mix * node.temperature()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TransientConfig::default();
        assert_eq!(config.start_time, 0.0);
        assert_eq!(config.end_time, 3600.0);
        assert_eq!(config.time_step, 60.0);
        assert_eq!(config.output_interval, 60.0);
        assert!(!config.halt_on_failure);
    }

    #[test]
    fn invalid_config_rejected() {
        let mut sim = TransientSimulation::new(TransientConfig {
            time_step: 0.0,
            ..TransientConfig::default()
        });
        let mut network = Network::new();
        assert!(matches!(
            sim.run(&mut network),
            Err(SimError::InvalidConfig { .. })
        ));

        let mut sim = TransientSimulation::new(TransientConfig {
            end_time: -10.0,
            ..TransientConfig::default()
        });
        assert!(matches!(
            sim.run(&mut network),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn heavier_than_air_species_raises_density() {
        use af_core::units::m3;
        use af_network::{Node, NodeKind};

        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Out", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "Room", NodeKind::Normal).with_volume(m3(50.0)))
            .unwrap();
        network.update_densities();
        let rho_before = network.nodes()[1].density();

        let species = vec![
            Species::new(1, "SF6").with_molar_mass(0.146).non_trace(),
        ];
        let concentrations = vec![vec![0.0], vec![0.05]];
        apply_density_feedback(&mut network, &species, &concentrations);

        assert!(network.nodes()[1].density() > rho_before);
    }
}
