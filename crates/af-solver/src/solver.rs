//! Newton-Raphson solver for the nodal pressure system.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::{debug, warn};

use af_core::units::constants::G0_MPS2;
use af_network::Network;

use crate::error::{SolverError, SolverResult};
use crate::steady::SteadyResult;

/// Max absolute nodal mass residual accepted as converged (kg/s)
pub const CONVERGENCE_TOL: f64 = 1e-6;
/// Newton iteration cap
pub const MAX_ITERATIONS: usize = 100;
/// Sub-relaxation factor
pub const RELAX_FACTOR_SUR: f64 = 0.75;

/// Trust region parameters (Pa)
const TR_INITIAL_RADIUS: f64 = 1000.0;
const TR_MIN_RADIUS: f64 = 0.01;
const TR_MAX_RADIUS: f64 = 1.0e6;

/// Pressure update strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverMethod {
    /// Simple under-relaxation, α = 0.75.
    SubRelaxation,
    /// Trust-region step clamp (more robust near element discontinuities).
    #[default]
    TrustRegion,
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub method: SolverMethod,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub relax_factor: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolverMethod::default(),
            max_iterations: MAX_ITERATIONS,
            tolerance: CONVERGENCE_TOL,
            relax_factor: RELAX_FACTOR_SUR,
        }
    }
}

/// Steady-state airflow solver.
///
/// Each call to [`Solver::solve`] is an independent synchronous solve; the
/// only state carried across calls lives in the network's node pressures,
/// which warm-start the next solve (useful between transient steps).
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

/// Per-node state snapshot taken before evaluating link flows, so the link
/// pass can run in parallel against a consistent pressure vector.
#[derive(Clone, Copy)]
struct NodeState {
    pressure: f64,
    density: f64,
    elevation: f64,
}

impl Solver {
    pub fn new(method: SolverMethod) -> Self {
        Self {
            config: SolverConfig {
                method,
                ..SolverConfig::default()
            },
        }
    }

    pub fn with_config(config: SolverConfig) -> SolverResult<Self> {
        if config.max_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                what: "max_iterations must be positive",
            });
        }
        if config.tolerance <= 0.0 {
            return Err(SolverError::InvalidConfig {
                what: "tolerance must be positive",
            });
        }
        if !(0.0..=1.0).contains(&config.relax_factor) || config.relax_factor == 0.0 {
            return Err(SolverError::InvalidConfig {
                what: "relax_factor must be in (0, 1]",
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the steady-state airflow network.
    ///
    /// Node pressures in the network are updated in place during the
    /// iteration; the returned snapshot is immutable.
    pub fn solve(&self, network: &mut Network) -> SolverResult<SteadyResult> {
        network.validate_for_solve()?;

        // Unknown map: node index -> equation index, None for ambient
        let mut unknown_map: Vec<Option<usize>> = Vec::with_capacity(network.node_count());
        let mut eq_count = 0;
        for node in network.nodes() {
            if node.is_known_pressure() {
                unknown_map.push(None);
            } else {
                unknown_map.push(Some(eq_count));
                eq_count += 1;
            }
        }

        if eq_count == 0 {
            // Nothing to iterate: boundary pressures are the answer
            network.update_densities();
            compute_flows(network);
            return Ok(collect_result(network, true, 0, 0.0));
        }

        let mut converged = false;
        let mut iterations = 0;
        let mut max_residual = f64::INFINITY;
        let mut trust_radius = TR_INITIAL_RADIUS;

        for iter in 0..self.config.max_iterations {
            network.update_densities();
            compute_flows(network);

            let (jacobian, residual) = assemble_system(network, &unknown_map, eq_count);

            max_residual = residual.amax();
            iterations = iter + 1;

            debug!(iteration = iterations, max_residual, "newton step");

            if max_residual < self.config.tolerance {
                converged = true;
                break;
            }

            // Solve J·dP = −R
            let Some(dp) = jacobian.lu().solve(&(-&residual)) else {
                warn!(iteration = iterations, "Jacobian decomposition failed");
                break;
            };

            match self.config.method {
                SolverMethod::SubRelaxation => {
                    self.apply_update_sur(network, &dp, &unknown_map);
                }
                SolverMethod::TrustRegion => {
                    apply_update_tr(network, &dp, &unknown_map, &mut trust_radius);
                }
            }
        }

        if !converged {
            warn!(
                iterations,
                max_residual, "airflow solve did not converge within the iteration cap"
            );
        }

        Ok(collect_result(network, converged, iterations, max_residual))
    }

    fn apply_update_sur(&self, network: &mut Network, dp: &DVector<f64>, map: &[Option<usize>]) {
        let alpha = self.config.relax_factor;
        for (i, eq) in map.iter().enumerate() {
            if let Some(eq) = eq {
                let node = &mut network.nodes_mut()[i];
                node.set_pressure(node.pressure() + alpha * dp[*eq]);
            }
        }
    }
}

/// Pressure difference across a link with the stack-effect correction:
/// Δp = (p_i − ρ_i·g·(Z_link − Z_i)) − (p_j − ρ_j·g·(Z_link − Z_j)).
fn delta_p(from: &NodeState, to: &NodeState, link_elevation: f64) -> f64 {
    let p_eff_from = from.pressure - from.density * G0_MPS2 * (link_elevation - from.elevation);
    let p_eff_to = to.pressure - to.density * G0_MPS2 * (link_elevation - to.elevation);
    p_eff_from - p_eff_to
}

/// Evaluate every link's flow and derivative at the current pressures.
///
/// Links are independent given the node snapshot, so the element laws run
/// in parallel.
fn compute_flows(network: &mut Network) {
    let states: Vec<NodeState> = network
        .nodes()
        .iter()
        .map(|n| NodeState {
            pressure: n.pressure(),
            density: n.density(),
            elevation: n.elevation(),
        })
        .collect();

    network.links_mut().par_iter_mut().for_each(|link| {
        let from = states[link.from.index() as usize];
        let to = states[link.to.index() as usize];
        let dp = delta_p(&from, &to, link.elevation);
        let rho = 0.5 * (from.density + to.density);
        let answer = link.element().flow(dp, rho);
        link.set_mass_flow(answer.mass_flow);
        link.set_derivative(answer.derivative);
    });
}

/// Assemble the residual vector and dense Jacobian addressed through the
/// unknown map.
///
/// Residual convention: net mass inflow per normal node. A link from i to j
/// carrying ṁ contributes −ṁ at i and +ṁ at j; the Jacobian picks up −d on
/// both diagonals and +d off-diagonal for each shared link.
fn assemble_system(
    network: &Network,
    unknown_map: &[Option<usize>],
    eq_count: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let mut jacobian = DMatrix::zeros(eq_count, eq_count);
    let mut residual = DVector::zeros(eq_count);

    for link in network.links() {
        let i = link.from.index() as usize;
        let j = link.to.index() as usize;
        let mass_flow = link.mass_flow();
        let deriv = link.derivative();

        let eq_i = unknown_map[i];
        let eq_j = unknown_map[j];

        if let Some(eq_i) = eq_i {
            residual[eq_i] -= mass_flow;
            jacobian[(eq_i, eq_i)] -= deriv;
            if let Some(eq_j) = eq_j {
                jacobian[(eq_i, eq_j)] += deriv;
            }
        }
        if let Some(eq_j) = eq_j {
            residual[eq_j] += mass_flow;
            jacobian[(eq_j, eq_j)] -= deriv;
            if let Some(eq_i) = eq_i {
                jacobian[(eq_j, eq_i)] += deriv;
            }
        }
    }

    (jacobian, residual)
}

/// Trust-region update: clamp the step norm to the current radius, shrink
/// the radius when the clamp bites and grow it when the full step fits.
fn apply_update_tr(
    network: &mut Network,
    dp: &DVector<f64>,
    unknown_map: &[Option<usize>],
    trust_radius: &mut f64,
) {
    let step_norm = dp.norm();

    let scale = if step_norm > *trust_radius {
        *trust_radius / step_norm
    } else {
        1.0
    };

    for (i, eq) in unknown_map.iter().enumerate() {
        if let Some(eq) = eq {
            let node = &mut network.nodes_mut()[i];
            node.set_pressure(node.pressure() + scale * dp[*eq]);
        }
    }

    if scale < 1.0 {
        *trust_radius = (*trust_radius * 0.5).max(TR_MIN_RADIUS);
    } else {
        *trust_radius = (*trust_radius * 2.0).min(TR_MAX_RADIUS);
    }
}

fn collect_result(
    network: &Network,
    converged: bool,
    iterations: usize,
    max_residual: f64,
) -> SteadyResult {
    let pressures: Vec<f64> = network.nodes().iter().map(|n| n.pressure()).collect();
    let densities: Vec<f64> = network.nodes().iter().map(|n| n.density()).collect();

    let mut mass_flows = Vec::with_capacity(network.link_count());
    let mut volume_flows = Vec::with_capacity(network.link_count());
    for link in network.links() {
        let mdot = link.mass_flow();
        // Volumetric flow uses the upstream zone's density
        let upstream = if mdot >= 0.0 { link.from } else { link.to };
        let rho = network.node(upstream).density();
        mass_flows.push(mdot);
        volume_flows.push(if rho > 0.0 { mdot / rho } else { 0.0 });
    }

    SteadyResult {
        converged,
        iterations,
        max_residual,
        pressures,
        densities,
        mass_flows,
        volume_flows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::units::{k, m3};
    use af_network::{Node, NodeKind};
    use af_elements::PowerLawOrifice;

    #[test]
    fn config_validation() {
        let bad = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(Solver::with_config(bad).is_err());

        let bad = SolverConfig {
            tolerance: -1.0,
            ..SolverConfig::default()
        };
        assert!(Solver::with_config(bad).is_err());
    }

    #[test]
    fn stack_effect_sign() {
        // Cold (dense) column on the from side at a raised link pushes flow
        // toward the warm side
        let cold = NodeState {
            pressure: 0.0,
            density: 1.29,
            elevation: 0.0,
        };
        let warm = NodeState {
            pressure: 0.0,
            density: 1.16,
            elevation: 0.0,
        };
        let dp_high = delta_p(&cold, &warm, 3.0);
        let dp_low = delta_p(&cold, &warm, 0.0);
        // Higher link elevation: the denser from-column loses more head
        assert!(dp_high < dp_low);
    }

    #[test]
    fn ambient_only_network_trivially_converges() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Out", NodeKind::Ambient).with_temperature(k(283.15)))
            .unwrap();

        let result = Solver::default().solve(&mut network).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.pressures, vec![0.0]);
    }

    #[test]
    fn no_ambient_node_is_topology_error() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Room", NodeKind::Normal).with_volume(m3(50.0)))
            .unwrap();

        assert!(matches!(
            Solver::default().solve(&mut network),
            Err(SolverError::Topology(_))
        ));
    }

    #[test]
    fn symmetric_orifices_balance_at_zero() {
        // One room, two identical orifices in opposite directions: the
        // converged pressure and both flows are zero
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Out", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "Room", NodeKind::Normal).with_volume(m3(50.0)))
            .unwrap();
        let orifice = PowerLawOrifice::new(0.002, 0.65).unwrap();
        network
            .add_link(10, 1, 2, 0.0, orifice.clone().into())
            .unwrap();
        network.add_link(11, 2, 1, 0.0, orifice.into()).unwrap();

        let result = Solver::default().solve(&mut network).unwrap();
        assert!(result.converged);
        assert!(result.pressures[1].abs() < 1e-6);
        assert!(result.mass_flows[0].abs() < 1e-6);
        assert!(result.mass_flows[1].abs() < 1e-6);
    }
}
