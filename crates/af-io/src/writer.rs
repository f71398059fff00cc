//! Response writing: engine results → JSON schema.

use af_network::Network;
use af_sim::TransientResult;
use af_solver::SteadyResult;
use af_transport::Species;

use crate::error::IoResult;
use crate::schema::{
    AirflowSection, LinkResult, NodeInfo, NodeResult, SolverSummary, SpeciesInfo, SteadyResponse,
    TimeStepOut, TransientResponse,
};

/// Serialize a steady-state result to the response schema.
pub fn write_steady(network: &Network, result: &SteadyResult) -> IoResult<String> {
    let response = steady_response(network, result);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub(crate) fn steady_response(network: &Network, result: &SteadyResult) -> SteadyResponse {
    let nodes = network
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| NodeResult {
            id: node.id,
            name: node.name.clone(),
            pressure: result.pressures[i],
            density: result.densities[i],
            temperature: node.temperature(),
            elevation: node.elevation(),
        })
        .collect();

    let links = network
        .links()
        .iter()
        .enumerate()
        .map(|(i, link)| LinkResult {
            id: link.id,
            from: network.node(link.from).id,
            to: network.node(link.to).id,
            mass_flow: result.mass_flows[i],
            volume_flow_m3s: result.volume_flows[i],
        })
        .collect();

    SteadyResponse {
        solver: SolverSummary {
            converged: result.converged,
            iterations: result.iterations,
            max_residual: result.max_residual,
        },
        nodes,
        links,
    }
}

/// Serialize a transient run to the response schema.
pub fn write_transient(
    network: &Network,
    result: &TransientResult,
    species: &[Species],
) -> IoResult<String> {
    let species_info = species
        .iter()
        .map(|s| SpeciesInfo {
            id: s.id,
            name: s.name.clone(),
            molar_mass: s.molar_mass,
        })
        .collect();

    let nodes = network
        .nodes()
        .iter()
        .map(|node| NodeInfo {
            id: node.id,
            name: node.name.clone(),
            kind: if node.is_known_pressure() {
                "ambient".to_string()
            } else {
                "normal".to_string()
            },
        })
        .collect();

    let time_series = result
        .history
        .iter()
        .map(|record| TimeStepOut {
            time: record.time,
            airflow: AirflowSection {
                converged: record.airflow.converged,
                iterations: record.airflow.iterations,
                pressures: record.airflow.pressures.clone(),
                mass_flows: record.airflow.mass_flows.clone(),
            },
            concentrations: if record.concentrations.is_empty() {
                None
            } else {
                Some(record.concentrations.clone())
            },
        })
        .collect();

    let response = TransientResponse {
        completed: result.completed,
        total_steps: result.history.len(),
        species: species_info,
        nodes,
        time_series,
    };

    Ok(serde_json::to_string_pretty(&response)?)
}
