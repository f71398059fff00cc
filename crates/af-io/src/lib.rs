//! af-io: JSON boundary for the airflow engine.
//!
//! The request schema describes ambient conditions, nodes, links with
//! their flow elements (inline or named templates), and the optional
//! transport sections (species, sources, schedules, transient config).
//! The response schema is the contract external exporters depend on
//! bit-exactly; field names and nesting must not change without a
//! version bump.
//!
//! Malformed JSON, an unknown element `type`, or a reference to an
//! undefined node id fail the call with a descriptive error; no partially
//! built network escapes the boundary.

pub mod error;
pub mod reader;
pub mod schema;
pub mod writer;

pub use error::{IoError, IoResult};
pub use reader::{Model, build_model, build_network, load_model, load_network};
pub use schema::{
    AirflowSection, AmbientSpec, ElementSpec, LinkSpec, ModelSpec, NodeSpec, SteadyResponse,
    TransientResponse,
};
pub use writer::{write_steady, write_transient};

use af_solver::Solver;
use af_sim::{TransientConfig, TransientSimulation};

/// Solve the network described by a JSON request and return the JSON
/// response.
///
/// Transient mode is selected when the request carries `species` or
/// `transient` sections; otherwise a single steady-state solve runs.
pub fn solve_from_json(json: &str) -> IoResult<String> {
    let spec: schema::ModelSpec = serde_json::from_str(json)?;
    let mut model = build_model(&spec)?;

    if model.is_transient() {
        let config = model.transient.clone().unwrap_or(TransientConfig::default());
        let mut sim = TransientSimulation::new(config);
        sim.set_species(model.species.clone());
        sim.set_sources(model.sources.clone());
        sim.set_schedules(model.schedules.clone());
        let result = sim.run(&mut model.network)?;
        write_transient(&model.network, &result, &model.species)
    } else {
        let solver = Solver::default();
        let result = solver.solve(&mut model.network)?;
        write_steady(&model.network, &result)
    }
}
