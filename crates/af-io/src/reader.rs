//! Request parsing: JSON schema → engine model.

use std::path::Path;

use af_core::units::{k, m, m3, pa};
use af_elements::{Damper, Duct, Element, ElementResult, Fan, Filter, PowerLawOrifice, TwoWayFlow};
use af_network::{Network, Node, NodeKind};
use af_sim::TransientConfig;
use af_solver::SolverMethod;
use af_transport::{Schedule, Source, Species};

use crate::error::{IoError, IoResult};
use crate::schema::{
    ElementRef, ElementSpec, ModelSpec, NodeKindSpec, SourceKindSpec, TransientSpec,
};

/// A parsed model: the network plus the transport sections.
#[derive(Debug, Clone)]
pub struct Model {
    pub network: Network,
    pub species: Vec<Species>,
    pub sources: Vec<Source>,
    pub schedules: Vec<Schedule>,
    pub transient: Option<TransientConfig>,
}

impl Model {
    /// Transient mode is selected by the presence of species or an
    /// explicit transient section.
    pub fn is_transient(&self) -> bool {
        self.transient.is_some() || !self.species.is_empty()
    }
}

/// Parse a network from a model spec.
pub fn build_network(spec: &ModelSpec) -> IoResult<Network> {
    let mut network = Network::new();

    if let Some(ambient) = &spec.ambient {
        if let Some(t) = ambient.temperature {
            network.ambient.temperature = t;
        }
        if let Some(p) = ambient.pressure {
            network.ambient.pressure = p;
        }
        if let Some(v) = ambient.wind_speed {
            network.ambient.wind_speed = v;
        }
        if let Some(d) = ambient.wind_direction {
            network.ambient.wind_direction = d;
        }
    }

    for node_spec in &spec.nodes {
        let kind = match node_spec.kind {
            NodeKindSpec::Ambient => NodeKind::Ambient,
            NodeKindSpec::Normal => NodeKind::Normal,
        };
        let name = node_spec
            .name
            .clone()
            .unwrap_or_else(|| format!("Node_{}", node_spec.id));

        // Ambient nodes inherit the outdoor section's conditions unless
        // overridden per node
        let temperature = node_spec.temperature.unwrap_or(match kind {
            NodeKind::Ambient => network.ambient.temperature,
            NodeKind::Normal => af_core::units::constants::T_REF,
        });
        let pressure = node_spec.pressure.unwrap_or(match kind {
            NodeKind::Ambient => network.ambient.pressure,
            NodeKind::Normal => 0.0,
        });

        let mut node = Node::new(node_spec.id, name, kind)
            .with_temperature(k(temperature))
            .with_elevation(m(node_spec.elevation))
            .with_pressure(pa(pressure));
        if let Some(volume) = node_spec.volume {
            node = node.with_volume(m3(volume));
        }

        network.add_node(node)?;
    }

    for link_spec in &spec.links {
        let element_spec = match &link_spec.element {
            ElementRef::Inline(inline) => inline,
            ElementRef::Named(name) => {
                spec.flow_elements
                    .get(name)
                    .ok_or_else(|| IoError::UnknownElementRef { name: name.clone() })?
            }
        };

        let element = build_element(element_spec).map_err(|source| IoError::Element {
            link: link_spec.id,
            source,
        })?;

        network.add_link(
            link_spec.id,
            link_spec.from,
            link_spec.to,
            link_spec.elevation,
            element,
        )?;
    }

    Ok(network)
}

/// Construct a flow element from its spec.
pub fn build_element(spec: &ElementSpec) -> ElementResult<Element> {
    Ok(match *spec {
        ElementSpec::PowerLawOrifice { c, n } => PowerLawOrifice::new(c, n)?.into(),
        ElementSpec::Fan {
            max_flow,
            shutoff_pressure,
        } => Fan::new(max_flow, shutoff_pressure)?.into(),
        ElementSpec::TwoWayFlow { cd, area } => TwoWayFlow::new(cd, area)?.into(),
        ElementSpec::Duct {
            length,
            diameter,
            roughness,
            sum_k,
        } => Duct::new(length, diameter, roughness, sum_k)?.into(),
        ElementSpec::Damper { c_max, n, fraction } => Damper::new(c_max, n, fraction)?.into(),
        ElementSpec::Filter { c, n, efficiency } => Filter::new(c, n, efficiency)?.into(),
    })
}

/// Parse the full model: network plus transport sections.
pub fn build_model(spec: &ModelSpec) -> IoResult<Model> {
    let network = build_network(spec)?;

    let species = spec
        .species
        .iter()
        .map(|s| {
            let mut out = Species::new(
                s.id,
                s.name
                    .clone()
                    .unwrap_or_else(|| format!("Species_{}", s.id)),
            )
            .with_molar_mass(s.molar_mass)
            .with_decay_rate(s.decay_rate)
            .with_outdoor_concentration(s.outdoor_concentration);
            if !s.trace {
                out = out.non_trace();
            }
            out
        })
        .collect();

    let sources = spec
        .sources
        .iter()
        .map(|s| {
            let mut source = match s.kind {
                SourceKindSpec::Constant => {
                    Source::constant(s.zone_id, s.species_id, s.generation_rate, s.removal_rate)
                }
                SourceKindSpec::ExponentialDecay => Source::decay(
                    s.zone_id,
                    s.species_id,
                    s.generation_rate,
                    s.decay_time_constant,
                    s.start_time,
                )
                .with_multiplier(s.multiplier),
                SourceKindSpec::PressureDriven => {
                    Source::pressure_driven(s.zone_id, s.species_id, s.pressure_coefficient)
                }
                SourceKindSpec::CutoffConcentration => Source::cutoff(
                    s.zone_id,
                    s.species_id,
                    s.generation_rate,
                    s.cutoff_concentration,
                ),
            };
            if let Some(schedule_id) = s.schedule_id {
                source = source.with_schedule(schedule_id);
            }
            source
        })
        .collect();

    let schedules = spec
        .schedules
        .iter()
        .map(|s| {
            let mut schedule = Schedule::new(
                s.id,
                s.name
                    .clone()
                    .unwrap_or_else(|| format!("Schedule_{}", s.id)),
            );
            for point in &s.points {
                schedule.add_point(point.time, point.value);
            }
            schedule
        })
        .collect();

    let transient = spec.transient.as_ref().map(transient_config);

    Ok(Model {
        network,
        species,
        sources,
        schedules,
        transient,
    })
}

fn transient_config(spec: &TransientSpec) -> TransientConfig {
    let method = match spec.airflow_method.as_deref() {
        Some("subRelaxation") => SolverMethod::SubRelaxation,
        _ => SolverMethod::TrustRegion,
    };
    TransientConfig {
        start_time: spec.start_time,
        end_time: spec.end_time,
        time_step: spec.time_step,
        output_interval: spec.output_interval,
        method,
        halt_on_failure: false,
    }
}

/// Load and parse a network from a JSON file.
pub fn load_network(path: impl AsRef<Path>) -> IoResult<Network> {
    let spec = read_spec(path.as_ref())?;
    build_network(&spec)
}

/// Load and parse the full model from a JSON file.
pub fn load_model(path: impl AsRef<Path>) -> IoResult<Model> {
    let spec = read_spec(path.as_ref())?;
    build_model(&spec)
}

fn read_spec(path: &Path) -> IoResult<ModelSpec> {
    let content = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
