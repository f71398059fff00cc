//! Request and response schema types.
//!
//! Field names and nesting in the response types are a compatibility
//! contract with external exporters; change them only with a schema
//! version bump.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Request ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelSpec {
    #[serde(default)]
    pub ambient: Option<AmbientSpec>,
    /// Named, reusable element definitions referenced by links
    #[serde(rename = "flowElements", default)]
    pub flow_elements: HashMap<String, ElementSpec>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub species: Vec<SpeciesSpec>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub schedules: Vec<ScheduleSpec>,
    #[serde(default)]
    pub transient: Option<TransientSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientSpec {
    /// Outdoor temperature (K)
    pub temperature: Option<f64>,
    /// Outdoor gauge pressure (Pa)
    pub pressure: Option<f64>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "windDirection")]
    pub wind_direction: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKindSpec {
    #[default]
    Normal,
    Ambient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: NodeKindSpec,
    /// Zone temperature (K); ambient nodes default to the ambient section
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Base elevation (m)
    #[serde(default)]
    pub elevation: f64,
    /// Zone volume (m³), required for transport on normal nodes
    #[serde(default)]
    pub volume: Option<f64>,
    /// Initial gauge pressure (Pa)
    #[serde(default)]
    pub pressure: Option<f64>,
}

/// Link element: inline definition or a reference into `flowElements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementRef {
    Named(String),
    Inline(ElementSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    /// Centerline elevation for the stack correction (m)
    #[serde(default)]
    pub elevation: f64,
    pub element: ElementRef,
}

fn default_roughness() -> f64 {
    1e-4
}

fn default_fraction() -> f64 {
    1.0
}

fn default_efficiency() -> f64 {
    0.9
}

/// Flow element parameters, tagged by `type` with constructor field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementSpec {
    PowerLawOrifice {
        #[serde(rename = "C")]
        c: f64,
        n: f64,
    },
    Fan {
        #[serde(rename = "maxFlow")]
        max_flow: f64,
        #[serde(rename = "shutoffPressure")]
        shutoff_pressure: f64,
    },
    TwoWayFlow {
        #[serde(rename = "Cd")]
        cd: f64,
        area: f64,
    },
    Duct {
        length: f64,
        diameter: f64,
        #[serde(default = "default_roughness")]
        roughness: f64,
        #[serde(rename = "sumK", default)]
        sum_k: f64,
    },
    Damper {
        #[serde(rename = "Cmax")]
        c_max: f64,
        n: f64,
        #[serde(default = "default_fraction")]
        fraction: f64,
    },
    Filter {
        #[serde(rename = "C")]
        c: f64,
        n: f64,
        #[serde(default = "default_efficiency")]
        efficiency: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "molarMass", default = "crate::schema::default_molar_mass")]
    pub molar_mass: f64,
    #[serde(rename = "decayRate", default)]
    pub decay_rate: f64,
    #[serde(rename = "outdoorConcentration", default)]
    pub outdoor_concentration: f64,
    #[serde(default = "crate::schema::default_true")]
    pub trace: bool,
}

pub(crate) fn default_molar_mass() -> f64 {
    0.029
}

pub(crate) fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SourceKindSpec {
    #[default]
    Constant,
    ExponentialDecay,
    PressureDriven,
    CutoffConcentration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    #[serde(rename = "zoneId")]
    pub zone_id: i64,
    #[serde(rename = "speciesId")]
    pub species_id: i64,
    #[serde(rename = "type", default)]
    pub kind: SourceKindSpec,
    #[serde(rename = "generationRate", default)]
    pub generation_rate: f64,
    #[serde(rename = "removalRate", default)]
    pub removal_rate: f64,
    #[serde(rename = "scheduleId", default)]
    pub schedule_id: Option<i64>,
    #[serde(rename = "decayTimeConstant", default = "crate::schema::default_tau")]
    pub decay_time_constant: f64,
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    #[serde(default = "crate::schema::default_multiplier")]
    pub multiplier: f64,
    #[serde(rename = "pressureCoeff", default)]
    pub pressure_coefficient: f64,
    #[serde(rename = "cutoffConcentration", default)]
    pub cutoff_concentration: f64,
}

pub(crate) fn default_tau() -> f64 {
    3600.0
}

pub(crate) fn default_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePointSpec {
    pub time: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSpec {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub points: Vec<SchedulePointSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransientSpec {
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    #[serde(rename = "endTime", default = "crate::schema::default_end_time")]
    pub end_time: f64,
    #[serde(rename = "timeStep", default = "crate::schema::default_time_step")]
    pub time_step: f64,
    #[serde(
        rename = "outputInterval",
        default = "crate::schema::default_time_step"
    )]
    pub output_interval: f64,
    #[serde(rename = "airflowMethod", default)]
    pub airflow_method: Option<String>,
}

pub(crate) fn default_end_time() -> f64 {
    3600.0
}

pub(crate) fn default_time_step() -> f64 {
    60.0
}

// ── Response ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSummary {
    pub converged: bool,
    pub iterations: usize,
    #[serde(rename = "maxResidual")]
    pub max_residual: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub id: i64,
    pub name: String,
    /// Gauge pressure (Pa)
    pub pressure: f64,
    /// Air density (kg/m³)
    pub density: f64,
    /// Zone temperature (K)
    pub temperature: f64,
    /// Base elevation (m)
    pub elevation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResult {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    #[serde(rename = "massFlow")]
    pub mass_flow: f64,
    #[serde(rename = "volumeFlow_m3s")]
    pub volume_flow_m3s: f64,
}

/// Steady-state response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteadyResponse {
    pub solver: SolverSummary,
    pub nodes: Vec<NodeResult>,
    pub links: Vec<LinkResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "molarMass")]
    pub molar_mass: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirflowSection {
    pub converged: bool,
    pub iterations: usize,
    pub pressures: Vec<f64>,
    #[serde(rename = "massFlows")]
    pub mass_flows: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeStepOut {
    pub time: f64,
    pub airflow: AirflowSection,
    /// `[zone][species]` concentrations, absent without species
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentrations: Option<Vec<Vec<f64>>>,
}

/// Transient response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransientResponse {
    pub completed: bool,
    #[serde(rename = "totalSteps")]
    pub total_steps: usize,
    pub species: Vec<SpeciesInfo>,
    pub nodes: Vec<NodeInfo>,
    #[serde(rename = "timeSeries")]
    pub time_series: Vec<TimeStepOut>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_spec_parses_each_kind() {
        let cases = [
            r#"{"type": "PowerLawOrifice", "C": 0.002, "n": 0.65}"#,
            r#"{"type": "Fan", "maxFlow": 0.05, "shutoffPressure": 200.0}"#,
            r#"{"type": "TwoWayFlow", "Cd": 0.65, "area": 2.0}"#,
            r#"{"type": "Duct", "length": 5.0, "diameter": 0.2}"#,
            r#"{"type": "Damper", "Cmax": 0.01, "n": 0.65, "fraction": 0.5}"#,
            r#"{"type": "Filter", "C": 0.004, "n": 0.6}"#,
        ];
        for case in cases {
            let parsed: Result<ElementSpec, _> = serde_json::from_str(case);
            assert!(parsed.is_ok(), "failed to parse {case}");
        }
    }

    #[test]
    fn unknown_element_type_names_the_variant() {
        let err = serde_json::from_str::<ElementSpec>(r#"{"type": "Portal", "C": 1.0}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Portal"));
    }

    #[test]
    fn duct_defaults_apply() {
        let spec: ElementSpec =
            serde_json::from_str(r#"{"type": "Duct", "length": 5.0, "diameter": 0.2}"#).unwrap();
        match spec {
            ElementSpec::Duct {
                roughness, sum_k, ..
            } => {
                assert_eq!(roughness, 1e-4);
                assert_eq!(sum_k, 0.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn element_ref_accepts_names_and_inline() {
        let named: ElementRef = serde_json::from_str(r#""bigVent""#).unwrap();
        assert!(matches!(named, ElementRef::Named(ref s) if s == "bigVent"));

        let inline: ElementRef =
            serde_json::from_str(r#"{"type": "PowerLawOrifice", "C": 0.002, "n": 0.65}"#).unwrap();
        assert!(matches!(inline, ElementRef::Inline(_)));
    }

    #[test]
    fn response_round_trips_through_serde() {
        let response = SteadyResponse {
            solver: SolverSummary {
                converged: true,
                iterations: 7,
                max_residual: 3.2e-7,
            },
            nodes: vec![NodeResult {
                id: 2,
                name: "Room".into(),
                pressure: 12.3456789012345,
                density: 1.2041,
                temperature: 293.15,
                elevation: 0.0,
            }],
            links: vec![LinkResult {
                id: 10,
                from: 1,
                to: 2,
                mass_flow: 0.0601234567890123,
                volume_flow_m3s: 0.05,
            }],
        };

        let text = serde_json::to_string_pretty(&response).unwrap();
        let back: SteadyResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(back.nodes[0].pressure, response.nodes[0].pressure);
        assert_eq!(back.links[0].mass_flow, response.links[0].mass_flow);

        // Exact field names are the exporter contract
        assert!(text.contains("\"maxResidual\""));
        assert!(text.contains("\"massFlow\""));
        assert!(text.contains("\"volumeFlow_m3s\""));
    }
}
