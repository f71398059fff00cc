//! Closed element set with static dispatch.

use crate::damper::Damper;
use crate::duct::Duct;
use crate::fan::Fan;
use crate::filter::Filter;
use crate::opening::TwoWayFlow;
use crate::orifice::PowerLawOrifice;
use crate::traits::{FlowAnswer, FlowModel};

/// The closed set of flow element kinds known to the engine.
///
/// The catalog is fixed at design time, so dispatch is a match rather than
/// a trait object; each variant owns its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    PowerLawOrifice(PowerLawOrifice),
    Fan(Fan),
    TwoWayFlow(TwoWayFlow),
    Duct(Duct),
    Damper(Damper),
    Filter(Filter),
}

impl Element {
    /// Evaluate the element law at the given pressure difference and density.
    pub fn flow(&self, delta_p: f64, density: f64) -> FlowAnswer {
        match self {
            Element::PowerLawOrifice(e) => e.flow(delta_p, density),
            Element::Fan(e) => e.flow(delta_p, density),
            Element::TwoWayFlow(e) => e.flow(delta_p, density),
            Element::Duct(e) => e.flow(delta_p, density),
            Element::Damper(e) => e.flow(delta_p, density),
            Element::Filter(e) => e.flow(delta_p, density),
        }
    }

    /// Type name matching the JSON `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::PowerLawOrifice(e) => e.type_name(),
            Element::Fan(e) => e.type_name(),
            Element::TwoWayFlow(e) => e.type_name(),
            Element::Duct(e) => e.type_name(),
            Element::Damper(e) => e.type_name(),
            Element::Filter(e) => e.type_name(),
        }
    }

    /// Mutable damper access, for actuators driving the opening fraction.
    pub fn as_damper_mut(&mut self) -> Option<&mut Damper> {
        match self {
            Element::Damper(d) => Some(d),
            _ => None,
        }
    }

    /// Large-opening access, for the transport step's stratification exchange.
    pub fn as_two_way(&self) -> Option<&TwoWayFlow> {
        match self {
            Element::TwoWayFlow(o) => Some(o),
            _ => None,
        }
    }

    /// Species removal efficiency, if this element filters contaminants.
    pub fn filter_efficiency(&self) -> Option<f64> {
        match self {
            Element::Filter(f) => Some(f.efficiency()),
            _ => None,
        }
    }
}

impl From<PowerLawOrifice> for Element {
    fn from(e: PowerLawOrifice) -> Self {
        Element::PowerLawOrifice(e)
    }
}

impl From<Fan> for Element {
    fn from(e: Fan) -> Self {
        Element::Fan(e)
    }
}

impl From<TwoWayFlow> for Element {
    fn from(e: TwoWayFlow) -> Self {
        Element::TwoWayFlow(e)
    }
}

impl From<Duct> for Element {
    fn from(e: Duct) -> Self {
        Element::Duct(e)
    }
}

impl From<Damper> for Element {
    fn from(e: Damper) -> Self {
        Element::Damper(e)
    }
}

impl From<Filter> for Element {
    fn from(e: Filter) -> Self {
        Element::Filter(e)
    }
}
