//! Directed links between zone nodes.

use af_core::NodeId;
use af_elements::Element;

/// A directed connection between two nodes carrying one flow element.
///
/// Direction is bookkeeping only: positive mass flow means from→to, and the
/// solve decides the sign. The link elevation is the centerline height used
/// by the stack-effect correction. Mass flow and derivative are solver
/// scratch state, refreshed every iteration.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub from: NodeId,
    pub to: NodeId,
    pub elevation: f64, // m
    element: Element,
    mass_flow: f64,  // kg/s, computed result
    derivative: f64, // d(ṁ)/d(Δp), for Jacobian assembly
}

impl Link {
    pub fn new(id: i64, from: NodeId, to: NodeId, elevation: f64, element: Element) -> Self {
        Self {
            id,
            from,
            to,
            elevation,
            element,
            mass_flow: 0.0,
            derivative: 0.0,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn mass_flow(&self) -> f64 {
        self.mass_flow
    }

    pub fn set_mass_flow(&mut self, mass_flow: f64) {
        self.mass_flow = mass_flow;
    }

    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    pub fn set_derivative(&mut self, derivative: f64) {
        self.derivative = derivative;
    }
}
