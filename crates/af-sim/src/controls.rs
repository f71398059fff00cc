//! Sensor / controller / actuator control loop.

/// What a sensor measures. Indices address the owning network's node and
/// link arrays, or the transport solver's zone/species arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Species concentration in a zone (kg/m³)
    Concentration { zone: usize, species: usize },
    /// Zone gauge pressure (Pa)
    Pressure { node: usize },
    /// Zone temperature (K)
    Temperature { node: usize },
    /// Link mass flow (kg/s)
    MassFlow { link: usize },
}

/// A sensor sampling one process variable each step.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub id: i64,
    pub name: String,
    pub kind: SensorKind,
    pub last_reading: f64,
}

impl Sensor {
    pub fn new(id: i64, name: impl Into<String>, kind: SensorKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            last_reading: 0.0,
        }
    }
}

/// Incremental PI controller:
///   out_t = out_{t−1} + Kp·(e_t − e_{t−1}) + Ki·(e_t + e_{t−1})
///
/// Ki absorbs the Δt/2 factor as a user-configured parameter, and the
/// output is hard-clamped to [out_min, out_max]. Errors inside the deadband
/// are treated as zero so the loop does not chatter around the setpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    pub id: i64,
    pub name: String,
    pub sensor_id: i64,
    pub actuator_id: i64,
    pub setpoint: f64,
    pub kp: f64,
    pub ki: f64,
    pub deadband: f64,
    pub out_min: f64,
    pub out_max: f64,

    // Internal state
    pub output: f64,
    prev_error: f64,
}

impl Controller {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        sensor_id: i64,
        actuator_id: i64,
        setpoint: f64,
        kp: f64,
        ki: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            sensor_id,
            actuator_id,
            setpoint,
            kp,
            ki,
            deadband: 0.0,
            out_min: 0.0,
            out_max: 1.0,
            output: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn with_deadband(mut self, deadband: f64) -> Self {
        self.deadband = deadband;
        self
    }

    /// Update the controller output from the current sensor reading.
    pub fn update(&mut self, sensor_value: f64) -> f64 {
        let mut error = self.setpoint - sensor_value;

        if error.abs() < self.deadband {
            error = 0.0;
        }

        let increment = self.kp * (error - self.prev_error) + self.ki * (error + self.prev_error);
        self.output = (self.output + increment).clamp(self.out_min, self.out_max);
        self.prev_error = error;
        self.output
    }

    pub fn reset(&mut self) {
        self.output = 0.0;
        self.prev_error = 0.0;
    }
}

/// What an actuator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorKind {
    /// Damper opening fraction on a link's element
    DamperFraction,
}

/// An actuator applying a controller output to a link element.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuator {
    pub id: i64,
    pub name: String,
    /// Index into the network's link array
    pub link: usize,
    pub kind: ActuatorKind,
    pub current_value: f64,
}

impl Actuator {
    pub fn new(id: i64, name: impl Into<String>, link: usize, kind: ActuatorKind) -> Self {
        Self {
            id,
            name: name.into(),
            link,
            kind,
            current_value: 0.0,
        }
    }
}
