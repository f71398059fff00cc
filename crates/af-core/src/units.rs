// af-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity, Volume as UomVolume, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    /// Standard gravity (m/s²)
    pub const G0_MPS2: f64 = 9.806_65;

    /// Specific gas constant for dry air (J/(kg·K))
    pub const R_AIR: f64 = 287.055;

    /// Standard atmospheric pressure (Pa)
    pub const P_ATM: f64 = 101_325.0;

    /// Reference temperature, 20°C (K)
    pub const T_REF: f64 = 293.15;

    /// Molar mass of dry air (kg/mol)
    pub const M_AIR: f64 = 0.029;

    /// Ideal gas air density (kg/m³) at absolute pressure (Pa) and temperature (K).
    #[inline]
    pub fn air_density(abs_pressure: f64, temperature: f64) -> f64 {
        abs_pressure / (R_AIR * temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(300.0);
        let _mdot = kgps(1.2);
        let _l = m(2.0);
        let _v = m3(50.0);
        let _q = m3ps(0.05);
        let _dt = s(0.1);
        let _r = unitless(0.5);
    }

    #[test]
    fn air_density_at_reference() {
        let rho = constants::air_density(constants::P_ATM, constants::T_REF);
        // Dry air at 20°C, 1 atm is about 1.204 kg/m³
        assert!((rho - 1.204).abs() < 0.01);
    }
}
