//! SI quantities at API boundaries. Hot loops work on raw `f64` values in
//! the same units.

use uom::si::f64::{Length as UomLength, Pressure as UomPressure, ThermodynamicTemperature};

pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Temperature = ThermodynamicTemperature;

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
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

pub mod constants {
    /// Universal gas constant [J/(mol·K)].
    pub const R_GAS: f64 = 8.314_462_618;

    /// Reference temperature of internal energies and enthalpies [K].
    pub const T_REF_K: f64 = 273.15;
}
