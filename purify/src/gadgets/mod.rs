pub mod combine;
pub mod curve;
pub mod curve_windowed_mul;
pub mod lookup;
