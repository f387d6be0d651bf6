pub mod curve_types;
pub mod purify_curves;
