pub mod expr;
pub mod transcript;
