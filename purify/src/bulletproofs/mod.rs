pub mod serialization;
pub mod transcript;
