//! Core domain types

pub mod date;
pub mod severity;
pub mod treatment;

pub use date::EventDate;
pub use severity::{BurnSeverity, SoilBin, SpatialPattern, VegetationType};
pub use treatment::Treatment;
