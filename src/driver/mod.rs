//! Hardware drivers behind the engine's collaborator traits
pub mod ina226;
pub mod mosfet;
