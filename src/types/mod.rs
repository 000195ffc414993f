//! Type tags for best-effort inference

pub mod type_system;

pub use type_system::TypeTag;
