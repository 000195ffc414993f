//! Native functions available to every program

pub mod builtins;

pub use builtins::{NativeFunc, NativeRegistry};
