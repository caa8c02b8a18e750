//! Boundary to the foreign engine: value model, engine trait and the Julia backend.

/// Request/response boundary and the [`Engine`] trait.
pub mod engine;
/// Persistent `julia` child-process engine.
pub mod julia;
/// Values crossing the boundary.
pub mod value;

#[cfg(test)]
pub(crate) mod fake;

pub use engine::{Engine, EngineError, Request};
pub use julia::JuliaEngine;
pub use value::{ConstructValue, ForeignValue, QuantityValue, RefId};
