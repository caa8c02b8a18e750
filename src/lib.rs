#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Length units and quantities understood by the engine.
pub mod units;
/// Shared numerical aliases and table helpers.
pub mod math;
/// Boundary to the foreign engine.
pub mod bridge;
/// Engine start-up configuration.
pub mod config;
/// The explicit runtime context and foreign object ownership.
pub mod session;
/// Scan-angle and phase-increment steering.
pub mod steering;
/// Keyword arguments and their normalization.
pub mod args;
/// Sheet handles and geometry snapshots.
pub mod sheet;
/// Typed sheet constructors.
pub mod sheets;
/// Dielectric layers.
pub mod layer;
/// Analysis frequencies.
pub mod frequency;
/// Running an analysis.
pub mod analysis;
/// Output requests and result extraction.
pub mod outputs;
/// TEP and Fresnel-table conversions.
pub mod export;
/// Documentation lookup.
pub mod doc;
/// Renderer-agnostic sheet drawings.
pub mod render;
/// SVG and VTK writers.
pub mod io;
/// Tracing subscriber setup.
pub mod logging;
/// Error types shared between modules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
