//! Writers for sheet drawings and triangulations.

pub mod svg;
pub mod vtk;

pub use svg::*;
pub use vtk::*;
