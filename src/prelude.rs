//! Convenience re-exports for driving PSSFSS analyses.

pub use crate::analysis::{analyze, AnalysisOptions, ResultHandle, Sink, Stratum};
pub use crate::args::{ArgValue, KwArgs};
pub use crate::config::{SessionConfig, ThreadCount};
pub use crate::doc::{doc, DocTopic, WrappedFunction};
pub use crate::errors::PssfssError;
pub use crate::export::{res2fresnel, res2tep, Res2TepOptions, ResultSource};
pub use crate::frequency::Frequencies;
pub use crate::io::{write_sheet_vtk, write_svg, SvgOptions};
pub use crate::layer::Layer;
pub use crate::logging::init_tracing;
pub use crate::math::{CScalar, Scalar, R2};
pub use crate::outputs::{extract, Column, OutputRequest};
pub use crate::render::{scene, PlotOptions, Scene};
pub use crate::session::Session;
pub use crate::sheet::{MeshFormat, SheetClass, SheetGeometry, SheetHandle};
pub use crate::sheets::{
    build, build_sheet, diagstrip, jerusalemcross, loadedcross, manji, meander, pecsheet, pixels,
    pmcsheet, polyring, rectstrip, sinuous, splitring, sympixels, DiagStrip, JerusalemCross,
    LoadedCross, Manji, Meander, Pixels, PolyRing, RectStrip, SheetStyle, Sinuous, SplitRing,
    SymPixels,
};
pub use crate::steering::{Steering, SteeringValue};
pub use crate::units::{Length, UnitTag, CM, INCH, MIL, MM};
