//! Documentation lookup for wrapped engine functions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::bridge::Request;
use crate::errors::{PssfssError, Result};
use crate::session::Session;
use crate::sheet::SheetHandle;

/// Engine functions exposed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrappedFunction {
    /// `analyze`
    Analyze,
    /// `diagstrip`
    Diagstrip,
    /// `extract_result`
    ExtractResult,
    /// `jerusalemcross`
    Jerusalemcross,
    /// `Layer`
    Layer,
    /// `loadedcross`
    Loadedcross,
    /// `manji`
    Manji,
    /// `meander`
    Meander,
    /// `pecsheet`
    Pecsheet,
    /// `pixels`
    Pixels,
    /// `pmcsheet`
    Pmcsheet,
    /// `polyring`
    Polyring,
    /// `rectstrip`
    Rectstrip,
    /// `res2fresnel`
    Res2fresnel,
    /// `res2tep`
    Res2tep,
    /// `sinuous`
    Sinuous,
    /// `splitring`
    Splitring,
    /// `sympixels`
    Sympixels,
}

impl WrappedFunction {
    /// Every wrapped function.
    pub const ALL: [Self; 18] = [
        Self::Analyze,
        Self::Diagstrip,
        Self::ExtractResult,
        Self::Jerusalemcross,
        Self::Layer,
        Self::Loadedcross,
        Self::Manji,
        Self::Meander,
        Self::Pecsheet,
        Self::Pixels,
        Self::Pmcsheet,
        Self::Polyring,
        Self::Rectstrip,
        Self::Res2fresnel,
        Self::Res2tep,
        Self::Sinuous,
        Self::Splitring,
        Self::Sympixels,
    ];

    /// Name of the binding in the engine.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Diagstrip => "diagstrip",
            Self::ExtractResult => "extract_result",
            Self::Jerusalemcross => "jerusalemcross",
            Self::Layer => "Layer",
            Self::Loadedcross => "loadedcross",
            Self::Manji => "manji",
            Self::Meander => "meander",
            Self::Pecsheet => "pecsheet",
            Self::Pixels => "pixels",
            Self::Pmcsheet => "pmcsheet",
            Self::Polyring => "polyring",
            Self::Rectstrip => "rectstrip",
            Self::Res2fresnel => "res2fresnel",
            Self::Res2tep => "res2tep",
            Self::Sinuous => "sinuous",
            Self::Splitring => "splitring",
            Self::Sympixels => "sympixels",
        }
    }
}

impl fmt::Display for WrappedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WrappedFunction {
    type Err = PssfssError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| PssfssError::unexpected("wrapped function name", s))
    }
}

/// Subject of a documentation lookup.
#[derive(Debug, Clone, Copy)]
pub enum DocTopic<'a> {
    /// A wrapped function.
    Function(WrappedFunction),
    /// The constructor that produced a sheet.
    Sheet(&'a SheetHandle),
}

impl DocTopic<'_> {
    /// Engine binding whose documentation is fetched.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Function(function) => function.name(),
            Self::Sheet(sheet) => sheet.style(),
        }
    }
}

impl From<WrappedFunction> for DocTopic<'_> {
    fn from(function: WrappedFunction) -> Self {
        Self::Function(function)
    }
}

impl<'a> From<&'a SheetHandle> for DocTopic<'a> {
    fn from(sheet: &'a SheetHandle) -> Self {
        Self::Sheet(sheet)
    }
}

/// Markdown documentation of `topic`, as written by the engine.
pub fn doc(session: &Arc<Session>, topic: DocTopic<'_>) -> Result<String> {
    let text = session.request(&Request::Doc {
        name: topic.name().to_owned(),
    })?;
    text.as_str()
        .map(str::to_owned)
        .ok_or_else(|| PssfssError::unexpected("markdown string", text.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::KwArgs;
    use crate::bridge::fake::FakeEngine;
    use crate::sheets;

    #[test]
    fn names_parse_back() {
        for function in WrappedFunction::ALL {
            assert_eq!(function.to_string().parse::<WrappedFunction>().expect("known"), function);
        }
        assert!("plot_sheet".parse::<WrappedFunction>().is_err());
    }

    #[test]
    fn function_docs_are_fetched_by_name() {
        let (engine, state) = FakeEngine::new();
        let session = Session::with_engine(engine);
        let text = doc(&session, WrappedFunction::ExtractResult.into()).expect("doc");
        assert!(text.contains("extract_result"));
        assert_eq!(
            state.lock().requests.last(),
            Some(&Request::Doc {
                name: "extract_result".into()
            })
        );
    }

    #[test]
    fn sheet_docs_use_the_sheet_style() {
        let (engine, _state) = FakeEngine::new();
        let session = Session::with_engine(engine);
        let sheet = sheets::build_sheet(&session, "sympixels", KwArgs::new()).expect("sheet");
        let text = doc(&session, (&sheet).into()).expect("doc");
        assert!(text.starts_with("```\nsympixels"));
    }
}
