//! Running the engine's analysis over a stratified structure.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::args::KwArgs;
use crate::bridge::{ForeignValue, Request};
use crate::errors::{PssfssError, Result};
use crate::frequency::Frequencies;
use crate::layer::Layer;
use crate::session::{ForeignRef, Session};
use crate::sheet::SheetHandle;
use crate::steering::Steering;

/// One entry of a stratum list.
#[derive(Debug, Clone)]
pub enum Stratum {
    /// Dielectric layer.
    Layer(Layer),
    /// Patterned sheet; sheets are shared, not copied.
    Sheet(Arc<SheetHandle>),
}

impl Stratum {
    fn to_foreign(&self, session: &Arc<Session>) -> Result<ForeignValue> {
        match self {
            Self::Layer(layer) => Ok(layer.to_foreign()),
            Self::Sheet(sheet) => {
                sheet.foreign().ensure_in(session)?;
                Ok(sheet.foreign().to_foreign())
            }
        }
    }
}

impl From<Layer> for Stratum {
    fn from(layer: Layer) -> Self {
        Self::Layer(layer)
    }
}

impl From<Arc<SheetHandle>> for Stratum {
    fn from(sheet: Arc<SheetHandle>) -> Self {
        Self::Sheet(sheet)
    }
}

impl From<SheetHandle> for Stratum {
    fn from(sheet: SheetHandle) -> Self {
        Self::Sheet(Arc::new(sheet))
    }
}

/// Destination of a file the engine writes during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// Write to this path.
    Path(PathBuf),
    /// Discard the output.
    DevNull,
}

impl Sink {
    fn to_foreign(&self) -> ForeignValue {
        match self {
            Self::Path(path) => ForeignValue::Str(path.to_string_lossy().into_owned()),
            Self::DevNull => ForeignValue::Global("devnull".to_owned()),
        }
    }
}

impl From<PathBuf> for Sink {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Sink {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for Sink {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Keyword options forwarded to the engine's `analyze`. Unset options use its defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOptions {
    /// Log file.
    pub logfile: Option<Sink>,
    /// Result file.
    pub resultfile: Option<Sink>,
    /// Print progress to the engine's console.
    pub showprogress: Option<bool>,
    /// Further keyword arguments, forwarded verbatim.
    pub extra: KwArgs,
}

impl AnalysisOptions {
    /// Sets the log file.
    #[must_use]
    pub fn logfile(mut self, sink: impl Into<Sink>) -> Self {
        self.logfile = Some(sink.into());
        self
    }

    /// Sets the result file.
    #[must_use]
    pub fn resultfile(mut self, sink: impl Into<Sink>) -> Self {
        self.resultfile = Some(sink.into());
        self
    }

    /// Enables or disables progress output.
    #[must_use]
    pub const fn showprogress(mut self, show: bool) -> Self {
        self.showprogress = Some(show);
        self
    }

    /// Discards both the log and the result file.
    #[must_use]
    pub fn quiet(self) -> Self {
        self.logfile(Sink::DevNull).resultfile(Sink::DevNull).showprogress(false)
    }

    /// Adds a keyword argument that has no typed field.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<crate::args::ArgValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    fn into_foreign(self) -> Vec<(String, ForeignValue)> {
        let mut kwargs = Vec::new();
        if let Some(sink) = &self.logfile {
            kwargs.push(("logfile".to_owned(), sink.to_foreign()));
        }
        if let Some(sink) = &self.resultfile {
            kwargs.push(("resultfile".to_owned(), sink.to_foreign()));
        }
        if let Some(show) = self.showprogress {
            kwargs.push(("showprogress".to_owned(), ForeignValue::Bool(show)));
        }
        kwargs.extend(self.extra.normalized().into_foreign());
        kwargs
    }
}

/// Engine-side vector of per-condition results.
pub struct ResultHandle {
    foreign: ForeignRef,
}

impl ResultHandle {
    /// Foreign reference to the result vector.
    #[must_use]
    pub const fn foreign(&self) -> &ForeignRef {
        &self.foreign
    }

    /// Session the results live in.
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        self.foreign.session()
    }

    /// Number of analysed conditions, asked of the engine.
    pub fn condition_count(&self) -> Result<usize> {
        let value = self.foreign.call("length", Vec::new())?;
        value
            .as_i64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| PssfssError::unexpected("non-negative length", value.kind()))
    }
}

impl fmt::Debug for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle")
            .field("foreign", &self.foreign)
            .finish()
    }
}

/// Analyses `strata` at every frequency and steering condition.
///
/// The caller's list is only borrowed; sheets are replaced by their foreign references in
/// a private copy. Failures are reported as they come from the engine, with no retry.
#[instrument(skip_all, fields(strata = strata.len(), frequencies = frequencies.len()))]
pub fn analyze(
    session: &Arc<Session>,
    strata: &[Stratum],
    frequencies: &Frequencies,
    steering: &Steering,
    options: &AnalysisOptions,
) -> Result<ResultHandle> {
    let encoded = strata
        .iter()
        .map(|stratum| stratum.to_foreign(session))
        .collect::<Result<Vec<_>>>()?;
    let request = Request::Call {
        function: "analyze".to_owned(),
        args: vec![
            ForeignValue::Vector(encoded),
            frequencies.to_foreign(),
            steering.encode(),
        ],
        kwargs: options.clone().into_foreign(),
        retain: true,
    };
    let foreign = session.retain(&request)?;
    info!(result = %foreign.id(), "analysis finished");
    Ok(ResultHandle { foreign })
}
