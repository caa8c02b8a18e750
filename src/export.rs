//! Conversion of analysis results into third-party file formats.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::analysis::ResultHandle;
use crate::bridge::{ForeignValue, Request};
use crate::errors::Result;
use crate::session::Session;

/// Results to convert: in memory or a result file written by an earlier analysis.
#[derive(Debug, Clone, Copy)]
pub enum ResultSource<'a> {
    /// Results still held by the engine.
    Results(&'a ResultHandle),
    /// Result file on disk.
    File(&'a Path),
}

impl ResultSource<'_> {
    fn to_foreign(self) -> ForeignValue {
        match self {
            Self::Results(results) => results.foreign().to_foreign(),
            Self::File(path) => ForeignValue::Str(path.to_string_lossy().into_owned()),
        }
    }
}

impl<'a> From<&'a ResultHandle> for ResultSource<'a> {
    fn from(results: &'a ResultHandle) -> Self {
        Self::Results(results)
    }
}

impl<'a> From<&'a Path> for ResultSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::File(path)
    }
}

/// Object naming inside a TEP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Res2TepOptions {
    /// Object name.
    pub name: String,
    /// Object class.
    pub class: String,
}

impl Default for Res2TepOptions {
    fn default() -> Self {
        Self {
            name: "tep".to_owned(),
            class: "res2tep".to_owned(),
        }
    }
}

fn convert(
    session: &Arc<Session>,
    function: &str,
    source: ResultSource<'_>,
    path: &Path,
    kwargs: Vec<(String, ForeignValue)>,
) -> Result<()> {
    if let ResultSource::Results(results) = source {
        results.foreign().ensure_in(session)?;
    }
    session.request(&Request::Call {
        function: function.to_owned(),
        args: vec![source.to_foreign(), ForeignValue::Str(path.to_string_lossy().into_owned())],
        kwargs,
        retain: false,
    })?;
    info!(output = %path.display(), "{function} written");
    Ok(())
}

/// Writes a TICRA-compatible TEP file.
pub fn res2tep(session: &Arc<Session>, source: ResultSource<'_>, path: &Path, options: &Res2TepOptions) -> Result<()> {
    convert(
        session,
        "res2tep",
        source,
        path,
        vec![
            ("name".to_owned(), ForeignValue::Str(options.name.clone())),
            ("class".to_owned(), ForeignValue::Str(options.class.clone())),
        ],
    )
}

/// Writes an HFSS SBR+ compatible Fresnel table.
pub fn res2fresnel(session: &Arc<Session>, source: ResultSource<'_>, path: &Path) -> Result<()> {
    convert(session, "res2fresnel", source, path, Vec::new())
}
