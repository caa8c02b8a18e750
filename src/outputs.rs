//! Output requests and extraction of result columns.

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use tracing::{debug, instrument};

use crate::analysis::ResultHandle;
use crate::bridge::{ForeignValue, Request};
use crate::errors::{PssfssError, Result};
use crate::math::{unzip_rows, CScalar, Scalar};
use crate::session::{ForeignRef, Session};

/// Parsed output request, e.g. `"FGHz theta s21dB(L,v) s21dB(R,V)"`.
///
/// The text is parsed by the engine; only the number of fields is recorded here.
pub struct OutputRequest {
    spec: String,
    fields: usize,
    foreign: ForeignRef,
}

impl OutputRequest {
    /// Hands `spec` to the engine's output parser.
    pub fn new(session: &Arc<Session>, spec: &str) -> Result<Self> {
        let foreign = session.retain(&Request::Outputs {
            spec: spec.to_owned(),
        })?;
        let count = foreign.call("length", Vec::new())?;
        let fields = count
            .as_i64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| PssfssError::unexpected("field count", count.kind()))?;
        Ok(Self {
            spec: spec.to_owned(),
            fields,
            foreign,
        })
    }

    /// Text the request was built from.
    #[must_use]
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Number of requested fields.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.fields
    }

    /// Foreign reference to the parsed request.
    #[must_use]
    pub const fn foreign(&self) -> &ForeignRef {
        &self.foreign
    }
}

impl fmt::Debug for OutputRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputRequest")
            .field("spec", &self.spec)
            .field("fields", &self.fields)
            .field("foreign", &self.foreign)
            .finish()
    }
}

/// One requested field, one entry per analysed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Real-valued field.
    Real(DVector<Scalar>),
    /// Complex-valued field (e.g. a raw scattering parameter).
    Complex(DVector<CScalar>),
}

impl Column {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Real(v) => v.len(),
            Self::Complex(v) => v.len(),
        }
    }

    /// True when no condition was analysed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real values, if the field is real.
    #[must_use]
    pub const fn as_real(&self) -> Option<&DVector<Scalar>> {
        match self {
            Self::Real(v) => Some(v),
            Self::Complex(_) => None,
        }
    }

    /// Complex values, if the field is complex.
    #[must_use]
    pub const fn as_complex(&self) -> Option<&DVector<CScalar>> {
        match self {
            Self::Complex(v) => Some(v),
            Self::Real(_) => None,
        }
    }

    /// Values widened to complex.
    #[must_use]
    pub fn to_complex(&self) -> DVector<CScalar> {
        match self {
            Self::Real(v) => v.map(|re| CScalar::new(re, 0.0)),
            Self::Complex(v) => v.clone(),
        }
    }
}

/// Pulls the requested fields out of `result`, one column per field in request order.
#[instrument(skip_all, fields(spec = %request.spec()))]
pub fn extract(session: &Arc<Session>, result: &ResultHandle, request: &OutputRequest) -> Result<Vec<Column>> {
    result.foreign().ensure_in(session)?;
    request.foreign().ensure_in(session)?;
    let table = session.request(&Request::call(
        "extract_result",
        vec![result.foreign().to_foreign(), request.foreign().to_foreign()],
    ))?;
    let ForeignValue::Table(rows) = table else {
        return Err(PssfssError::unexpected("row-major result table", table.kind()));
    };
    debug!(rows = rows.len(), "result table received");
    columns_from_rows(&rows, request.field_count())
}

/// Transposes a row-major table of numbers into typed columns.
pub(crate) fn columns_from_rows(rows: &[Vec<ForeignValue>], width: usize) -> Result<Vec<Column>> {
    let mut complex = vec![false; width];
    let mut numeric = Vec::with_capacity(rows.len());
    for (r, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(PssfssError::unexpected(
                "one entry per requested field",
                format!("row {r} has {} entries for {width} fields", row.len()),
            ));
        }
        let values = row
            .iter()
            .map(|value| value.as_complex().ok_or_else(|| PssfssError::unexpected("numeric result", value.kind())))
            .collect::<Result<Vec<_>>>()?;
        for (flag, value) in complex.iter_mut().zip(row) {
            *flag |= matches!(value, ForeignValue::Complex(_));
        }
        numeric.push(values);
    }
    let columns = unzip_rows(&numeric, width)
        .map_err(|r| PssfssError::unexpected("rectangular result table", format!("ragged row {r}")))?;
    Ok(columns
        .into_iter()
        .zip(complex)
        .map(|(column, is_complex)| {
            if is_complex {
                Column::Complex(column)
            } else {
                Column::Real(column.map(|c| c.re))
            }
        })
        .collect())
}
