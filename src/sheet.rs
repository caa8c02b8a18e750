//! Handles to foreign sheet geometries and their host-side snapshot.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::bridge::{ForeignValue, Request};
use crate::errors::{PssfssError, Result};
use crate::math::{unzip_rows, Scalar, R2};
use crate::session::{ForeignRef, Session};
use crate::units::UnitTag;

/// Whether a sheet carries electric or magnetic surface current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetClass {
    /// Electric current (`'J'`).
    #[default]
    Electric,
    /// Magnetic current (`'M'`).
    Magnetic,
}

impl SheetClass {
    /// Character used by the foreign engine.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Electric => 'J',
            Self::Magnetic => 'M',
        }
    }

    /// Typed view of a class character; `None` for characters other than `'J'` and `'M'`.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'J' => Some(Self::Electric),
            'M' => Some(Self::Magnetic),
            _ => None,
        }
    }
}

impl From<SheetClass> for crate::args::ArgValue {
    fn from(class: SheetClass) -> Self {
        Self::Char(class.as_char())
    }
}

/// Mesh file formats the engine can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshFormat {
    /// ASCII STL.
    #[default]
    StlAscii,
    /// Binary STL.
    StlBinary,
}

impl MeshFormat {
    /// Name of the foreign enumeration value.
    #[must_use]
    pub const fn foreign_name(self) -> &'static str {
        match self {
            Self::StlAscii => "STL_ASCII",
            Self::StlBinary => "STL_BINARY",
        }
    }
}

/// Host copy of a sheet's triangulation, taken once when the handle is created.
///
/// All indices are zero-based.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGeometry {
    /// Length unit of every coordinate.
    pub units: UnitTag,
    /// First lattice vector.
    pub s1: R2,
    /// Second lattice vector.
    pub s2: R2,
    /// Start node of each edge.
    pub e1: Vec<usize>,
    /// End node of each edge.
    pub e2: Vec<usize>,
    /// Vertex nodes of each triangular face.
    pub fv: Vec<[usize; 3]>,
    /// Edges of each triangular face.
    pub fe: Vec<[usize; 3]>,
    /// Node coordinates.
    pub rho: Vec<R2>,
    /// Class character exactly as the engine stores it.
    pub class: char,
    /// Free-form description recorded by the engine.
    pub info: String,
    /// Constructor style that produced the sheet.
    pub style: String,
}

impl SheetGeometry {
    /// Pulls the fixed field set from a retained sheet.
    pub(crate) fn fetch(sheet: &ForeignRef) -> Result<Self> {
        let units_label = sheet.field("units", true)?;
        let units = units_label
            .as_str()
            .ok_or_else(|| PssfssError::unexpected("unit label", units_label.kind()))?
            .parse()?;

        let e1 = indices(&sheet.field("e1", false)?)?;
        let e2 = indices(&sheet.field("e2", false)?)?;
        if e1.len() != e2.len() {
            return Err(PssfssError::unexpected(
                "edge arrays of equal length",
                format!("{} start nodes, {} end nodes", e1.len(), e2.len()),
            ));
        }

        let class = match sheet.field("class", false)? {
            ForeignValue::Char(c) => c,
            other => return Err(PssfssError::unexpected("class character", other.kind())),
        };

        Ok(Self {
            units,
            s1: vector2(&sheet.field("s₁", false)?)?,
            s2: vector2(&sheet.field("s₂", false)?)?,
            e1,
            e2,
            fv: triangles(&sheet.field("fv", false)?)?,
            fe: triangles(&sheet.field("fe", false)?)?,
            rho: points(&sheet.field("ρ", false)?)?,
            class,
            info: string_field(&sheet.field("info", false)?)?,
            style: string_field(&sheet.field("style", false)?)?,
        })
    }

    /// Number of edges in the snapshot.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.e1.len()
    }

    /// Number of faces in the snapshot.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.fv.len()
    }

    /// Number of nodes in the snapshot.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.rho.len()
    }

    /// Electric or magnetic, when the class character is one of those two.
    #[must_use]
    pub const fn sheet_class(&self) -> Option<SheetClass> {
        SheetClass::from_char(self.class)
    }
}

fn vector2(value: &ForeignValue) -> Result<R2> {
    match value.as_f64_vec().as_deref() {
        Some(&[x, y]) => Ok(R2::new(x, y)),
        _ => Err(PssfssError::unexpected("two-element vector", value.kind())),
    }
}

fn points(value: &ForeignValue) -> Result<Vec<R2>> {
    match value {
        ForeignValue::Vector(items) => items.iter().map(vector2).collect(),
        ForeignValue::Table(rows) => rows
            .iter()
            .map(|row| vector2(&ForeignValue::Vector(row.clone())))
            .collect(),
        other => Err(PssfssError::unexpected("vector of node coordinates", other.kind())),
    }
}

fn to_zero_based(raw: i64) -> Result<usize> {
    usize::try_from(raw - 1)
        .map_err(|_| PssfssError::unexpected("1-based index", raw.to_string()))
}

fn indices(value: &ForeignValue) -> Result<Vec<usize>> {
    value
        .as_i64_vec()
        .ok_or_else(|| PssfssError::unexpected("integer index array", value.kind()))?
        .into_iter()
        .map(to_zero_based)
        .collect()
}

/// Unzips a 3×N index table (one row per triangle corner) into per-face triples.
///
/// An unset table arrives with no rows at all and means no faces.
fn triangles(value: &ForeignValue) -> Result<Vec<[usize; 3]>> {
    let ForeignValue::Table(rows) = value else {
        return Err(PssfssError::unexpected("3×N index table", value.kind()));
    };
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    if rows.len() != 3 {
        return Err(PssfssError::unexpected("3×N index table", format!("{} rows", rows.len())));
    }
    let rows: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| indices(&ForeignValue::Vector(row.clone())))
        .collect::<Result<_>>()?;
    // Transposing the 3×N table gives one 3-element column per face.
    let faces = unzip_rows(&rows, rows[0].len())
        .map_err(|row| PssfssError::unexpected("rectangular index table", format!("ragged row {row}")))?;
    Ok(faces.into_iter().map(|c| [c[0], c[1], c[2]]).collect())
}

fn string_field(value: &ForeignValue) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| PssfssError::unexpected("string", value.kind()))
}

/// Exclusive owner of one foreign sheet plus a snapshot of its triangulation.
pub struct SheetHandle {
    foreign: ForeignRef,
    geometry: SheetGeometry,
}

impl SheetHandle {
    /// Takes ownership of a retained sheet and snapshots its fields.
    pub(crate) fn from_foreign(foreign: ForeignRef) -> Result<Self> {
        let geometry = SheetGeometry::fetch(&foreign)?;
        debug!(
            style = %geometry.style,
            nodes = geometry.node_count(),
            faces = geometry.face_count(),
            "sheet snapshot taken"
        );
        Ok(Self { foreign, geometry })
    }

    /// Snapshot taken at construction.
    #[must_use]
    pub const fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }

    /// Constructor style, e.g. `"polyring"`.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.geometry.style
    }

    /// Length unit of the sheet.
    #[must_use]
    pub const fn units(&self) -> UnitTag {
        self.geometry.units
    }

    /// Foreign reference used when the sheet appears in a stratum list.
    #[must_use]
    pub const fn foreign(&self) -> &ForeignRef {
        &self.foreign
    }

    /// Session the sheet lives in.
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        self.foreign.session()
    }

    fn count(&self, function: &str) -> Result<usize> {
        let value = self.foreign.call(function, Vec::new())?;
        value
            .as_i64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| PssfssError::unexpected("non-negative count", value.kind()))
    }

    /// Number of edges, asked of the engine.
    pub fn edge_count(&self) -> Result<usize> {
        self.count("edgecount")
    }

    /// Number of faces, asked of the engine.
    pub fn face_count(&self) -> Result<usize> {
        self.count("facecount")
    }

    /// Number of nodes, asked of the engine.
    pub fn node_count(&self) -> Result<usize> {
        self.count("nodecount")
    }

    /// Writes the triangulation to `path` in `format`.
    pub fn export(&self, path: impl AsRef<Path>, format: MeshFormat) -> Result<()> {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.session().request(&Request::call(
            "export_sheet",
            vec![
                ForeignValue::Str(path),
                self.foreign.to_foreign(),
                ForeignValue::Global(format.foreign_name().to_owned()),
            ],
        ))?;
        Ok(())
    }

    /// Engine's textual description of the sheet.
    pub fn describe(&self) -> Result<String> {
        let value = self.foreign.call("repr", Vec::new())?;
        string_field(&value)
    }
}

impl fmt::Debug for SheetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetHandle")
            .field("foreign", &self.foreign)
            .field("style", &self.geometry.style)
            .field("units", &self.geometry.units)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SheetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.geometry;
        write!(
            f,
            "{} sheet ({}, class {}): {} nodes, {} edges, {} faces",
            g.style,
            g.units,
            g.class,
            g.node_count(),
            g.edge_count(),
            g.face_count()
        )
    }
}

/// Lattice offset of repetition `(m, n)`, counted from 1.
#[must_use]
pub fn lattice_offset(geometry: &SheetGeometry, m: i32, n: i32) -> R2 {
    geometry.s1 * Scalar::from(m - 1) + geometry.s2 * Scalar::from(n - 1)
}
