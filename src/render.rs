//! Renderer-agnostic drawing of a sheet's triangulation.
//!
//! [`scene`] turns a [`SheetGeometry`] into plain primitives; the writers in
//! [`crate::io`] serialise them. Labels use the engine's 1-based numbering.

use std::ops::RangeInclusive;

use crate::errors::{PssfssError, Result};
use crate::math::{Scalar, R2};
use crate::sheet::{lattice_offset, SheetGeometry};
use crate::units::UnitTag;

/// What to draw and how.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Draw triangle edges.
    pub edges: bool,
    /// Fill triangle faces.
    pub faces: bool,
    /// Mark nodes.
    pub nodes: bool,
    /// Number edges at their midpoints.
    pub edgenumbers: bool,
    /// Number faces at their centroids.
    pub facenumbers: bool,
    /// Number nodes.
    pub nodenumbers: bool,
    /// Outline the unit cell.
    pub unitcell: bool,
    /// Edge colour.
    pub edgecolor: String,
    /// Face colour.
    pub facecolor: String,
    /// Node colour.
    pub nodecolor: String,
    /// Unit-cell outline colour.
    pub unitcellcolor: String,
    /// Repetitions along `s1` and `s2`, counted from 1.
    pub rep: (RangeInclusive<i32>, RangeInclusive<i32>),
    /// Label font size in points.
    pub fontsize: Scalar,
    /// Stroke width.
    pub linewidth: Scalar,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            edges: true,
            faces: false,
            nodes: false,
            edgenumbers: false,
            facenumbers: false,
            nodenumbers: false,
            unitcell: false,
            edgecolor: "red".to_owned(),
            facecolor: "red".to_owned(),
            nodecolor: "black".to_owned(),
            unitcellcolor: "blue".to_owned(),
            rep: (1..=1, 1..=1),
            fontsize: 9.0,
            linewidth: 1.5,
        }
    }
}

impl PlotOptions {
    /// Tiles `m × n` cells starting at `(1, 1)`.
    #[must_use]
    pub fn repeat(mut self, m: i32, n: i32) -> Self {
        self.rep = (1..=m, 1..=n);
        self
    }
}

/// Open or closed sequence of line segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Vertices in drawing order.
    pub points: Vec<R2>,
    /// Stroke colour.
    pub color: String,
    /// Stroke width.
    pub width: Scalar,
    /// Dotted stroke.
    pub dotted: bool,
}

/// Filled polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Vertices; the outline closes implicitly.
    pub points: Vec<R2>,
    /// Fill colour.
    pub color: String,
    /// Fill opacity in `[0, 1]`.
    pub opacity: Scalar,
}

/// Point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position.
    pub at: R2,
    /// Fill colour.
    pub color: String,
}

/// Centred text label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Anchor point.
    pub at: R2,
    /// Text.
    pub text: String,
    /// Text colour.
    pub color: String,
    /// Font size in points.
    pub size: Scalar,
}

/// Drawing primitives in sheet coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Unit of both axes.
    pub units: UnitTag,
    /// Filled faces, drawn first.
    pub polygons: Vec<Polygon>,
    /// Edges and unit-cell outlines.
    pub polylines: Vec<Polyline>,
    /// Node markers.
    pub markers: Vec<Marker>,
    /// Index annotations, drawn last.
    pub labels: Vec<Label>,
}

impl Scene {
    /// Axis-aligned bounding box of every primitive, `None` for an empty scene.
    #[must_use]
    pub fn bounds(&self) -> Option<(R2, R2)> {
        let points = self
            .polygons
            .iter()
            .flat_map(|p| p.points.iter())
            .chain(self.polylines.iter().flat_map(|l| l.points.iter()))
            .chain(self.markers.iter().map(|m| &m.at))
            .chain(self.labels.iter().map(|l| &l.at));
        points.fold(None, |acc, p| match acc {
            None => Some((*p, *p)),
            Some((lo, hi)) => Some((lo.inf(p), hi.sup(p))),
        })
    }

    /// True when nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.polylines.is_empty() && self.markers.is_empty() && self.labels.is_empty()
    }
}

fn node(geometry: &SheetGeometry, index: usize) -> Result<R2> {
    geometry.rho.get(index).copied().ok_or_else(|| {
        PssfssError::unexpected(
            "node index within the triangulation",
            format!("{index} of {} nodes", geometry.rho.len()),
        )
    })
}

/// Lays out `geometry` according to `options`.
///
/// Fails when an edge or face refers to a node that does not exist.
pub fn scene(geometry: &SheetGeometry, options: &PlotOptions) -> Result<Scene> {
    let mut scene = Scene {
        units: geometry.units,
        polygons: Vec::new(),
        polylines: Vec::new(),
        markers: Vec::new(),
        labels: Vec::new(),
    };

    let edges = geometry
        .e1
        .iter()
        .zip(&geometry.e2)
        .map(|(&a, &b)| -> Result<(R2, R2)> { Ok((node(geometry, a)?, node(geometry, b)?)) })
        .collect::<Result<Vec<_>>>()?;
    let faces = geometry
        .fv
        .iter()
        .map(|f| -> Result<[R2; 3]> { Ok([node(geometry, f[0])?, node(geometry, f[1])?, node(geometry, f[2])?]) })
        .collect::<Result<Vec<_>>>()?;

    let (mrange, nrange) = &options.rep;
    for m in mrange.clone() {
        for n in nrange.clone() {
            let offset = lattice_offset(geometry, m, n);
            if options.faces {
                scene.polygons.extend(faces.iter().map(|corners| Polygon {
                    points: corners.iter().map(|p| p + offset).collect(),
                    color: options.facecolor.clone(),
                    opacity: 0.8,
                }));
            }
            if options.edges {
                scene.polylines.extend(edges.iter().map(|(a, b)| Polyline {
                    points: vec![a + offset, b + offset],
                    color: options.edgecolor.clone(),
                    width: options.linewidth,
                    dotted: false,
                }));
            }
            if options.unitcell {
                let corners = [R2::zeros(), geometry.s1, geometry.s1 + geometry.s2, geometry.s2, R2::zeros()];
                scene.polylines.push(Polyline {
                    points: corners.iter().map(|p| p + offset).collect(),
                    color: options.unitcellcolor.clone(),
                    width: options.linewidth,
                    dotted: true,
                });
            }
            if options.nodes {
                scene.markers.extend(geometry.rho.iter().map(|p| Marker {
                    at: p + offset,
                    color: options.nodecolor.clone(),
                }));
            }
            if options.nodenumbers {
                scene.labels.extend(geometry.rho.iter().enumerate().map(|(i, p)| Label {
                    at: p + offset,
                    text: (i + 1).to_string(),
                    color: options.nodecolor.clone(),
                    size: options.fontsize,
                }));
            }
            if options.edgenumbers {
                scene.labels.extend(edges.iter().enumerate().map(|(i, (a, b))| Label {
                    at: (a + b) / 2.0 + offset,
                    text: (i + 1).to_string(),
                    color: options.edgecolor.clone(),
                    size: options.fontsize,
                }));
            }
            if options.facenumbers {
                scene.labels.extend(faces.iter().enumerate().map(|(i, [a, b, c])| Label {
                    at: (a + b + c) / 3.0 + offset,
                    text: (i + 1).to_string(),
                    color: options.facecolor.clone(),
                    size: options.fontsize,
                }));
            }
        }
    }
    Ok(scene)
}
