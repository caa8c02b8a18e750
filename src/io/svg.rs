//! SVG export of a rendered [`Scene`].

use std::io::{self, Write};

use crate::math::{Scalar, R2};
use crate::render::Scene;

/// Output size and spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgOptions {
    /// Width of the drawing area in pixels; the height follows the aspect ratio.
    pub width: Scalar,
    /// Blank border around the drawing, in pixels.
    pub margin: Scalar,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 640.0,
            margin: 40.0,
        }
    }
}

/// Maps sheet coordinates to SVG pixels (y axis pointing down).
struct Viewport {
    lo: R2,
    hi: R2,
    scale: Scalar,
    margin: Scalar,
}

impl Viewport {
    fn new(scene: &Scene, options: &SvgOptions) -> Self {
        let (lo, hi) = scene.bounds().unwrap_or((R2::zeros(), R2::new(1.0, 1.0)));
        let span = (hi - lo).max();
        let scale = if span > 0.0 { options.width / span } else { 1.0 };
        Self {
            lo,
            hi,
            scale,
            margin: options.margin,
        }
    }

    fn map(&self, p: &R2) -> (Scalar, Scalar) {
        (
            self.margin + (p.x - self.lo.x) * self.scale,
            self.margin + (self.hi.y - p.y) * self.scale,
        )
    }

    fn size(&self) -> (Scalar, Scalar) {
        let extent = (self.hi - self.lo) * self.scale;
        (extent.x + 2.0 * self.margin, extent.y + 2.0 * self.margin)
    }

    fn path(&self, points: &[R2]) -> String {
        points
            .iter()
            .map(|p| {
                let (x, y) = self.map(p);
                format!("{x:.3},{y:.3}")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Writes `scene` as a standalone SVG document with labelled axes.
pub fn write_svg<W: Write>(mut w: W, scene: &Scene, options: &SvgOptions) -> io::Result<()> {
    let view = Viewport::new(scene, options);
    let (width, height) = view.size();
    writeln!(
        w,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.3} {height:.3}">"#
    )?;
    for polygon in &scene.polygons {
        writeln!(
            w,
            r#"  <polygon points="{}" fill="{}" fill-opacity="{}" stroke="none"/>"#,
            view.path(&polygon.points),
            escape(&polygon.color),
            polygon.opacity
        )?;
    }
    for line in &scene.polylines {
        let dash = if line.dotted { r#" stroke-dasharray="2,3""# } else { "" };
        writeln!(
            w,
            r#"  <polyline points="{}" fill="none" stroke="{}" stroke-width="{}"{dash}/>"#,
            view.path(&line.points),
            escape(&line.color),
            line.width
        )?;
    }
    for marker in &scene.markers {
        let (x, y) = view.map(&marker.at);
        writeln!(w, r#"  <circle cx="{x:.3}" cy="{y:.3}" r="2" fill="{}"/>"#, escape(&marker.color))?;
    }
    for label in &scene.labels {
        let (x, y) = view.map(&label.at);
        writeln!(
            w,
            r#"  <text x="{x:.3}" y="{y:.3}" font-size="{}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            label.size,
            escape(&label.color),
            escape(&label.text)
        )?;
    }
    writeln!(
        w,
        r#"  <text x="{:.3}" y="{:.3}" text-anchor="middle">x ({})</text>"#,
        width / 2.0,
        height - view.margin / 4.0,
        scene.units
    )?;
    writeln!(
        w,
        r#"  <text x="{:.3}" y="{:.3}" text-anchor="middle" transform="rotate(-90 {:.3} {:.3})">y ({})</text>"#,
        view.margin / 2.0,
        height / 2.0,
        view.margin / 2.0,
        height / 2.0,
        scene.units
    )?;
    writeln!(w, "</svg>")?;
    Ok(())
}
