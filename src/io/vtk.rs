//! VTK legacy ASCII export of a sheet triangulation.
//!
//! The file holds one POLYDATA set: nodes as points (z = 0), faces as triangles and
//! edges as lines, so ParaView and similar tools can display the mesh.

use std::io::{self, Write};

use crate::sheet::SheetGeometry;

/// Writes the VTK ASCII file header.
pub fn write_vtk_header<W: Write>(mut writer: W, title: &str) -> io::Result<()> {
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    // The title line may not contain line breaks.
    writeln!(writer, "{}", title.replace(['\n', '\r'], " "))?;
    writeln!(writer, "ASCII")?;
    Ok(())
}

/// Writes `geometry` as legacy POLYDATA. Coordinates are in the sheet's own unit.
pub fn write_sheet_vtk<W: Write>(mut writer: W, geometry: &SheetGeometry) -> io::Result<()> {
    write_vtk_header(
        &mut writer,
        &format!("{} sheet, units {}", geometry.style, geometry.units),
    )?;
    writeln!(writer, "DATASET POLYDATA")?;
    writeln!(writer, "POINTS {} double", geometry.rho.len())?;
    for p in &geometry.rho {
        writeln!(writer, "{:.16e} {:.16e} 0", p.x, p.y)?;
    }
    if !geometry.fv.is_empty() {
        writeln!(writer, "POLYGONS {} {}", geometry.fv.len(), geometry.fv.len() * 4)?;
        for [a, b, c] in &geometry.fv {
            writeln!(writer, "3 {a} {b} {c}")?;
        }
    }
    if !geometry.e1.is_empty() {
        writeln!(writer, "LINES {} {}", geometry.e1.len(), geometry.e1.len() * 3)?;
        for (a, b) in geometry.e1.iter().zip(&geometry.e2) {
            writeln!(writer, "2 {a} {b}")?;
        }
    }
    Ok(())
}
