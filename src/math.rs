//! Shared numerical primitives anchored on `nalgebra`.

use nalgebra::{DVector, Vector2};

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Convenient alias for two-dimensional real vectors (lattice vectors, node positions).
pub type R2 = Vector2<Scalar>;
/// Primary complex scalar type used for complex-valued outputs and material constants.
pub type CScalar = num_complex::Complex<Scalar>;

/// Transposes a row-major table into column vectors.
///
/// Every row must hold exactly `width` entries; the index of the first ragged row is
/// returned otherwise.
pub fn unzip_rows<T, R>(rows: &[R], width: usize) -> Result<Vec<DVector<T>>, usize>
where
    T: nalgebra::Scalar + Copy,
    R: AsRef<[T]>,
{
    if let Some(bad) = rows.iter().position(|row| row.as_ref().len() != width) {
        return Err(bad);
    }
    Ok((0..width)
        .map(|col| DVector::from_iterator(rows.len(), rows.iter().map(|row| row.as_ref()[col])))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unzip_transposes_rows_into_columns() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let cols = unzip_rows(&rows, 3).expect("rectangular");
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].as_slice(), &[1.0, 4.0]);
        assert_eq!(cols[2].as_slice(), &[3.0, 6.0]);
    }

    #[test]
    fn unzip_reports_ragged_row() {
        let rows = vec![vec![1, 2], vec![3]];
        assert_eq!(unzip_rows(&rows, 2), Err(1));
    }

    #[test]
    fn unzip_of_no_rows_keeps_width() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let cols = unzip_rows(&rows, 2).expect("empty table");
        assert_eq!(cols.len(), 2);
        assert!(cols.iter().all(|c| c.is_empty()));
    }
}
