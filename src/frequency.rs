//! Analysis frequencies (GHz) and sweep builders.

use crate::bridge::ForeignValue;
use crate::math::Scalar;

/// Frequencies at which an analysis is run, in GHz.
#[derive(Debug, Clone, PartialEq)]
pub enum Frequencies {
    /// One frequency.
    Single(Scalar),
    /// Several frequencies, analysed in order.
    List(Vec<Scalar>),
}

impl Frequencies {
    /// `n` linearly spaced frequencies in `[start, stop]`.
    #[must_use]
    pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Self {
        Self::List(linspace(start, stop, n))
    }

    /// `n` logarithmically spaced frequencies in `[start, stop]`.
    ///
    /// Returns `None` unless both bounds are positive.
    #[must_use]
    pub fn logspace(start: Scalar, stop: Scalar, n: usize) -> Option<Self> {
        logspace(start, stop, n).map(Self::List)
    }

    /// Number of frequencies.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(values) => values.len(),
        }
    }

    /// True for an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frequencies in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Scalar] {
        match self {
            Self::Single(f) => std::slice::from_ref(f),
            Self::List(values) => values,
        }
    }

    /// Foreign form: a bare number or a `Float64` array.
    #[must_use]
    pub fn to_foreign(&self) -> ForeignValue {
        match self {
            Self::Single(f) => ForeignValue::Float(*f),
            Self::List(values) => ForeignValue::Array(values.clone()),
        }
    }
}

impl From<Scalar> for Frequencies {
    fn from(f: Scalar) -> Self {
        Self::Single(f)
    }
}

impl From<i32> for Frequencies {
    fn from(f: i32) -> Self {
        Self::Single(Scalar::from(f))
    }
}

impl From<Vec<Scalar>> for Frequencies {
    fn from(values: Vec<Scalar>) -> Self {
        Self::List(values)
    }
}

impl From<&[Scalar]> for Frequencies {
    fn from(values: &[Scalar]) -> Self {
        Self::List(values.to_vec())
    }
}

impl<const N: usize> From<[Scalar; N]> for Frequencies {
    fn from(values: [Scalar; N]) -> Self {
        Self::List(values.to_vec())
    }
}

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced samples in [start, stop].
/// Both bounds must be positive.
#[must_use]
pub fn logspace(start: Scalar, stop: Scalar, n: usize) -> Option<Vec<Scalar>> {
    if !(start > 0.0 && stop > 0.0) {
        return None;
    }
    let samples = match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let log_start = start.log10();
            let step = (stop.log10() - log_start) / (n as Scalar - 1.0);
            (0..n)
                .map(|i| 10f64.powf(log_start + step * i as Scalar))
                .collect()
        }
    };
    Some(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_basic() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn logspace_spans_decades() {
        let v = logspace(1.0, 100.0, 3).expect("positive bounds");
        assert_relative_eq!(v[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(v[1], 10.0, epsilon = 1e-12);
        assert_relative_eq!(v[2], 100.0, epsilon = 1e-12);
        assert!(logspace(0.0, 10.0, 4).is_none());
    }

    #[test]
    fn single_frequency_crosses_as_a_number() {
        let f = Frequencies::from(10);
        assert_eq!(f.to_foreign(), ForeignValue::Float(10.0));
        assert_eq!(f.as_slice(), &[10.0]);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn sweeps_cross_as_arrays() {
        let f = Frequencies::linspace(1.0, 2.0, 3);
        assert_eq!(f.to_foreign(), ForeignValue::Array(vec![1.0, 1.5, 2.0]));
        assert!(!f.is_empty());
    }
}
