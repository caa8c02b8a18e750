//! Scan-angle and phase-increment steering specifications.
//!
//! Each shape has exactly two fields whose names and order are fixed. The encoding
//! keeps both verbatim; only the values are converted.

use crate::bridge::ForeignValue;
use crate::errors::{PssfssError, Result};
use crate::math::Scalar;

/// One steering field: a single value or a sweep of values (degrees).
#[derive(Debug, Clone, PartialEq)]
pub enum SteeringValue {
    /// Passed through unchanged.
    Scalar(Scalar),
    /// Converted element-wise to a foreign numeric array.
    Sequence(Vec<Scalar>),
}

impl SteeringValue {
    fn encode(&self) -> ForeignValue {
        match self {
            Self::Scalar(v) => ForeignValue::Float(*v),
            Self::Sequence(values) => ForeignValue::Array(values.clone()),
        }
    }

    fn decode(value: &ForeignValue) -> Result<Self> {
        if let Some(v) = value.as_f64() {
            return Ok(Self::Scalar(v));
        }
        value
            .as_f64_vec()
            .map(Self::Sequence)
            .ok_or_else(|| PssfssError::unexpected("steering scalar or numeric array", value.kind()))
    }
}

impl From<Scalar> for SteeringValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<i32> for SteeringValue {
    fn from(value: i32) -> Self {
        Self::Scalar(Scalar::from(value))
    }
}

impl From<Vec<Scalar>> for SteeringValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::Sequence(values)
    }
}

impl From<&[Scalar]> for SteeringValue {
    fn from(values: &[Scalar]) -> Self {
        Self::Sequence(values.to_vec())
    }
}

impl<const N: usize> From<[Scalar; N]> for SteeringValue {
    fn from(values: [Scalar; N]) -> Self {
        Self::Sequence(values.to_vec())
    }
}

/// Excitation steering for an analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Steering {
    /// Incidence angles, theta first.
    ThetaPhi {
        /// Polar angle.
        theta: SteeringValue,
        /// Azimuth angle.
        phi: SteeringValue,
    },
    /// Incidence angles, phi first.
    PhiTheta {
        /// Azimuth angle.
        phi: SteeringValue,
        /// Polar angle.
        theta: SteeringValue,
    },
    /// Unit-cell phase increments, psi1 first.
    Psi1Psi2 {
        /// Phase increment along the first lattice vector.
        psi1: SteeringValue,
        /// Phase increment along the second lattice vector.
        psi2: SteeringValue,
    },
    /// Unit-cell phase increments, psi2 first.
    Psi2Psi1 {
        /// Phase increment along the second lattice vector.
        psi2: SteeringValue,
        /// Phase increment along the first lattice vector.
        psi1: SteeringValue,
    },
}

impl Steering {
    /// `(theta, phi)` steering.
    pub fn theta_phi(theta: impl Into<SteeringValue>, phi: impl Into<SteeringValue>) -> Self {
        Self::ThetaPhi {
            theta: theta.into(),
            phi: phi.into(),
        }
    }

    /// `(phi, theta)` steering.
    pub fn phi_theta(phi: impl Into<SteeringValue>, theta: impl Into<SteeringValue>) -> Self {
        Self::PhiTheta {
            phi: phi.into(),
            theta: theta.into(),
        }
    }

    /// `(psi1, psi2)` steering.
    pub fn psi1_psi2(psi1: impl Into<SteeringValue>, psi2: impl Into<SteeringValue>) -> Self {
        Self::Psi1Psi2 {
            psi1: psi1.into(),
            psi2: psi2.into(),
        }
    }

    /// `(psi2, psi1)` steering.
    pub fn psi2_psi1(psi2: impl Into<SteeringValue>, psi1: impl Into<SteeringValue>) -> Self {
        Self::Psi2Psi1 {
            psi2: psi2.into(),
            psi1: psi1.into(),
        }
    }

    /// Field names in declaration order.
    #[must_use]
    pub const fn field_names(&self) -> [&'static str; 2] {
        match self {
            Self::ThetaPhi { .. } => ["theta", "phi"],
            Self::PhiTheta { .. } => ["phi", "theta"],
            Self::Psi1Psi2 { .. } => ["psi1", "psi2"],
            Self::Psi2Psi1 { .. } => ["psi2", "psi1"],
        }
    }

    /// Field values in declaration order.
    #[must_use]
    pub const fn values(&self) -> [&SteeringValue; 2] {
        match self {
            Self::ThetaPhi { theta, phi } => [theta, phi],
            Self::PhiTheta { phi, theta } => [phi, theta],
            Self::Psi1Psi2 { psi1, psi2 } => [psi1, psi2],
            Self::Psi2Psi1 { psi2, psi1 } => [psi2, psi1],
        }
    }

    /// Foreign named tuple binding both field names, in order, to their values.
    #[must_use]
    pub fn encode(&self) -> ForeignValue {
        ForeignValue::NamedTuple(
            self.field_names()
                .into_iter()
                .zip(self.values())
                .map(|(name, value)| (name.to_owned(), value.encode()))
                .collect(),
        )
    }

    /// Rebuilds a steering value from its encoded form.
    pub fn decode(value: &ForeignValue) -> Result<Self> {
        let ForeignValue::NamedTuple(fields) = value else {
            return Err(PssfssError::unexpected("steering named tuple", value.kind()));
        };
        let [(first_name, first), (second_name, second)] = fields.as_slice() else {
            return Err(PssfssError::unexpected(
                "steering named tuple with two fields",
                format!("{} fields", fields.len()),
            ));
        };
        let first = SteeringValue::decode(first)?;
        let second = SteeringValue::decode(second)?;
        match (first_name.as_str(), second_name.as_str()) {
            ("theta", "phi") => Ok(Self::theta_phi(first, second)),
            ("phi", "theta") => Ok(Self::phi_theta(first, second)),
            ("psi1", "psi2") => Ok(Self::psi1_psi2(first, second)),
            ("psi2", "psi1") => Ok(Self::psi2_psi1(first, second)),
            (a, b) => Err(PssfssError::unexpected("steering field names", format!("({a}, {b})"))),
        }
    }
}
