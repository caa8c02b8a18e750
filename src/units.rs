//! Length units understood by the foreign engine.
//!
//! A [`UnitTag`] multiplied by a number yields a [`Length`], which crosses the boundary
//! as a foreign length quantity (`10mm`, `0.5inch`, ...).

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use crate::args::ArgValue;
use crate::bridge::value::{ForeignValue, QuantityValue};
use crate::errors::PssfssError;
use crate::math::Scalar;

/// Symbolic length-unit multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitTag {
    /// Millimetre.
    Mm,
    /// Centimetre.
    Cm,
    /// Inch.
    Inch,
    /// Thousandth of an inch.
    Mil,
}

/// Millimetre unit tag.
pub const MM: UnitTag = UnitTag::Mm;
/// Centimetre unit tag.
pub const CM: UnitTag = UnitTag::Cm;
/// Inch unit tag.
pub const INCH: UnitTag = UnitTag::Inch;
/// Mil unit tag.
pub const MIL: UnitTag = UnitTag::Mil;

impl UnitTag {
    /// All supported units.
    pub const ALL: [Self; 4] = [Self::Mm, Self::Cm, Self::Inch, Self::Mil];

    /// Symbol used by the foreign engine.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::Inch => "inch",
            Self::Mil => "mil",
        }
    }

    /// Size of one unit in metres (exact by definition).
    #[must_use]
    pub const fn meters_per_unit(self) -> Scalar {
        match self {
            Self::Mm => 1.0e-3,
            Self::Cm => 1.0e-2,
            Self::Inch => 0.0254,
            Self::Mil => 2.54e-5,
        }
    }

    /// Resolves the tag to the foreign unit symbol.
    #[must_use]
    pub fn to_foreign(self) -> ForeignValue {
        ForeignValue::Unit(self.label().to_owned())
    }

    /// Combines the tag with a dynamically typed operand.
    ///
    /// Only numeric operands are accepted.
    pub fn multiply(self, operand: &ArgValue) -> Result<Length, PssfssError> {
        match *operand {
            ArgValue::Int(v) => Ok(Length::new(v as Scalar, self)),
            ArgValue::Float(v) => Ok(Length::new(v, self)),
            ref other => Err(PssfssError::TypeMismatch {
                unit: self,
                operand: other.kind(),
            }),
        }
    }
}

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitTag {
    type Err = PssfssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.label() == s.trim())
            .ok_or_else(|| PssfssError::UnexpectedValue {
                expected: "length unit (mm, cm, inch, mil)",
                found: s.to_owned(),
            })
    }
}

/// Length quantity as understood by the foreign engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    value: Scalar,
    unit: UnitTag,
}

impl Length {
    /// Creates a length of `value` units.
    #[must_use]
    pub const fn new(value: Scalar, unit: UnitTag) -> Self {
        Self { value, unit }
    }

    /// Magnitude in the stored unit.
    #[must_use]
    pub const fn value(&self) -> Scalar {
        self.value
    }

    /// Stored unit.
    #[must_use]
    pub const fn unit(&self) -> UnitTag {
        self.unit
    }

    /// Magnitude expressed in `unit`.
    #[must_use]
    pub fn value_in(&self, unit: UnitTag) -> Scalar {
        self.value * self.unit.meters_per_unit() / unit.meters_per_unit()
    }

    /// Foreign representation.
    #[must_use]
    pub fn to_foreign(&self) -> ForeignValue {
        ForeignValue::Quantity(QuantityValue {
            value: self.value,
            unit: self.unit.label().to_owned(),
        })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl Mul<Scalar> for UnitTag {
    type Output = Length;

    fn mul(self, rhs: Scalar) -> Length {
        Length::new(rhs, self)
    }
}

impl Mul<UnitTag> for Scalar {
    type Output = Length;

    fn mul(self, rhs: UnitTag) -> Length {
        rhs * self
    }
}

impl Mul<i32> for UnitTag {
    type Output = Length;

    fn mul(self, rhs: i32) -> Length {
        Length::new(Scalar::from(rhs), self)
    }
}

impl Mul<UnitTag> for i32 {
    type Output = Length;

    fn mul(self, rhs: UnitTag) -> Length {
        rhs * self
    }
}
