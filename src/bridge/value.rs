//! Values that can cross the boundary to the foreign engine.
//!
//! The serialized form is an externally tagged JSON object, e.g. `{"float": 1.5}` or
//! `{"named_tuple": [["theta", {"float": 0.0}], ["phi", {"float": 0.0}]]}`. The driver
//! script in [`crate::bridge::julia`] decodes and encodes the same shapes.
//!
//! JSON has no literal for non-finite numbers, so NaN and the infinities travel as the
//! strings `"NaN"`, `"Inf"` and `"-Inf"` wherever a float may appear.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::math::{CScalar, Scalar};

/// Identifier of an object retained inside the foreign process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(pub u64);

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One float on the wire: a JSON number, or a string naming a non-finite value.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireFloat {
    Finite(Scalar),
    Special(String),
}

impl From<Scalar> for WireFloat {
    fn from(v: Scalar) -> Self {
        if v.is_finite() {
            Self::Finite(v)
        } else if v.is_nan() {
            Self::Special("NaN".to_owned())
        } else if v > 0.0 {
            Self::Special("Inf".to_owned())
        } else {
            Self::Special("-Inf".to_owned())
        }
    }
}

impl TryFrom<WireFloat> for Scalar {
    type Error = String;

    fn try_from(wire: WireFloat) -> Result<Self, Self::Error> {
        match wire {
            WireFloat::Finite(v) => Ok(v),
            WireFloat::Special(s) => match s.as_str() {
                "NaN" => Ok(Self::NAN),
                "Inf" => Ok(Self::INFINITY),
                "-Inf" => Ok(Self::NEG_INFINITY),
                other => Err(format!("`{other}` is not a float")),
            },
        }
    }
}

mod float_wire {
    use serde::de::Error as _;

    use super::*;

    pub fn serialize<S: Serializer>(v: &Scalar, s: S) -> Result<S::Ok, S::Error> {
        WireFloat::from(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Scalar, D::Error> {
        Scalar::try_from(WireFloat::deserialize(d)?).map_err(D::Error::custom)
    }
}

mod floats_wire {
    use serde::de::Error as _;

    use super::*;

    pub fn serialize<S: Serializer>(values: &[Scalar], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(values.iter().map(|&v| WireFloat::from(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Scalar>, D::Error> {
        Vec::<WireFloat>::deserialize(d)?
            .into_iter()
            .map(Scalar::try_from)
            .collect::<Result<_, _>>()
            .map_err(D::Error::custom)
    }
}

/// Complex numbers travel as `[re, im]`.
mod complex_wire {
    use serde::de::Error as _;

    use super::*;

    pub fn serialize<S: Serializer>(c: &CScalar, s: S) -> Result<S::Ok, S::Error> {
        [WireFloat::from(c.re), WireFloat::from(c.im)].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<CScalar, D::Error> {
        let [re, im] = <[WireFloat; 2]>::deserialize(d)?;
        let re = Scalar::try_from(re).map_err(D::Error::custom)?;
        let im = Scalar::try_from(im).map_err(D::Error::custom)?;
        Ok(CScalar::new(re, im))
    }
}

/// Quantity with a length unit, e.g. `10mm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityValue {
    /// Numeric magnitude.
    #[serde(with = "float_wire")]
    pub value: Scalar,
    /// Unit label as known to the foreign engine.
    pub unit: String,
}

/// Deferred constructor call evaluated by the foreign engine while decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructValue {
    /// Name of the foreign constructor.
    pub function: String,
    /// Keyword arguments in insertion order.
    pub kwargs: Vec<(String, ForeignValue)>,
}

/// 2^63, the magnitude bound of an integral float that fits in an `i64`.
const I64_BOUND: Scalar = 9_223_372_036_854_775_808.0;

/// A value in the foreign engine's data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignValue {
    /// The foreign `nothing`.
    Nothing,
    /// Boolean.
    Bool(bool),
    /// Machine integer.
    Int(i64),
    /// Double precision float.
    #[serde(with = "float_wire")]
    Float(Scalar),
    /// Complex double.
    #[serde(with = "complex_wire")]
    Complex(CScalar),
    /// Single character.
    Char(char),
    /// String.
    Str(String),
    /// Global binding resolved by name on the foreign side (e.g. `devnull`, `STL_ASCII`).
    Global(String),
    /// Length unit symbol (e.g. `mm`).
    Unit(String),
    /// Length quantity.
    Quantity(QuantityValue),
    /// Foreign-native `Float64` array.
    #[serde(with = "floats_wire")]
    Array(Vec<Scalar>),
    /// Foreign-native `Int` array.
    IntArray(Vec<i64>),
    /// Ordered heterogeneous collection.
    Vector(Vec<ForeignValue>),
    /// Row-major two dimensional table.
    Table(Vec<Vec<ForeignValue>>),
    /// Named tuple; field order is significant.
    NamedTuple(Vec<(String, ForeignValue)>),
    /// Reference to an object retained by the foreign engine.
    Ref(RefId),
    /// Constructor call evaluated on the foreign side.
    Construct(ConstructValue),
}

impl ForeignValue {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Char(_) => "char",
            Self::Str(_) => "str",
            Self::Global(_) => "global",
            Self::Unit(_) => "unit",
            Self::Quantity(_) => "quantity",
            Self::Array(_) => "array",
            Self::IntArray(_) => "int_array",
            Self::Vector(_) => "vector",
            Self::Table(_) => "table",
            Self::NamedTuple(_) => "named_tuple",
            Self::Ref(_) => "ref",
            Self::Construct(_) => "construct",
        }
    }

    /// Real scalar view of a numeric value.
    #[must_use]
    pub fn as_f64(&self) -> Option<Scalar> {
        match *self {
            Self::Int(v) => Some(v as Scalar),
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when integral.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Float(v) if v.fract() == 0.0 && v >= -I64_BOUND && v < I64_BOUND => Some(v as i64),
            _ => None,
        }
    }

    /// Complex view of a numeric value.
    #[must_use]
    pub fn as_complex(&self) -> Option<CScalar> {
        match *self {
            Self::Complex(c) => Some(c),
            _ => self.as_f64().map(|re| CScalar::new(re, 0.0)),
        }
    }

    /// Numeric array view. Integer arrays and vectors of numbers are widened.
    #[must_use]
    pub fn as_f64_vec(&self) -> Option<Vec<Scalar>> {
        match self {
            Self::Array(values) => Some(values.clone()),
            Self::IntArray(values) => Some(values.iter().map(|&v| v as Scalar).collect()),
            Self::Vector(items) => items.iter().map(Self::as_f64).collect(),
            _ => None,
        }
    }

    /// Integer array view.
    #[must_use]
    pub fn as_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            Self::IntArray(values) => Some(values.clone()),
            Self::Vector(items) => items.iter().map(Self::as_i64).collect(),
            _ => None,
        }
    }

    /// String view of string-like values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Unit(s) | Self::Global(s) => Some(s),
            _ => None,
        }
    }

    /// Reference view.
    #[must_use]
    pub const fn as_ref_id(&self) -> Option<RefId> {
        match *self {
            Self::Ref(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Scalar> for ForeignValue {
    fn from(value: Scalar) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for ForeignValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ForeignValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ForeignValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ForeignValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Scalar>> for ForeignValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::Array(values)
    }
}

impl From<RefId> for ForeignValue {
    fn from(id: RefId) -> Self {
        Self::Ref(id)
    }
}
