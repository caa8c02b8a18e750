//! Keyword arguments destined for foreign constructors and their normalization.

use nalgebra::DVector;

use crate::bridge::ForeignValue;
use crate::math::{CScalar, Scalar};
use crate::units::{Length, UnitTag};

/// Key whose unit tag is resolved to a foreign unit symbol.
pub const UNITS_KEY: &str = "units";
/// Stand-in accepted for the foreign `class` keyword.
pub const CLASS_ALIAS: &str = "clas";
/// Foreign name of the sheet-class keyword.
pub const CLASS_KEY: &str = "class";

/// Host-side keyword argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Integer.
    Int(i64),
    /// Float.
    Float(Scalar),
    /// Complex number.
    Complex(CScalar),
    /// Boolean.
    Bool(bool),
    /// Character.
    Char(char),
    /// String.
    Str(String),
    /// Unresolved unit tag.
    Unit(UnitTag),
    /// Length quantity.
    Length(Length),
    /// Host ordered sequence.
    Sequence(Vec<ArgValue>),
    /// Host numeric array.
    Array(DVector<Scalar>),
    /// Already in foreign form.
    Foreign(ForeignValue),
}

impl ArgValue {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Unit(_) => "unit",
            Self::Length(_) => "length",
            Self::Sequence(_) => "sequence",
            Self::Array(_) => "array",
            Self::Foreign(_) => "foreign value",
        }
    }

    /// Converts the value into its foreign form.
    ///
    /// Integer-only sequences become integer arrays, numeric sequences become float
    /// arrays, anything else becomes an ordered collection.
    #[must_use]
    pub fn into_foreign(self) -> ForeignValue {
        match self {
            Self::Int(v) => ForeignValue::Int(v),
            Self::Float(v) => ForeignValue::Float(v),
            Self::Complex(v) => ForeignValue::Complex(v),
            Self::Bool(v) => ForeignValue::Bool(v),
            Self::Char(v) => ForeignValue::Char(v),
            Self::Str(v) => ForeignValue::Str(v),
            Self::Unit(unit) => unit.to_foreign(),
            Self::Length(len) => len.to_foreign(),
            Self::Array(values) => ForeignValue::Array(values.as_slice().to_vec()),
            Self::Sequence(items) => sequence_to_foreign(items),
            Self::Foreign(value) => value,
        }
    }

    const fn is_sequence_like(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Array(_))
    }
}

fn sequence_to_foreign(items: Vec<ArgValue>) -> ForeignValue {
    if items.iter().all(|v| matches!(v, ArgValue::Int(_))) && !items.is_empty() {
        return ForeignValue::IntArray(
            items
                .iter()
                .filter_map(|v| match *v {
                    ArgValue::Int(i) => Some(i),
                    _ => None,
                })
                .collect(),
        );
    }
    let numeric: Option<Vec<Scalar>> = items
        .iter()
        .map(|v| match *v {
            ArgValue::Int(i) => Some(i as Scalar),
            ArgValue::Float(f) => Some(f),
            _ => None,
        })
        .collect();
    match numeric {
        Some(values) => ForeignValue::Array(values),
        None => ForeignValue::Vector(items.into_iter().map(ArgValue::into_foreign).collect()),
    }
}

macro_rules! arg_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for ArgValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        })*
    };
}

arg_from! {
    i64 => Int,
    i32 => Int,
    f64 => Float,
    CScalar => Complex,
    bool => Bool,
    char => Char,
    String => Str,
    &str => Str,
    UnitTag => Unit,
    Length => Length,
    DVector<Scalar> => Array,
    ForeignValue => Foreign,
}

impl From<Vec<Scalar>> for ArgValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::Array(DVector::from_vec(values))
    }
}

impl<const N: usize> From<[Scalar; N]> for ArgValue {
    fn from(values: [Scalar; N]) -> Self {
        Self::Array(DVector::from_row_slice(&values))
    }
}

impl From<Vec<i64>> for ArgValue {
    fn from(values: Vec<i64>) -> Self {
        Self::Sequence(values.into_iter().map(Self::Int).collect())
    }
}

impl From<Vec<Length>> for ArgValue {
    fn from(values: Vec<Length>) -> Self {
        Self::Sequence(values.into_iter().map(Self::Length).collect())
    }
}

/// Ordered keyword-argument mapping. Keys are unique; re-inserting replaces in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KwArgs {
    entries: Vec<(String, ArgValue)>,
}

impl KwArgs {
    /// Empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`KwArgs::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ArgValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Appends all entries of `other`, replacing duplicates.
    pub fn extend(&mut self, other: Self) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Rewrites the mapping in place for a foreign constructor call.
    ///
    /// 1. a unit tag under `units` becomes the foreign unit symbol;
    /// 2. sequences and numeric arrays become foreign-native arrays;
    /// 3. `clas` is renamed to `class`.
    ///
    /// Each rule leaves already-normalized entries untouched. Other keys pass through.
    pub fn normalize(&mut self) {
        for (key, value) in &mut self.entries {
            if *key == UNITS_KEY {
                if let ArgValue::Unit(unit) = *value {
                    *value = ArgValue::Foreign(unit.to_foreign());
                }
            }
            if value.is_sequence_like() {
                let taken = std::mem::replace(value, ArgValue::Bool(false));
                *value = ArgValue::Foreign(taken.into_foreign());
            }
        }
        if let Some(class) = self.remove(CLASS_ALIAS) {
            self.insert(CLASS_KEY, class);
        }
    }

    /// Normalized copy.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Foreign keyword list in insertion order.
    #[must_use]
    pub fn into_foreign(self) -> Vec<(String, ForeignValue)> {
        self.entries
            .into_iter()
            .map(|(k, v)| (k, v.into_foreign()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for KwArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut kwargs = Self::new();
        for (k, v) in iter {
            kwargs.insert(k, v);
        }
        kwargs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{CM, MM};

    fn sample() -> KwArgs {
        KwArgs::new()
            .with("units", MM)
            .with("s1", [0.5, 0.0])
            .with("a", vec![0.1, 0.25])
            .with("sides", vec![4_i64, 6])
            .with("clas", 'M')
            .with("Nx", 10)
            .with("Lx", 2.0 * CM)
    }

    #[test]
    fn normalize_applies_all_three_rules() {
        let kwargs = sample().normalized();
        assert_eq!(
            kwargs.get("units"),
            Some(&ArgValue::Foreign(ForeignValue::Unit("mm".into())))
        );
        assert_eq!(
            kwargs.get("s1"),
            Some(&ArgValue::Foreign(ForeignValue::Array(vec![0.5, 0.0])))
        );
        assert_eq!(
            kwargs.get("sides"),
            Some(&ArgValue::Foreign(ForeignValue::IntArray(vec![4, 6])))
        );
        assert_eq!(kwargs.get("clas"), None);
        assert_eq!(kwargs.get("class"), Some(&ArgValue::Char('M')));
        assert_eq!(kwargs.get("Nx"), Some(&ArgValue::Int(10)));
        assert_eq!(kwargs.get("Lx"), Some(&ArgValue::Length(2.0 * CM)));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = sample().normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn unit_tag_outside_units_key_is_left_alone() {
        let kwargs = KwArgs::new().with("scale_unit", MM).normalized();
        assert_eq!(kwargs.get("scale_unit"), Some(&ArgValue::Unit(MM)));
    }

    #[test]
    fn normalize_preserves_sequence_order() {
        let kwargs = KwArgs::new()
            .with("b", vec![3.0, 1.0, 2.0])
            .normalized();
        assert_eq!(
            kwargs.into_foreign(),
            vec![("b".to_owned(), ForeignValue::Array(vec![3.0, 1.0, 2.0]))]
        );
    }

    #[test]
    fn mixed_sequences_become_ordered_collections() {
        let value = ArgValue::Sequence(vec![ArgValue::Length(1.0 * MM), ArgValue::Int(2)]);
        assert_eq!(
            value.into_foreign(),
            ForeignValue::Vector(vec![(1.0 * MM).to_foreign(), ForeignValue::Int(2)])
        );
    }

    #[test]
    fn insertion_replaces_existing_keys_in_place() {
        let kwargs = KwArgs::new().with("a", 1).with("b", 2).with("a", 3);
        let keys: Vec<_> = kwargs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(kwargs.get("a"), Some(&ArgValue::Int(3)));
    }
}
