//! Runtime values and the type tags the dispatcher keys on.

use std::fmt;

use num_complex::Complex64;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{config, NumberKind};
use crate::matrix::Matrix;
use crate::unit::Unit;

/// Runtime kind of a [`Value`]. Collections carry their own tag regardless
/// of what they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    Number,
    Complex,
    Decimal,
    Unit,
    Boolean,
    Absent,
    Text,
    Array,
    Matrix,
}

impl TypeTag {
    pub const ALL: [TypeTag; 9] = [
        TypeTag::Number,
        TypeTag::Complex,
        TypeTag::Decimal,
        TypeTag::Unit,
        TypeTag::Boolean,
        TypeTag::Absent,
        TypeTag::Text,
        TypeTag::Array,
        TypeTag::Matrix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Number => "number",
            TypeTag::Complex => "complex",
            TypeTag::Decimal => "decimal",
            TypeTag::Unit => "unit",
            TypeTag::Boolean => "boolean",
            TypeTag::Absent => "absent",
            TypeTag::Text => "text",
            TypeTag::Array => "array",
            TypeTag::Matrix => "matrix",
        }
    }

    pub fn is_collection(self) -> bool {
        matches!(self, TypeTag::Array | TypeTag::Matrix)
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A union of type tags, used for one argument position of a signature
/// (e.g. `array | matrix`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagSet(u16);

impl TagSet {
    pub const NONE: TagSet = TagSet(0);
    pub const COLLECTION: TagSet = TagSet(TypeTag::Array.bit() | TypeTag::Matrix.bit());
    pub const ANY: TagSet = TagSet((1 << TypeTag::ALL.len()) - 1);
    pub const SCALAR: TagSet = TagSet(TagSet::ANY.0 & !TagSet::COLLECTION.0);

    pub const fn of(tag: TypeTag) -> TagSet {
        TagSet(tag.bit())
    }

    pub const fn union(self, other: TagSet) -> TagSet {
        TagSet(self.0 | other.0)
    }

    pub fn contains(self, tag: TypeTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn intersects(self, other: TagSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn tags(self) -> impl Iterator<Item = TypeTag> {
        TypeTag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }
}

impl From<TypeTag> for TagSet {
    fn from(tag: TypeTag) -> Self {
        TagSet::of(tag)
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.tags().map(TypeTag::name).collect();
        write!(f, "{}", names.join(" | "))
    }
}

/// A value of any kind the engine operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    Number(f64),
    Complex(Complex64),
    Decimal(Decimal),
    Unit(Unit),
    Boolean(bool),
    Absent,
    Text(String),
    Array(Vec<Value>),
    Matrix(Matrix),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Number(_) => TypeTag::Number,
            Value::Complex(_) => TypeTag::Complex,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Unit(_) => TypeTag::Unit,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Absent => TypeTag::Absent,
            Value::Text(_) => TypeTag::Text,
            Value::Array(_) => TypeTag::Array,
            Value::Matrix(_) => TypeTag::Matrix,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.type_tag().is_collection()
    }

    /// Builds a numeric literal in the representation the active
    /// configuration selects.
    pub fn literal(x: f64) -> Value {
        match config().number {
            NumberKind::Number => Value::Number(x),
            NumberKind::Decimal => match Decimal::from_f64(x) {
                Some(d) => Value::Decimal(d),
                // NaN and infinities have no decimal form.
                None => Value::Number(x),
            },
        }
    }

    pub fn complex(re: f64, im: f64) -> Value {
        Value::Complex(Complex64::new(re, im))
    }

    pub fn array<I, T>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Value::Complex(z) => Some(*z),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_unit(&self) -> Option<&Unit> {
        match self {
            Value::Unit(u) => Some(u),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Complex64> for Value {
    fn from(z: Complex64) -> Self {
        Value::Complex(z)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Unit> for Value {
    fn from(u: Unit) -> Self {
        Value::Unit(u)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, Config};

    #[test]
    fn each_value_has_exactly_one_tag() {
        assert_eq!(Value::from(1.0).type_tag(), TypeTag::Number);
        assert_eq!(Value::complex(0.0, 1.0).type_tag(), TypeTag::Complex);
        assert_eq!(Value::from(Decimal::ONE).type_tag(), TypeTag::Decimal);
        assert_eq!(Value::from(true).type_tag(), TypeTag::Boolean);
        assert_eq!(Value::from(None::<f64>).type_tag(), TypeTag::Absent);
        assert_eq!(Value::from("x").type_tag(), TypeTag::Text);
        assert_eq!(Value::array([1.0, 2.0]).type_tag(), TypeTag::Array);
    }

    #[test]
    fn tag_sets_partition_scalars_and_collections() {
        for tag in TypeTag::ALL {
            assert!(TagSet::ANY.contains(tag));
            assert_ne!(TagSet::SCALAR.contains(tag), TagSet::COLLECTION.contains(tag));
        }
        assert!(!TagSet::SCALAR.intersects(TagSet::COLLECTION));
        assert_eq!(format!("{:?}", TagSet::COLLECTION), "array | matrix");
        assert_eq!(TagSet::NONE.tags().count(), 0);
    }

    #[test]
    fn literal_follows_configured_number_kind() {
        let _guard = config::test_lock();
        assert_eq!(Value::literal(0.5), Value::Number(0.5));

        config::set_config(Config {
            number: NumberKind::Decimal,
            ..Config::default()
        })
        .expect("config should be valid");
        let lit = Value::literal(0.5);
        config::set_config(Config::default()).expect("defaults are valid");

        assert_eq!(lit, Value::Decimal(Decimal::new(5, 1)));
    }
}
