//! Unit-carrying values.
//!
//! A [`Unit`] keeps its magnitude in the unit it was written in and knows how
//! to reach the SI base unit of its dimension. Only the `<number> <name>`
//! literal form is understood here; richer unit expressions are parsed
//! elsewhere.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};

/// Exponents over the base quantities: length, mass, time, current,
/// temperature, luminous intensity, amount of substance, planar angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension([i8; 8]);

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension([0; 8]);
    pub const LENGTH: Dimension = Dimension([1, 0, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Dimension = Dimension([0, 1, 0, 0, 0, 0, 0, 0]);
    pub const TIME: Dimension = Dimension([0, 0, 1, 0, 0, 0, 0, 0]);
    pub const TEMPERATURE: Dimension = Dimension([0, 0, 0, 0, 1, 0, 0, 0]);
    pub const ANGLE: Dimension = Dimension([0, 0, 0, 0, 0, 0, 0, 1]);

    pub fn exponents(&self) -> [i8; 8] {
        self.0
    }

    pub fn is_angle(&self) -> bool {
        *self == Dimension::ANGLE
    }
}

struct UnitDef {
    symbol: &'static str,
    aliases: &'static [&'static str],
    dimension: Dimension,
    /// SI value = (magnitude + offset) * scale
    scale: f64,
    offset: f64,
}

const fn def(
    symbol: &'static str,
    aliases: &'static [&'static str],
    dimension: Dimension,
    scale: f64,
    offset: f64,
) -> UnitDef {
    UnitDef {
        symbol,
        aliases,
        dimension,
        scale,
        offset,
    }
}

static CATALOGUE: &[UnitDef] = &[
    def("rad", &["radian", "radians"], Dimension::ANGLE, 1.0, 0.0),
    def("deg", &["degree", "degrees"], Dimension::ANGLE, PI / 180.0, 0.0),
    def("grad", &["gradian", "gradians"], Dimension::ANGLE, PI / 200.0, 0.0),
    def("cycle", &["cycles"], Dimension::ANGLE, 2.0 * PI, 0.0),
    def("m", &["meter", "meters"], Dimension::LENGTH, 1.0, 0.0),
    def("cm", &["centimeter", "centimeters"], Dimension::LENGTH, 0.01, 0.0),
    def("km", &["kilometer", "kilometers"], Dimension::LENGTH, 1000.0, 0.0),
    def("s", &["second", "seconds"], Dimension::TIME, 1.0, 0.0),
    def("min", &["minute", "minutes"], Dimension::TIME, 60.0, 0.0),
    def("h", &["hour", "hours"], Dimension::TIME, 3600.0, 0.0),
    def("g", &["gram", "grams"], Dimension::MASS, 0.001, 0.0),
    def("kg", &["kilogram", "kilograms"], Dimension::MASS, 1.0, 0.0),
    def("K", &["kelvin"], Dimension::TEMPERATURE, 1.0, 0.0),
    def("celsius", &["degC"], Dimension::TEMPERATURE, 1.0, 273.15),
    def("fahrenheit", &["degF"], Dimension::TEMPERATURE, 1.0 / 1.8, 459.67),
];

fn lookup(name: &str) -> Option<&'static UnitDef> {
    CATALOGUE
        .iter()
        .find(|d| d.symbol == name || d.aliases.contains(&name))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub value: f64,
    symbol: String,
    dimension: Dimension,
    scale: f64,
    offset: f64,
}

impl Unit {
    pub fn new(value: f64, name: &str) -> MathResult<Unit> {
        let d = lookup(name)
            .ok_or_else(|| MathError::domain("unit", format!("unknown unit \"{name}\"")))?;
        Ok(Unit {
            value,
            symbol: d.symbol.to_string(),
            dimension: d.dimension,
            scale: d.scale,
            offset: d.offset,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn to_si(&self) -> f64 {
        (self.value + self.offset) * self.scale
    }

    /// Magnitude in radians, or `None` when this is not a planar angle.
    pub fn to_radians(&self) -> Option<f64> {
        self.dimension.is_angle().then(|| self.to_si())
    }

    /// Same unit, new magnitude.
    pub fn with_value(&self, value: f64) -> Unit {
        Unit {
            value,
            ..self.clone()
        }
    }

    /// Re-expresses `other` in this unit's scale. Dimensions must agree.
    pub fn convert_from(&self, other: &Unit) -> Option<f64> {
        (self.dimension == other.dimension).then(|| other.to_si() / self.scale - self.offset)
    }
}

impl FromStr for Unit {
    type Err = MathError;

    fn from_str(s: &str) -> MathResult<Unit> {
        let s = s.trim();
        // Rightmost split first, so "1e3m" reads as 1e3 metres.
        for (i, _) in s.char_indices().rev().filter(|(i, _)| *i > 0) {
            let (number, name) = s.split_at(i);
            let name = name.trim();
            if let (Ok(value), Some(_)) = (number.trim().parse::<f64>(), lookup(name)) {
                return Unit::new(value, name);
            }
        }
        Err(MathError::domain(
            "unit",
            format!("cannot parse \"{s}\" as <number> <unit>"),
        ))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_number_and_name() {
        let u: Unit = "45 deg".parse().expect("should parse");
        assert_eq!(u.value, 45.0);
        assert_eq!(u.symbol(), "deg");
        assert!(u.dimension().is_angle());

        let u: Unit = "-45deg".parse().expect("should parse");
        assert_eq!(u.value, -45.0);

        let u: Unit = "1e3m".parse().expect("should parse");
        assert_eq!(u.value, 1000.0);
        assert_eq!(u.dimension(), Dimension::LENGTH);

        let u: Unit = "5 celsius".parse().expect("should parse");
        assert_eq!(u.dimension(), Dimension::TEMPERATURE);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("5 parsecs".parse::<Unit>().is_err());
        assert!("deg".parse::<Unit>().is_err());
        assert!(Unit::new(1.0, "furlong").is_err());
    }

    #[test]
    fn converts_to_si_with_offsets() {
        assert_relative_eq!(Unit::new(180.0, "deg").unwrap().to_si(), PI);
        assert_relative_eq!(Unit::new(0.0, "celsius").unwrap().to_si(), 273.15);
        assert_relative_eq!(
            Unit::new(32.0, "fahrenheit").unwrap().to_si(),
            273.15,
            epsilon = 1e-12
        );
    }

    #[test]
    fn radians_only_for_angles() {
        assert_relative_eq!(
            Unit::new(200.0, "grad").unwrap().to_radians().unwrap(),
            PI
        );
        assert!(Unit::new(5.0, "celsius").unwrap().to_radians().is_none());
    }

    #[test]
    fn convert_from_requires_matching_dimension() {
        let cm = Unit::new(0.0, "cm").unwrap();
        let km = Unit::new(1.5, "km").unwrap();
        assert_relative_eq!(cm.convert_from(&km).unwrap(), 150_000.0);
        assert!(cm.convert_from(&Unit::new(1.0, "s").unwrap()).is_none());
    }
}
