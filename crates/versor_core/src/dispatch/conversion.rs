//! Implicit type widenings and the cheapest way to chain them.

use std::collections::{BTreeMap, HashMap};

use num_complex::Complex64;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{MathError, MathResult};
use crate::value::{TagSet, TypeTag, Value};

pub type ConvertFn = fn(&Value) -> MathResult<Value>;

/// One allowed widening. Lower cost is preferred when ranking candidates.
#[derive(Clone, Copy)]
pub struct ConversionRule {
    pub from: TypeTag,
    pub to: TypeTag,
    pub cost: u32,
    pub convert: ConvertFn,
}

impl std::fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.cost)
    }
}

/// A chain of rules taking one tag to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPath {
    pub cost: u32,
    /// Indices into the owning table's rules, applied in order.
    steps: Vec<usize>,
}

impl ConversionPath {
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn hops(&self) -> usize {
        self.steps.len()
    }
}

#[derive(Debug)]
pub struct ConversionTable {
    rules: Vec<ConversionRule>,
    identity: ConversionPath,
    paths: HashMap<(TypeTag, TypeTag), ConversionPath>,
}

impl ConversionTable {
    /// Builds the table and precomputes the cheapest path between every
    /// reachable pair.
    ///
    /// # Panics
    ///
    /// Panics if two rules share a (from, to) pair or if the rules form a
    /// cycle. The rule set is static, so either is a programming error.
    pub fn new(rules: Vec<ConversionRule>) -> Self {
        for (i, a) in rules.iter().enumerate() {
            if rules[..i].iter().any(|b| b.from == a.from && b.to == a.to) {
                panic!("Duplicate conversion rule: {} -> {}", a.from, a.to);
            }
        }
        if let Some(tag) = find_cycle(&rules) {
            panic!("Conversion rules form a cycle through {tag}");
        }

        let mut paths = HashMap::new();
        for source in TypeTag::ALL {
            for (target, path) in cheapest_paths(&rules, source) {
                paths.insert((source, target), path);
            }
        }
        Self {
            rules,
            identity: ConversionPath {
                cost: 0,
                steps: Vec::new(),
            },
            paths,
        }
    }

    /// boolean, absent -> number -> decimal -> complex, and number -> complex.
    pub fn standard() -> Self {
        Self::new(vec![
            ConversionRule {
                from: TypeTag::Boolean,
                to: TypeTag::Number,
                cost: 1,
                convert: boolean_to_number,
            },
            ConversionRule {
                from: TypeTag::Absent,
                to: TypeTag::Number,
                cost: 1,
                convert: absent_to_number,
            },
            ConversionRule {
                from: TypeTag::Number,
                to: TypeTag::Decimal,
                cost: 2,
                convert: number_to_decimal,
            },
            ConversionRule {
                from: TypeTag::Number,
                to: TypeTag::Complex,
                cost: 3,
                convert: number_to_complex,
            },
            ConversionRule {
                from: TypeTag::Decimal,
                to: TypeTag::Complex,
                cost: 4,
                convert: decimal_to_complex,
            },
        ])
    }

    pub fn rules(&self) -> &[ConversionRule] {
        &self.rules
    }

    pub fn identity(&self) -> &ConversionPath {
        &self.identity
    }

    /// Cheapest path from `from` to `to`; the identity path when equal.
    pub fn path(&self, from: TypeTag, to: TypeTag) -> Option<&ConversionPath> {
        self.paths.get(&(from, to))
    }

    /// Cheapest path from `from` into any member of `target`. Equal costs go
    /// to the member declared first in [`TypeTag`].
    pub fn cheapest_into(&self, from: TypeTag, target: TagSet) -> Option<&ConversionPath> {
        target
            .tags()
            .filter_map(|to| self.path(from, to))
            .min_by_key(|path| path.cost)
    }

    pub fn apply(&self, path: &ConversionPath, value: &Value) -> MathResult<Value> {
        let mut current = value.clone();
        for &step in &path.steps {
            current = (self.rules[step].convert)(&current)?;
        }
        Ok(current)
    }
}

/// Depth-first search for a back edge; returns a tag on the cycle.
fn find_cycle(rules: &[ConversionRule]) -> Option<TypeTag> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Fresh,
        Open,
        Done,
    }

    fn visit(
        tag: TypeTag,
        rules: &[ConversionRule],
        marks: &mut BTreeMap<TypeTag, Mark>,
    ) -> Option<TypeTag> {
        match marks.get(&tag).copied().unwrap_or(Mark::Fresh) {
            Mark::Open => return Some(tag),
            Mark::Done => return None,
            Mark::Fresh => {}
        }
        marks.insert(tag, Mark::Open);
        for rule in rules.iter().filter(|r| r.from == tag) {
            if let Some(found) = visit(rule.to, rules, marks) {
                return Some(found);
            }
        }
        marks.insert(tag, Mark::Done);
        None
    }

    let mut marks = BTreeMap::new();
    TypeTag::ALL
        .into_iter()
        .find_map(|tag| visit(tag, rules, &mut marks))
}

/// Dijkstra over the (tiny) tag graph from a single source.
fn cheapest_paths(
    rules: &[ConversionRule],
    source: TypeTag,
) -> BTreeMap<TypeTag, ConversionPath> {
    let mut settled: BTreeMap<TypeTag, ConversionPath> = BTreeMap::new();
    let mut frontier: BTreeMap<TypeTag, ConversionPath> = BTreeMap::new();
    frontier.insert(
        source,
        ConversionPath {
            cost: 0,
            steps: Vec::new(),
        },
    );

    while let Some((&tag, _)) = frontier.iter().min_by_key(|(_, path)| path.cost) {
        let Some(path) = frontier.remove(&tag) else {
            break;
        };
        for (index, rule) in rules.iter().enumerate().filter(|(_, r)| r.from == tag) {
            if settled.contains_key(&rule.to) {
                continue;
            }
            let cost = path.cost + rule.cost;
            let better = frontier.get(&rule.to).map_or(true, |known| cost < known.cost);
            if better {
                let mut steps = path.steps.clone();
                steps.push(index);
                frontier.insert(rule.to, ConversionPath { cost, steps });
            }
        }
        settled.insert(tag, path);
    }
    settled
}

fn boolean_to_number(value: &Value) -> MathResult<Value> {
    match value {
        Value::Boolean(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        other => Err(MathError::type_mismatch("boolean to number", vec![other.type_tag()])),
    }
}

fn absent_to_number(value: &Value) -> MathResult<Value> {
    match value {
        Value::Absent => Ok(Value::Number(0.0)),
        other => Err(MathError::type_mismatch("absent to number", vec![other.type_tag()])),
    }
}

fn number_to_decimal(value: &Value) -> MathResult<Value> {
    match value {
        Value::Number(x) => Decimal::from_f64(*x)
            .map(Value::Decimal)
            .ok_or_else(|| MathError::domain("number to decimal", format!("{x} has no decimal form"))),
        other => Err(MathError::type_mismatch("number to decimal", vec![other.type_tag()])),
    }
}

fn number_to_complex(value: &Value) -> MathResult<Value> {
    match value {
        Value::Number(x) => Ok(Value::Complex(Complex64::new(*x, 0.0))),
        other => Err(MathError::type_mismatch("number to complex", vec![other.type_tag()])),
    }
}

fn decimal_to_complex(value: &Value) -> MathResult<Value> {
    match value {
        Value::Decimal(d) => d
            .to_f64()
            .map(|re| Value::Complex(Complex64::new(re, 0.0)))
            .ok_or_else(|| MathError::domain("decimal to complex", format!("{d} is out of range"))),
        other => Err(MathError::type_mismatch("decimal to complex", vec![other.type_tag()])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(value: &Value) -> MathResult<Value> {
        Ok(value.clone())
    }

    fn rule(from: TypeTag, to: TypeTag, cost: u32) -> ConversionRule {
        ConversionRule {
            from,
            to,
            cost,
            convert: identity,
        }
    }

    #[test]
    fn identity_path_costs_nothing() {
        let table = ConversionTable::standard();
        let path = table.path(TypeTag::Text, TypeTag::Text).expect("identity");
        assert!(path.is_identity());
        assert_eq!(path.cost, 0);
    }

    #[test]
    fn multi_hop_paths_add_costs() {
        let table = ConversionTable::standard();
        let path = table.path(TypeTag::Boolean, TypeTag::Decimal).expect("reachable");
        assert_eq!(path.cost, 3);
        assert_eq!(path.hops(), 2);

        // Direct number -> complex (3) beats number -> decimal -> complex (6).
        let path = table.path(TypeTag::Boolean, TypeTag::Complex).expect("reachable");
        assert_eq!(path.cost, 4);

        let converted = table
            .apply(path, &Value::Boolean(true))
            .expect("conversion should succeed");
        assert_eq!(converted, Value::complex(1.0, 0.0));
    }

    #[test]
    fn text_converts_to_nothing() {
        let table = ConversionTable::standard();
        for tag in TypeTag::ALL.into_iter().filter(|t| *t != TypeTag::Text) {
            assert!(table.path(TypeTag::Text, tag).is_none(), "text -> {tag}");
        }
        let any = table.cheapest_into(TypeTag::Text, TagSet::ANY).expect("text accepts text");
        assert_eq!(any.cost, 0);
        assert!(table
            .cheapest_into(TypeTag::Text, TagSet::of(TypeTag::Number).union(TagSet::NONE))
            .is_none());
    }

    #[test]
    fn narrowing_has_no_path() {
        let table = ConversionTable::standard();
        assert!(table.path(TypeTag::Complex, TypeTag::Number).is_none());
        assert!(table.path(TypeTag::Decimal, TypeTag::Number).is_none());
    }

    #[test]
    fn absent_becomes_zero() {
        let table = ConversionTable::standard();
        let path = table.path(TypeTag::Absent, TypeTag::Number).expect("reachable");
        assert_eq!(table.apply(path, &Value::Absent), Ok(Value::Number(0.0)));
    }

    #[test]
    fn nan_has_no_decimal_form() {
        let table = ConversionTable::standard();
        let path = table.path(TypeTag::Number, TypeTag::Decimal).expect("reachable");
        assert!(matches!(
            table.apply(path, &Value::Number(f64::NAN)),
            Err(MathError::Domain { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "Duplicate conversion rule")]
    fn duplicate_rules_are_rejected() {
        ConversionTable::new(vec![
            rule(TypeTag::Boolean, TypeTag::Number, 1),
            rule(TypeTag::Boolean, TypeTag::Number, 2),
        ]);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn cycles_are_rejected() {
        ConversionTable::new(vec![
            rule(TypeTag::Number, TypeTag::Decimal, 1),
            rule(TypeTag::Decimal, TypeTag::Number, 1),
        ]);
    }
}
