//! Operation registry and runtime dispatch.
//!
//! Each named operation owns an ordered list of signature variants. A call
//! is resolved in three stages:
//! 1. **Arity**: the argument count must match at least one variant.
//! 2. **Exact match**: the first variant whose tag sets contain every
//!    argument tag wins outright.
//! 3. **Conversion search**: otherwise every variant is priced by the sum of
//!    the cheapest per-argument conversion paths; the lowest total wins and
//!    ties go to the earlier registration.
//!
//! The global registry is built once on first use and is read-only after.

pub mod conversion;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::error::{MathError, MathResult};
use crate::value::{TagSet, TypeTag, Value};
use conversion::{ConversionPath, ConversionTable};

pub type UnaryFn = fn(&Value) -> MathResult<Value>;
pub type BinaryFn = fn(&Value, &Value) -> MathResult<Value>;

#[derive(Clone, Copy)]
pub enum Implementation {
    Unary(UnaryFn),
    Binary(BinaryFn),
}

impl Implementation {
    pub fn arity(&self) -> usize {
        match self {
            Implementation::Unary(_) => 1,
            Implementation::Binary(_) => 2,
        }
    }

    fn invoke(&self, args: &[Cow<'_, Value>]) -> MathResult<Value> {
        match (self, args) {
            (Implementation::Unary(f), [x]) => f(&**x),
            (Implementation::Binary(f), [x, y]) => f(&**x, &**y),
            _ => unreachable!("arity is checked during resolution"),
        }
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Implementation/{}", self.arity())
    }
}

/// Accepted tags for each argument position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<TagSet>);

impl Signature {
    pub fn new(params: impl Into<Vec<TagSet>>) -> Self {
        Self(params.into())
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn params(&self) -> &[TagSet] {
        &self.0
    }

    pub fn accepts(&self, tags: &[TypeTag]) -> bool {
        self.arity() == tags.len() && self.0.iter().zip(tags).all(|(set, tag)| set.contains(*tag))
    }

    /// True when some tag tuple would be accepted by both signatures.
    pub fn overlaps(&self, other: &Signature) -> bool {
        self.arity() == other.arity()
            && self.0.iter().zip(&other.0).all(|(a, b)| a.intersects(*b))
    }
}

#[derive(Debug, Clone)]
pub struct Variant {
    pub signature: Signature,
    pub implementation: Implementation,
}

/// A named operation and its implementations in registration order.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    name: &'static str,
    variants: Vec<Variant>,
}

impl OperationDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            variants: Vec::new(),
        }
    }

    pub fn unary(self, x: impl Into<TagSet>, f: UnaryFn) -> Self {
        self.with_variant(Signature::new([x.into()]), Implementation::Unary(f))
    }

    pub fn binary(self, x: impl Into<TagSet>, y: impl Into<TagSet>, f: BinaryFn) -> Self {
        self.with_variant(
            Signature::new([x.into(), y.into()]),
            Implementation::Binary(f),
        )
    }

    /// # Panics
    ///
    /// Panics if `signature` overlaps an existing variant; overlapping
    /// signatures would make resolution ambiguous.
    fn with_variant(mut self, signature: Signature, implementation: Implementation) -> Self {
        if let Some(existing) = self.variants.iter().find(|v| v.signature.overlaps(&signature)) {
            panic!(
                "{}: signature {:?} overlaps {:?}",
                self.name, signature, existing.signature
            );
        }
        self.variants.push(Variant {
            signature,
            implementation,
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Smallest and largest registered arity.
    pub fn arity_range(&self) -> (usize, usize) {
        let arities = self.variants.iter().map(|v| v.signature.arity());
        (
            arities.clone().min().unwrap_or(0),
            arities.max().unwrap_or(0),
        )
    }
}

/// The outcome of resolving a call.
#[derive(Debug)]
pub struct Resolution<'r> {
    pub operation: &'static str,
    /// Position of the chosen variant in registration order.
    pub index: usize,
    pub signature: &'r Signature,
    pub implementation: Implementation,
    /// One path per argument; identity paths for arguments used as-is.
    pub conversions: Vec<&'r ConversionPath>,
    pub cost: u32,
}

impl Resolution<'_> {
    pub fn is_exact(&self) -> bool {
        self.conversions.iter().all(|p| p.is_identity())
    }
}

#[derive(Debug)]
pub struct Registry {
    operations: HashMap<&'static str, OperationDescriptor>,
    conversions: ConversionTable,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn new(conversions: ConversionTable) -> Self {
        Self {
            operations: HashMap::new(),
            conversions,
        }
    }

    /// The standard conversions and every built-in operation.
    pub fn standard() -> Self {
        let mut registry = Self::new(ConversionTable::standard());
        crate::functions::register(&mut registry);
        registry
    }

    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(|| {
            let registry = Self::standard();
            debug!(
                operations = registry.operations.len(),
                conversions = registry.conversions.rules().len(),
                "built operation registry"
            );
            registry
        })
    }

    /// # Panics
    ///
    /// Panics if an operation with the same name is already registered.
    pub fn register(&mut self, operation: OperationDescriptor) {
        let name = operation.name;
        if self.operations.insert(name, operation).is_some() {
            panic!("Duplicate operation registration: {name}");
        }
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    pub fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }

    pub fn resolve(&self, name: &str, tags: &[TypeTag]) -> MathResult<Resolution<'_>> {
        let op = self
            .operations
            .get(name)
            .ok_or_else(|| MathError::UnknownOperation(name.to_string()))?;

        if !op.variants.iter().any(|v| v.signature.arity() == tags.len()) {
            let (min, max) = op.arity_range();
            return Err(MathError::Arity {
                operation: op.name.to_string(),
                min,
                max,
                actual: tags.len(),
            });
        }

        if let Some((index, variant)) = op
            .variants
            .iter()
            .enumerate()
            .find(|(_, v)| v.signature.accepts(tags))
        {
            return Ok(Resolution {
                operation: op.name,
                index,
                signature: &variant.signature,
                implementation: variant.implementation,
                conversions: vec![self.conversions.identity(); tags.len()],
                cost: 0,
            });
        }

        let mut best: Option<Resolution<'_>> = None;
        for (index, variant) in op.variants.iter().enumerate() {
            if variant.signature.arity() != tags.len() {
                continue;
            }
            let Some(paths) = tags
                .iter()
                .zip(variant.signature.params())
                .map(|(tag, set)| self.conversions.cheapest_into(*tag, *set))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let cost: u32 = paths.iter().map(|p| p.cost).sum();
            // Strictly cheaper only: the earlier variant keeps ties.
            if best.as_ref().map_or(true, |b| cost < b.cost) {
                best = Some(Resolution {
                    operation: op.name,
                    index,
                    signature: &variant.signature,
                    implementation: variant.implementation,
                    conversions: paths,
                    cost,
                });
            }
        }

        let resolution = best.ok_or_else(|| MathError::type_mismatch(op.name, tags.to_vec()))?;
        trace!(
            operation = op.name,
            received = ?tags,
            signature = ?resolution.signature,
            cost = resolution.cost,
            "resolved with implicit conversion"
        );
        Ok(resolution)
    }

    /// Resolves `name` for the runtime types of `args`, converts the
    /// arguments as needed and runs the chosen implementation.
    pub fn call(&self, name: &str, args: &[&Value]) -> MathResult<Value> {
        let tags: Vec<TypeTag> = args.iter().map(|a| a.type_tag()).collect();
        let resolution = self.resolve(name, &tags)?;
        let converted = args
            .iter()
            .zip(&resolution.conversions)
            .map(|(arg, path)| {
                if path.is_identity() {
                    Ok(Cow::Borrowed(*arg))
                } else {
                    self.conversions
                        .apply(path, arg)
                        .map(Cow::Owned)
                        .map_err(|err| match err {
                            MathError::Domain { reason, .. } => {
                                MathError::domain(resolution.operation, reason)
                            }
                            other => other,
                        })
                }
            })
            .collect::<MathResult<Vec<_>>>()?;
        resolution.implementation.invoke(&converted)
    }
}

/// Calls `name` through the global registry.
pub fn call(name: &str, args: &[&Value]) -> MathResult<Value> {
    Registry::global().call(name, args)
}

/// Like [`call`], for owned argument lists.
pub fn apply(name: &str, args: &[Value]) -> MathResult<Value> {
    let refs: Vec<&Value> = args.iter().collect();
    call(name, &refs)
}
