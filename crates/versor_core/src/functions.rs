//! Built-in operations.
//!
//! Every public function here is a thin entry point into the global
//! registry. The per-type implementations are private and registered under
//! the operation's name; collection variants hand the public entry point
//! back to the mapper so elements dispatch on their own types.

pub mod arithmetic;
pub mod trigonometry;

pub use arithmetic::{abs, add, dot_multiply, negate, subtract, unary_plus};
pub use trigonometry::{cos, sin, tan};

use num_complex::Complex64;
use rust_decimal::Decimal;

use crate::config::config;
use crate::dispatch::Registry;
use crate::error::{MathError, MathResult};
use crate::unit::Unit;
use crate::value::Value;

pub(crate) fn register(registry: &mut Registry) {
    arithmetic::register(registry);
    trigonometry::register(registry);
}

// The accessors below only fail if a value reaches an implementation whose
// signature does not admit it.

fn number(op: &str, v: &Value) -> MathResult<f64> {
    v.as_number()
        .ok_or_else(|| MathError::type_mismatch(op, vec![v.type_tag()]))
}

fn complex(op: &str, v: &Value) -> MathResult<Complex64> {
    v.as_complex()
        .ok_or_else(|| MathError::type_mismatch(op, vec![v.type_tag()]))
}

fn decimal(op: &str, v: &Value) -> MathResult<Decimal> {
    v.as_decimal()
        .ok_or_else(|| MathError::type_mismatch(op, vec![v.type_tag()]))
}

fn unit<'v>(op: &str, v: &'v Value) -> MathResult<&'v Unit> {
    v.as_unit()
        .ok_or_else(|| MathError::type_mismatch(op, vec![v.type_tag()]))
}

/// Rounds to the configured number of significant digits.
fn to_precision(d: Decimal) -> Decimal {
    d.round_sf(config().precision).unwrap_or(d)
}
