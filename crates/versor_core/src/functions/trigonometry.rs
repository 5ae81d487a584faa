//! Sine, cosine and tangent.
//!
//! Numbers use the native functions. Complex arguments go through the
//! hyperbolic identities, decimals through the decimal backend rounded to
//! the configured precision, and angle-valued units are taken in radians.

use num_complex::Complex64;
use rust_decimal::{Decimal, MathematicalOps};

use super::{complex, decimal, number, to_precision, unit};
use crate::dispatch::{call, OperationDescriptor, Registry, UnaryFn};
use crate::error::{MathError, MathResult};
use crate::mapper::map_unary;
use crate::value::{TagSet, TypeTag, Value};

pub fn sin(x: &Value) -> MathResult<Value> {
    call("sin", &[x])
}

pub fn cos(x: &Value) -> MathResult<Value> {
    call("cos", &[x])
}

/// Fails with a domain error where the decimal tangent is undefined.
pub fn tan(x: &Value) -> MathResult<Value> {
    call("tan", &[x])
}

/// sin(a + bi) = sin a cosh b + i cos a sinh b
fn complex_sin(z: Complex64) -> Complex64 {
    Complex64::new(z.re.sin() * z.im.cosh(), z.re.cos() * z.im.sinh())
}

/// cos(a + bi) = cos a cosh b - i sin a sinh b
fn complex_cos(z: Complex64) -> Complex64 {
    Complex64::new(z.re.cos() * z.im.cosh(), -z.re.sin() * z.im.sinh())
}

fn complex_tan(z: Complex64) -> Complex64 {
    complex_sin(z) / complex_cos(z)
}

/// One trigonometric family: its name and the per-representation kernels.
struct Trig {
    name: &'static str,
    real: fn(f64) -> f64,
    complex: fn(Complex64) -> Complex64,
    decimal: fn(&Decimal) -> Option<Decimal>,
}

const SIN: Trig = Trig {
    name: "sin",
    real: f64::sin,
    complex: complex_sin,
    decimal: Decimal::checked_sin,
};

const COS: Trig = Trig {
    name: "cos",
    real: f64::cos,
    complex: complex_cos,
    decimal: Decimal::checked_cos,
};

const TAN: Trig = Trig {
    name: "tan",
    real: f64::tan,
    complex: complex_tan,
    decimal: Decimal::checked_tan,
};

impl Trig {
    fn of_number(&self, x: &Value) -> MathResult<Value> {
        Ok(Value::Number((self.real)(number(self.name, x)?)))
    }

    fn of_complex(&self, x: &Value) -> MathResult<Value> {
        Ok(Value::Complex((self.complex)(complex(self.name, x)?)))
    }

    fn of_decimal(&self, x: &Value) -> MathResult<Value> {
        let d = decimal(self.name, x)?;
        (self.decimal)(&d)
            .map(|r| Value::Decimal(to_precision(r)))
            .ok_or_else(|| MathError::domain(self.name, format!("undefined for {d}")))
    }

    fn of_unit(&self, x: &Value) -> MathResult<Value> {
        let u = unit(self.name, x)?;
        let radians = u.to_radians().ok_or_else(|| {
            MathError::domain(
                self.name,
                format!("unit in angles expected, got {}", u.symbol()),
            )
        })?;
        Ok(Value::Number((self.real)(radians)))
    }

    fn descriptor(
        &self,
        number: UnaryFn,
        complex: UnaryFn,
        decimal: UnaryFn,
        unit: UnaryFn,
        collection: UnaryFn,
    ) -> OperationDescriptor {
        OperationDescriptor::new(self.name)
            .unary(TypeTag::Number, number)
            .unary(TypeTag::Complex, complex)
            .unary(TypeTag::Decimal, decimal)
            .unary(TypeTag::Unit, unit)
            .unary(TagSet::COLLECTION, collection)
    }
}

pub(super) fn register(registry: &mut Registry) {
    registry.register(SIN.descriptor(
        |x| SIN.of_number(x),
        |x| SIN.of_complex(x),
        |x| SIN.of_decimal(x),
        |x| SIN.of_unit(x),
        |x| map_unary(x, sin),
    ));
    registry.register(COS.descriptor(
        |x| COS.of_number(x),
        |x| COS.of_complex(x),
        |x| COS.of_decimal(x),
        |x| COS.of_unit(x),
        |x| map_unary(x, cos),
    ));
    registry.register(TAN.descriptor(
        |x| TAN.of_number(x),
        |x| TAN.of_complex(x),
        |x| TAN.of_decimal(x),
        |x| TAN.of_unit(x),
        |x| map_unary(x, tan),
    ));
}
