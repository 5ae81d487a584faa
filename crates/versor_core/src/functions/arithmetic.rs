//! Sign, magnitude and element-wise arithmetic.

use num_complex::Complex64;

use super::{complex, decimal, number, unit};
use crate::dispatch::{call, OperationDescriptor, Registry};
use crate::error::{MathError, MathResult};
use crate::mapper::{map_binary, map_unary};
use crate::value::{TagSet, TypeTag, Value};

/// Inverts the sign of `x`. Booleans and absent values become numbers
/// first; collections are negated element-wise.
pub fn negate(x: &Value) -> MathResult<Value> {
    call("negate", &[x])
}

/// Returns `x` unchanged, after converting booleans and absent values to
/// numbers.
pub fn unary_plus(x: &Value) -> MathResult<Value> {
    call("unary_plus", &[x])
}

/// Absolute value. The modulus of a complex number is a plain number.
pub fn abs(x: &Value) -> MathResult<Value> {
    call("abs", &[x])
}

pub fn add(x: &Value, y: &Value) -> MathResult<Value> {
    call("add", &[x, y])
}

pub fn subtract(x: &Value, y: &Value) -> MathResult<Value> {
    call("subtract", &[x, y])
}

/// Element-wise product. A unit may be scaled by a number on either side.
pub fn dot_multiply(x: &Value, y: &Value) -> MathResult<Value> {
    call("dot_multiply", &[x, y])
}

pub(super) fn register(registry: &mut Registry) {
    registry.register(
        OperationDescriptor::new("negate")
            .unary(TypeTag::Number, |x| Ok(Value::Number(-number("negate", x)?)))
            .unary(TypeTag::Complex, |x| {
                let z = complex("negate", x)?;
                Ok(Value::Complex(Complex64::new(-z.re, -z.im)))
            })
            .unary(TypeTag::Decimal, |x| Ok(Value::Decimal(-decimal("negate", x)?)))
            .unary(TypeTag::Unit, |x| {
                let u = unit("negate", x)?;
                Ok(Value::Unit(u.with_value(-u.value)))
            })
            .unary(TagSet::COLLECTION, |x| map_unary(x, negate)),
    );

    registry.register(
        OperationDescriptor::new("unary_plus")
            .unary(
                TagSet::of(TypeTag::Number)
                    .union(TagSet::of(TypeTag::Complex))
                    .union(TagSet::of(TypeTag::Decimal))
                    .union(TagSet::of(TypeTag::Unit)),
                |x| Ok(x.clone()),
            )
            .unary(TagSet::COLLECTION, |x| map_unary(x, unary_plus)),
    );

    registry.register(
        OperationDescriptor::new("abs")
            .unary(TypeTag::Number, |x| Ok(Value::Number(number("abs", x)?.abs())))
            .unary(TypeTag::Complex, |x| Ok(Value::Number(complex("abs", x)?.norm())))
            .unary(TypeTag::Decimal, |x| Ok(Value::Decimal(decimal("abs", x)?.abs())))
            .unary(TypeTag::Unit, |x| {
                let u = unit("abs", x)?;
                Ok(Value::Unit(u.with_value(u.value.abs())))
            })
            .unary(TagSet::COLLECTION, |x| map_unary(x, abs)),
    );

    registry.register(
        OperationDescriptor::new("add")
            .binary(TypeTag::Number, TypeTag::Number, |x, y| {
                Ok(Value::Number(number("add", x)? + number("add", y)?))
            })
            .binary(TypeTag::Complex, TypeTag::Complex, |x, y| {
                Ok(Value::Complex(complex("add", x)? + complex("add", y)?))
            })
            .binary(TypeTag::Decimal, TypeTag::Decimal, |x, y| {
                decimal("add", x)?
                    .checked_add(decimal("add", y)?)
                    .map(Value::Decimal)
                    .ok_or_else(|| MathError::domain("add", "decimal overflow"))
            })
            .binary(TypeTag::Unit, TypeTag::Unit, |x, y| add_units("add", x, y, 1.0))
            .binary(TagSet::COLLECTION, TagSet::COLLECTION, |x, y| map_binary(x, y, add))
            .binary(TagSet::COLLECTION, TagSet::SCALAR, |x, y| map_binary(x, y, add))
            .binary(TagSet::SCALAR, TagSet::COLLECTION, |x, y| map_binary(x, y, add)),
    );

    registry.register(
        OperationDescriptor::new("subtract")
            .binary(TypeTag::Number, TypeTag::Number, |x, y| {
                Ok(Value::Number(number("subtract", x)? - number("subtract", y)?))
            })
            .binary(TypeTag::Complex, TypeTag::Complex, |x, y| {
                Ok(Value::Complex(complex("subtract", x)? - complex("subtract", y)?))
            })
            .binary(TypeTag::Decimal, TypeTag::Decimal, |x, y| {
                decimal("subtract", x)?
                    .checked_sub(decimal("subtract", y)?)
                    .map(Value::Decimal)
                    .ok_or_else(|| MathError::domain("subtract", "decimal overflow"))
            })
            .binary(TypeTag::Unit, TypeTag::Unit, |x, y| {
                add_units("subtract", x, y, -1.0)
            })
            .binary(TagSet::COLLECTION, TagSet::COLLECTION, |x, y| {
                map_binary(x, y, subtract)
            })
            .binary(TagSet::COLLECTION, TagSet::SCALAR, |x, y| {
                map_binary(x, y, subtract)
            })
            .binary(TagSet::SCALAR, TagSet::COLLECTION, |x, y| {
                map_binary(x, y, subtract)
            }),
    );

    registry.register(
        OperationDescriptor::new("dot_multiply")
            .binary(TypeTag::Number, TypeTag::Number, |x, y| {
                Ok(Value::Number(number("dot_multiply", x)? * number("dot_multiply", y)?))
            })
            .binary(TypeTag::Complex, TypeTag::Complex, |x, y| {
                Ok(Value::Complex(complex("dot_multiply", x)? * complex("dot_multiply", y)?))
            })
            .binary(TypeTag::Decimal, TypeTag::Decimal, |x, y| {
                decimal("dot_multiply", x)?
                    .checked_mul(decimal("dot_multiply", y)?)
                    .map(Value::Decimal)
                    .ok_or_else(|| MathError::domain("dot_multiply", "decimal overflow"))
            })
            .binary(TypeTag::Unit, TypeTag::Number, |x, y| {
                let u = unit("dot_multiply", x)?;
                Ok(Value::Unit(u.with_value(u.value * number("dot_multiply", y)?)))
            })
            .binary(TypeTag::Number, TypeTag::Unit, |x, y| {
                let u = unit("dot_multiply", y)?;
                Ok(Value::Unit(u.with_value(number("dot_multiply", x)? * u.value)))
            })
            .binary(TagSet::COLLECTION, TagSet::COLLECTION, |x, y| {
                map_binary(x, y, dot_multiply)
            })
            .binary(TagSet::COLLECTION, TagSet::SCALAR, |x, y| {
                map_binary(x, y, dot_multiply)
            })
            .binary(TagSet::SCALAR, TagSet::COLLECTION, |x, y| {
                map_binary(x, y, dot_multiply)
            }),
    );
}

/// `x + sign * y`, expressed in the unit of `x`.
fn add_units(op: &str, x: &Value, y: &Value, sign: f64) -> MathResult<Value> {
    let (a, b) = (unit(op, x)?, unit(op, y)?);
    let b_in_a = a.convert_from(b).ok_or_else(|| {
        MathError::domain(
            op,
            format!("units do not match ({} and {})", a.symbol(), b.symbol()),
        )
    })?;
    Ok(Value::Unit(a.with_value(a.value + sign * b_in_a)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::unit::Unit;
    use approx::assert_relative_eq;
    use rust_decimal::Decimal;

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    #[test]
    fn negate_each_scalar_kind() {
        assert_eq!(negate(&n(3.5)).unwrap(), n(-3.5));
        assert_eq!(negate(&n(-4.2)).unwrap(), n(4.2));
        assert_eq!(
            negate(&Value::complex(1.0, -2.0)).unwrap(),
            Value::complex(-1.0, 2.0)
        );
        assert_eq!(
            negate(&Value::Decimal(Decimal::new(125, 2))).unwrap(),
            Value::Decimal(Decimal::new(-125, 2))
        );

        let deg = Unit::new(45.0, "deg").unwrap();
        let Value::Unit(out) = negate(&Value::Unit(deg.clone())).unwrap() else {
            panic!("expected a unit");
        };
        assert_eq!(out.value, -45.0);
        assert_eq!(out.dimension(), deg.dimension());
        assert_eq!(out.symbol(), "deg");
    }

    #[test]
    fn negate_converts_booleans_and_absent() {
        assert_eq!(negate(&Value::Boolean(true)).unwrap(), n(-1.0));
        assert_eq!(negate(&Value::Boolean(false)).unwrap(), n(-0.0));
        assert_eq!(negate(&Value::Absent).unwrap(), n(0.0));
    }

    #[test]
    fn negate_rejects_text() {
        assert_eq!(
            negate(&Value::from("abc")).unwrap_err(),
            MathError::type_mismatch("negate", vec![TypeTag::Text])
        );
    }

    #[test]
    fn double_negation_is_identity() {
        let values = [
            n(2.75),
            Value::complex(-1.5, 0.25),
            Value::Decimal(Decimal::new(-31415, 4)),
            Value::Unit(Unit::new(12.0, "cm").unwrap()),
            Value::array([1.0, -2.0]),
        ];
        for x in values {
            assert_eq!(negate(&negate(&x).unwrap()).unwrap(), x);
        }
    }

    #[test]
    fn negate_arrays_at_every_depth() {
        assert_eq!(
            negate(&Value::array([1.0, 2.0, 3.0])).unwrap(),
            Value::array([-1.0, -2.0, -3.0])
        );
        let nested = Value::Array(vec![
            Value::Array(vec![Value::array([1.0]), Value::array([2.0])]),
            Value::Array(vec![Value::array([3.0]), Value::array([4.0])]),
        ]);
        let expected = Value::Array(vec![
            Value::Array(vec![Value::array([-1.0]), Value::array([-2.0])]),
            Value::Array(vec![Value::array([-3.0]), Value::array([-4.0])]),
        ]);
        assert_eq!(negate(&nested).unwrap(), expected);
    }

    #[test]
    fn negate_mixed_element_types() {
        let mixed = Value::Array(vec![
            n(1.0),
            Value::complex(0.0, 1.0),
            Value::Boolean(true),
        ]);
        assert_eq!(
            negate(&mixed).unwrap(),
            Value::Array(vec![n(-1.0), Value::complex(-0.0, -1.0), n(-1.0)])
        );
        let bad = Value::Array(vec![n(1.0), Value::from("x")]);
        assert!(matches!(negate(&bad), Err(MathError::Type { .. })));
    }

    #[test]
    fn negate_matrix_keeps_shape() {
        let m = Matrix::from_nested(&[Value::array([1.0, 2.0]), Value::array([3.0, 4.0])])
            .unwrap();
        let Value::Matrix(out) = negate(&Value::Matrix(m)).unwrap() else {
            panic!("expected a matrix");
        };
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(
            out.to_nested(),
            Value::Array(vec![Value::array([-1.0, -2.0]), Value::array([-3.0, -4.0])])
        );
    }

    #[test]
    fn unary_plus_only_converts() {
        assert_eq!(unary_plus(&n(-2.0)).unwrap(), n(-2.0));
        assert_eq!(unary_plus(&Value::Boolean(true)).unwrap(), n(1.0));
        assert_eq!(unary_plus(&Value::Absent).unwrap(), n(0.0));
        assert_eq!(
            unary_plus(&Value::array([true, false])).unwrap(),
            Value::array([1.0, 0.0])
        );
    }

    #[test]
    fn abs_of_complex_is_its_modulus() {
        assert_eq!(abs(&Value::complex(3.0, -4.0)).unwrap(), n(5.0));
        assert_eq!(abs(&n(-2.0)).unwrap(), n(2.0));
        assert_eq!(
            abs(&Value::Decimal(Decimal::new(-7, 1))).unwrap(),
            Value::Decimal(Decimal::new(7, 1))
        );
    }

    #[test]
    fn add_widens_to_the_cheapest_common_type() {
        assert_eq!(add(&n(1.0), &n(2.0)).unwrap(), n(3.0));
        assert_eq!(
            add(&n(1.0), &Value::complex(2.0, 3.0)).unwrap(),
            Value::complex(3.0, 3.0)
        );
        assert_eq!(
            add(&Value::Boolean(true), &Value::Decimal(Decimal::new(15, 1))).unwrap(),
            Value::Decimal(Decimal::new(25, 1))
        );
        assert!(matches!(
            add(&n(1.0), &Value::from("2")),
            Err(MathError::Type { .. })
        ));
    }

    #[test]
    fn add_units_in_left_operand_unit() {
        let a = Value::Unit(Unit::new(1.0, "m").unwrap());
        let b = Value::Unit(Unit::new(50.0, "cm").unwrap());
        let Value::Unit(sum) = add(&a, &b).unwrap() else {
            panic!("expected a unit");
        };
        assert_eq!(sum.symbol(), "m");
        assert_relative_eq!(sum.value, 1.5);

        let Value::Unit(diff) = subtract(&b, &a).unwrap() else {
            panic!("expected a unit");
        };
        assert_relative_eq!(diff.value, -50.0);

        let time = Value::Unit(Unit::new(1.0, "s").unwrap());
        assert!(matches!(add(&a, &time), Err(MathError::Domain { .. })));
    }

    #[test]
    fn binary_collections_broadcast_and_check_shape() {
        assert_eq!(
            add(&Value::array([1.0, 2.0]), &Value::array([3.0, 4.0])).unwrap(),
            Value::array([4.0, 6.0])
        );
        assert_eq!(
            subtract(&n(10.0), &Value::array([1.0, 2.0])).unwrap(),
            Value::array([9.0, 8.0])
        );
        assert_eq!(
            dot_multiply(&Value::array([1.0, 2.0]), &Value::Boolean(true)).unwrap(),
            Value::array([1.0, 2.0])
        );
        assert_eq!(
            add(&Value::array([1.0, 2.0]), &Value::array([1.0])).unwrap_err(),
            MathError::dimension(&[2], &[1])
        );
    }

    #[test]
    fn dot_multiply_scales_units() {
        let Value::Unit(u) =
            dot_multiply(&n(2.0), &Value::Unit(Unit::new(3.0, "km").unwrap())).unwrap()
        else {
            panic!("expected a unit");
        };
        assert_eq!(u.value, 6.0);
        assert_eq!(u.symbol(), "km");

        let u = Value::Unit(Unit::new(1.0, "km").unwrap());
        assert!(matches!(
            dot_multiply(&u, &Value::complex(1.0, 1.0)),
            Err(MathError::Type { .. })
        ));
    }

    #[test]
    fn binary_arity_is_enforced() {
        assert!(matches!(
            call("add", &[&n(1.0)]),
            Err(MathError::Arity {
                min: 2,
                max: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn failed_widening_names_the_called_operation() {
        let err = add(&n(f64::NAN), &Value::Decimal(Decimal::new(2, 1))).unwrap_err();
        let MathError::Domain { operation, reason } = err else {
            panic!("expected a domain error, got {err:?}");
        };
        assert_eq!(operation, "add");
        assert!(reason.contains("no decimal form"));
    }
}
