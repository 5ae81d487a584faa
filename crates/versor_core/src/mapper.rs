//! Element-wise application of scalar operations over arrays and matrices.
//!
//! Results are always freshly built; inputs are never modified. Traversal
//! is in index order and stops at the first failing leaf.

use crate::dispatch::{BinaryFn, UnaryFn};
use crate::error::{MathError, MathResult};
use crate::matrix::{element_size, Matrix};
use crate::traits::Collection;
use crate::value::Value;

/// Applies `leaf` to every scalar inside `value`, preserving shape.
///
/// `leaf` is normally the public entry point of the calling operation
/// (e.g. [`crate::functions::negate`]), so nested collections of any depth
/// and mixed element types dispatch per element.
pub fn map_unary(value: &Value, leaf: UnaryFn) -> MathResult<Value> {
    deep_map(value, &mut |x: &Value| leaf(x))
}

/// Applies `leaf` to corresponding scalars of `left` and `right`.
///
/// Two collections must have identical sizes; a scalar on either side is
/// broadcast against every element of the other. If either collection is a
/// matrix the result is a matrix.
pub fn map_binary(left: &Value, right: &Value, leaf: BinaryFn) -> MathResult<Value> {
    match (left.is_collection(), right.is_collection()) {
        (false, false) => leaf(left, right),
        (true, false) => deep_map(left, &mut |x: &Value| leaf(x, right)),
        (false, true) => deep_map(right, &mut |y: &Value| leaf(left, y)),
        (true, true) => {
            let left_size = element_size(left)?;
            let right_size = element_size(right)?;
            if left_size != right_size {
                return Err(MathError::dimension(&left_size, &right_size));
            }
            zip(left, right, leaf)
        }
    }
}

fn deep_map<F>(value: &Value, f: &mut F) -> MathResult<Value>
where
    F: FnMut(&Value) -> MathResult<Value>,
{
    match value {
        Value::Array(items) => items.map_elements(|x| deep_map(x, &mut *f)).map(Value::Array),
        Value::Matrix(m) => m.map_elements(|x| deep_map(x, &mut *f)).map(Value::Matrix),
        scalar => f(scalar),
    }
}

/// Pairs up equally sized operands.
fn zip(left: &Value, right: &Value, leaf: BinaryFn) -> MathResult<Value> {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b)
            .map(|(x, y)| zip(x, y, leaf))
            .collect::<MathResult<Vec<_>>>()
            .map(Value::Array),
        (Value::Matrix(a), Value::Matrix(b)) => {
            let data = a
                .data()
                .iter()
                .zip(b.data())
                .map(|(x, y)| leaf(x, y))
                .collect::<MathResult<Vec<_>>>()?;
            Matrix::new(data, a.shape().to_vec()).map(Value::Matrix)
        }
        (Value::Matrix(_), Value::Array(b)) => {
            zip(left, &Value::Matrix(Matrix::from_nested(b)?), leaf)
        }
        (Value::Array(a), Value::Matrix(_)) => {
            zip(&Value::Matrix(Matrix::from_nested(a)?), right, leaf)
        }
        (x, y) => leaf(x, y),
    }
}
