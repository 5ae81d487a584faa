//! Dense N-dimensional matrices and the nested-array shape rules they share.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::traits::Collection;
use crate::value::Value;

/// Row-major dense storage of scalar values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    data: Vec<Value>,
    size: Vec<usize>,
}

/// Unchecked wire form; deserialization goes through [`Matrix::new`].
#[derive(Deserialize)]
struct RawMatrix {
    data: Vec<Value>,
    size: Vec<usize>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = MathError;

    fn try_from(raw: RawMatrix) -> MathResult<Matrix> {
        Matrix::new(raw.data, raw.size)
    }
}

impl Matrix {
    pub fn new(data: Vec<Value>, size: Vec<usize>) -> MathResult<Matrix> {
        let expected = element_count(&size)?;
        if expected != data.len() {
            return Err(MathError::dimension(&size, &[data.len()]));
        }
        if let Some(nested) = data.iter().find(|v| v.is_collection()) {
            return Err(MathError::type_mismatch("matrix", vec![nested.type_tag()]));
        }
        Ok(Matrix { data, size })
    }

    /// Builds a matrix from a rectangular nested array.
    pub fn from_nested(items: &[Value]) -> MathResult<Matrix> {
        let size = array_size(items)?;
        let mut data = Vec::with_capacity(element_count(&size)?);
        flatten_into(items, &mut data);
        Matrix::new(data, size)
    }

    /// Nested-array form. A zero-dimensional matrix yields its only element.
    pub fn to_nested(&self) -> Value {
        nest(&self.data, &self.size)
    }

    pub fn shape(&self) -> &[usize] {
        &self.size
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.size.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &n) in index.iter().zip(&self.size) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        Some(flat)
    }

    /// Copies a two-dimensional, all-number matrix into nalgebra storage.
    pub fn to_dmatrix(&self) -> MathResult<DMatrix<f64>> {
        let &[rows, cols] = self.size.as_slice() else {
            return Err(MathError::dimension(&self.size, &[0, 0]));
        };
        let values = self
            .data
            .iter()
            .map(|v| {
                v.as_number()
                    .ok_or_else(|| MathError::type_mismatch("to_dmatrix", vec![v.type_tag()]))
            })
            .collect::<MathResult<Vec<f64>>>()?;
        Ok(DMatrix::from_row_slice(rows, cols, &values))
    }
}

impl From<&DMatrix<f64>> for Matrix {
    fn from(m: &DMatrix<f64>) -> Self {
        let (rows, cols) = m.shape();
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(Value::Number(m[(r, c)]));
            }
        }
        Matrix {
            data,
            size: vec![rows, cols],
        }
    }
}

impl Collection for Matrix {
    fn size(&self) -> MathResult<Vec<usize>> {
        Ok(self.size.clone())
    }

    fn map_elements<F>(&self, f: F) -> MathResult<Self>
    where
        F: FnMut(&Value) -> MathResult<Value>,
    {
        let data = self.data.iter().map(f).collect::<MathResult<Vec<_>>>()?;
        Matrix::new(data, self.size.clone())
    }

    fn get(&self, index: &[usize]) -> Option<&Value> {
        self.offset(index).map(|i| &self.data[i])
    }

    fn set(&mut self, index: &[usize], value: Value) -> MathResult<()> {
        if value.is_collection() {
            return Err(MathError::type_mismatch("matrix", vec![value.type_tag()]));
        }
        let i = self
            .offset(index)
            .ok_or_else(|| MathError::dimension(index, &self.size))?;
        self.data[i] = value;
        Ok(())
    }
}

impl Collection for Vec<Value> {
    fn size(&self) -> MathResult<Vec<usize>> {
        array_size(self)
    }

    fn map_elements<F>(&self, f: F) -> MathResult<Self>
    where
        F: FnMut(&Value) -> MathResult<Value>,
    {
        self.iter().map(f).collect()
    }

    fn get(&self, index: &[usize]) -> Option<&Value> {
        let (&first, rest) = index.split_first()?;
        let item = <[Value]>::get(self, first)?;
        match (item, rest.is_empty()) {
            (_, true) => Some(item),
            (Value::Array(inner), false) => Collection::get(inner, rest),
            (Value::Matrix(inner), false) => inner.get(rest),
            _ => None,
        }
    }

    fn set(&mut self, index: &[usize], value: Value) -> MathResult<()> {
        let len = self.len();
        let Some((&first, rest)) = index.split_first() else {
            return Err(MathError::dimension(index, &[len]));
        };
        let slot = self
            .get_mut(first)
            .ok_or_else(|| MathError::dimension(index, &[len]))?;
        match (slot, rest.is_empty()) {
            (slot, true) => {
                *slot = value;
                Ok(())
            }
            (Value::Array(inner), false) => inner.set(rest, value),
            (Value::Matrix(inner), false) => inner.set(rest, value),
            _ => Err(MathError::dimension(index, &[len])),
        }
    }
}

/// Size of a nested array. Siblings at every depth must share one shape.
pub fn array_size(items: &[Value]) -> MathResult<Vec<usize>> {
    let mut inner: Option<Vec<usize>> = None;
    for item in items {
        let size = element_size(item)?;
        match &inner {
            None => inner = Some(size),
            Some(first) if *first != size => return Err(MathError::dimension(first, &size)),
            Some(_) => {}
        }
    }
    let mut size = vec![items.len()];
    size.extend(inner.unwrap_or_default());
    Ok(size)
}

/// Size of any value; scalars have the empty size.
pub fn element_size(value: &Value) -> MathResult<Vec<usize>> {
    match value {
        Value::Array(items) => array_size(items),
        Value::Matrix(m) => Ok(m.size.clone()),
        _ => Ok(Vec::new()),
    }
}

/// Product of `size`, failing instead of overflowing.
fn element_count(size: &[usize]) -> MathResult<usize> {
    size.iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| MathError::dimension(size, &[usize::MAX]))
}

fn flatten_into(items: &[Value], out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) => flatten_into(inner, out),
            Value::Matrix(m) => out.extend(m.data.iter().cloned()),
            scalar => out.push(scalar.clone()),
        }
    }
}

fn nest(data: &[Value], size: &[usize]) -> Value {
    match size {
        [] => data.first().cloned().unwrap_or(Value::Absent),
        [_] => Value::Array(data.to_vec()),
        [n, rest @ ..] => {
            let stride: usize = rest.iter().product();
            Value::Array(
                (0..*n)
                    .map(|i| nest(&data[i * stride..(i + 1) * stride], rest))
                    .collect(),
            )
        }
    }
}
