use crate::error::MathResult;
use crate::value::Value;

/// A collection the mapper can walk: a raw nested array or a matrix.
pub trait Collection: Sized {
    /// Size per dimension. Fails for ragged nesting.
    fn size(&self) -> MathResult<Vec<usize>>;

    /// Applies `f` to every direct element in index order, building a new
    /// collection of the same shape. Stops at the first error.
    fn map_elements<F>(&self, f: F) -> MathResult<Self>
    where
        F: FnMut(&Value) -> MathResult<Value>;

    fn get(&self, index: &[usize]) -> Option<&Value>;

    /// Replaces the element at `index`.
    fn set(&mut self, index: &[usize], value: Value) -> MathResult<()>;
}
