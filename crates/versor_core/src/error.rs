//! Error taxonomy shared by the dispatcher, the collection mapper and the
//! per-type implementations.

use thiserror::Error;

use crate::value::TypeTag;

pub type MathResult<T> = Result<T, MathError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// Argument count matches no registered signature.
    #[error("{operation}: expected {} argument(s), got {actual}", arity_range(.min, .max))]
    Arity {
        operation: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// No signature accepts the argument types, even after implicit conversion.
    #[error("{operation}: unexpected type of argument(s) ({})", format_tags(.received))]
    Type {
        operation: String,
        received: Vec<TypeTag>,
    },

    /// Collection operands with incompatible, non-broadcastable shapes.
    #[error("dimension mismatch: {left:?} != {right:?}")]
    Dimension { left: Vec<usize>, right: Vec<usize> },

    /// A unit-carrying argument has the wrong physical dimension.
    #[error("{operation}: {reason}")]
    Domain { operation: String, reason: String },

    #[error("unknown operation \"{0}\"")]
    UnknownOperation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MathError {
    pub fn type_mismatch(operation: &str, received: Vec<TypeTag>) -> Self {
        MathError::Type {
            operation: operation.to_string(),
            received,
        }
    }

    pub fn domain(operation: &str, reason: impl Into<String>) -> Self {
        MathError::Domain {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dimension(left: &[usize], right: &[usize]) -> Self {
        MathError::Dimension {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}

fn arity_range(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    }
}

fn format_tags(tags: &[TypeTag]) -> String {
    tags.iter()
        .map(|tag| tag.name())
        .collect::<Vec<_>>()
        .join(", ")
}
