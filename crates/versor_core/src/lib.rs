//! The `versor_core` crate provides type-dispatched arithmetic and
//! trigonometry that works the same way over machine numbers, arbitrary
//! precision decimals, complex numbers, unit-carrying quantities and nested
//! collections of any of these.
//!
//! Key components:
//! - **Value model**: `Value` (tagged union), `TypeTag`, `Unit`, `Matrix`.
//! - **Dispatch**: a once-built, read-only registry that picks the best
//!   implementation for the runtime argument types, applying the cheapest
//!   implicit conversions when nothing matches exactly.
//! - **Mapper**: element-wise application over arrays and matrices, with
//!   scalar broadcasting for binary operations.
//! - **Functions**: `negate`, `unary_plus`, `abs`, `add`, `subtract`,
//!   `dot_multiply`, `sin`, `cos`, `tan`.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod functions;
pub mod mapper;
pub mod matrix;
pub mod traits;
pub mod unit;
pub mod value;

pub use config::{config, set_config, set_precision, Config, NumberKind};
pub use dispatch::{apply, call, Registry};
pub use error::{MathError, MathResult};
pub use functions::{abs, add, cos, dot_multiply, negate, sin, subtract, tan, unary_plus};
pub use matrix::Matrix;
pub use unit::{Dimension, Unit};
pub use value::{TagSet, TypeTag, Value};
