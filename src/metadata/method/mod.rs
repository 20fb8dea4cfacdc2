//! Method bodies and their parts.
//!
//! - [`MethodBody`] - native code or a CIL body
//! - [`CilBody`] - instructions, exception handlers, locals and header values
//! - [`ExceptionHandler`] - one exception handling clause
//! - [`LocalList`] - ordered local variable slots

mod body;
mod exceptions;
mod locals;
mod types;

pub use body::*;
pub use exceptions::*;
pub use locals::*;
pub use types::*;
