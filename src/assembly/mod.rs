//! CIL instructions as stored in a method body.
//!
//! Instructions are held in decoded form: opcode, mnemonic, control flow classification and a
//! typed operand. Producing them from bytes and writing them back is done elsewhere; a
//! [`crate::metadata::method::CilBody`] only owns and orders them.

mod instruction;

pub use instruction::{FlowType, Immediate, Instruction, Operand};
