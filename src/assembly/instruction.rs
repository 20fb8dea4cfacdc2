//! Core instruction types for CIL method bodies.
//!
//! - [`Instruction`] - one decoded CIL instruction
//! - [`Operand`] / [`Immediate`] - typed operand values
//! - [`FlowType`] - how an instruction affects control flow
//!
//! # Examples
//!
//! ```rust
//! use dotbind::assembly::{FlowType, Immediate, Instruction, Operand};
//!
//! let ldc = Instruction::new(0, 0x1F, "ldc.i4.s", FlowType::Sequential, Operand::Immediate(Immediate::Int8(42)));
//! let ret = Instruction::new(2, 0x2A, "ret", FlowType::Return, Operand::None);
//!
//! assert!(!ldc.is_terminal());
//! assert!(ret.is_terminal());
//! assert_eq!(ldc.to_string(), "IL_0000: ldc.i4.s 0x2A");
//! ```

use std::fmt::{self, UpperHex};

use crate::metadata::token::Token;

/// An immediate value carried by an instruction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// Signed 8-bit
    Int8(i8),
    /// Unsigned 8-bit
    UInt8(u8),
    /// Signed 16-bit
    Int16(i16),
    /// Unsigned 16-bit
    UInt16(u16),
    /// Signed 32-bit
    Int32(i32),
    /// Unsigned 32-bit
    UInt32(u32),
    /// Signed 64-bit
    Int64(i64),
    /// Unsigned 64-bit
    UInt64(u64),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
}

impl UpperHex for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Int8(value) => write!(f, "{value:02X}"),
            Immediate::UInt8(value) => write!(f, "{value:02X}"),
            Immediate::Int16(value) => write!(f, "{value:04X}"),
            Immediate::UInt16(value) => write!(f, "{value:04X}"),
            Immediate::Int32(value) => write!(f, "{value:08X}"),
            Immediate::UInt32(value) => write!(f, "{value:08X}"),
            Immediate::Int64(value) => write!(f, "{value:016X}"),
            Immediate::UInt64(value) => write!(f, "{value:016X}"),
            Immediate::Float32(value) => write!(f, "{:08X}", value.to_bits()),
            Immediate::Float64(value) => write!(f, "{:016X}", value.to_bits()),
        }
    }
}

impl From<Immediate> for u64 {
    fn from(val: Immediate) -> Self {
        match val {
            // Signed values keep their bit pattern
            #[allow(clippy::cast_sign_loss)]
            Immediate::Int8(value) => value as u64,
            Immediate::UInt8(value) => u64::from(value),
            #[allow(clippy::cast_sign_loss)]
            Immediate::Int16(value) => value as u64,
            Immediate::UInt16(value) => u64::from(value),
            #[allow(clippy::cast_sign_loss)]
            Immediate::Int32(value) => value as u64,
            Immediate::UInt32(value) => u64::from(value),
            #[allow(clippy::cast_sign_loss)]
            Immediate::Int64(value) => value as u64,
            Immediate::UInt64(value) => value,
            Immediate::Float32(value) => u64::from(value.to_bits()),
            Immediate::Float64(value) => value.to_bits(),
        }
    }
}

/// The operand of an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// An immediate value
    Immediate(Immediate),
    /// A branch target, as an offset into the method body
    Target(u32),
    /// A metadata token
    Token(Token),
    /// A local variable slot; the index refers to the body's local list
    Local(u16),
    /// A method argument
    Argument(u16),
    /// Relative targets of a `switch`
    Switch(Vec<i32>),
}

/// How an instruction affects control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Continues with the next instruction
    Sequential,
    /// May branch or fall through
    ConditionalBranch,
    /// Always branches
    UnconditionalBranch,
    /// Calls a method and continues
    Call,
    /// Returns from the method
    Return,
    /// Multi-way branch
    Switch,
    /// Throws an exception
    Throw,
    /// Ends a finally or fault handler
    EndFinally,
    /// Leaves a protected region
    Leave,
}

/// One decoded CIL instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset of the instruction from the start of the method code
    pub offset: u32,
    /// The opcode; the second byte for two-byte opcodes
    pub opcode: u8,
    /// `0xFE` for two-byte opcodes, 0 otherwise
    pub prefix: u8,
    /// Textual name of the opcode
    pub mnemonic: &'static str,
    /// Control flow classification
    pub flow_type: FlowType,
    /// The operand
    pub operand: Operand,
}

impl Instruction {
    /// Create a one-byte-opcode instruction
    #[must_use]
    pub fn new(
        offset: u32,
        opcode: u8,
        mnemonic: &'static str,
        flow_type: FlowType,
        operand: Operand,
    ) -> Self {
        Instruction {
            offset,
            opcode,
            prefix: 0,
            mnemonic,
            flow_type,
            operand,
        }
    }

    /// Returns `true` if this instruction transfers control to a branch target
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(
            self.flow_type,
            FlowType::ConditionalBranch | FlowType::UnconditionalBranch | FlowType::Switch
        )
    }

    /// Returns `true` if this instruction ends a basic block
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.flow_type,
            FlowType::ConditionalBranch
                | FlowType::UnconditionalBranch
                | FlowType::Return
                | FlowType::Switch
                | FlowType::Throw
                | FlowType::Leave
        )
    }

    /// The local slot referenced by this instruction, if any
    #[must_use]
    pub fn local_index(&self) -> Option<u16> {
        match self.operand {
            Operand::Local(index) => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04X}: ", self.offset)?;
        if self.prefix != 0 {
            write!(f, "{:02X}:", self.prefix)?;
        }
        write!(f, "{}", self.mnemonic)?;

        match &self.operand {
            Operand::None => Ok(()),
            Operand::Immediate(imm) => write!(f, " 0x{imm:X}"),
            Operand::Target(target) => write!(f, " IL_{target:04X}"),
            Operand::Token(token) => write!(f, " {token}"),
            Operand::Local(local) => write!(f, " V_{local}"),
            Operand::Argument(arg) => write!(f, " A_{arg}"),
            Operand::Switch(targets) => write!(f, " switch({})", targets.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_classification() {
        let cases = [
            (FlowType::Sequential, false, false),
            (FlowType::Call, false, false),
            (FlowType::ConditionalBranch, true, true),
            (FlowType::UnconditionalBranch, true, true),
            (FlowType::Switch, true, true),
            (FlowType::Return, false, true),
            (FlowType::Throw, false, true),
            (FlowType::Leave, false, true),
            (FlowType::EndFinally, false, false),
        ];

        for (flow_type, branch, terminal) in cases {
            let instruction = Instruction::new(0, 0x00, "test", flow_type, Operand::None);
            assert_eq!(instruction.is_branch(), branch, "{flow_type:?}");
            assert_eq!(instruction.is_terminal(), terminal, "{flow_type:?}");
        }
    }

    #[test]
    fn immediate_bits() {
        assert_eq!(u64::from(Immediate::Int8(-1)), u64::MAX);
        assert_eq!(u64::from(Immediate::UInt16(0x1234)), 0x1234);
        assert_eq!(u64::from(Immediate::Float32(1.0)), 0x3F80_0000);
        assert_eq!(format!("{:X}", Immediate::Int32(255)), "000000FF");
    }

    #[test]
    fn display() {
        let call = Instruction::new(
            0x10,
            0x28,
            "call",
            FlowType::Call,
            Operand::Token(Token::new(0x0A00_0001)),
        );
        assert_eq!(call.to_string(), "IL_0010: call 0x0a000001");

        let ldloc = Instruction::new(3, 0x06, "ldloc.0", FlowType::Sequential, Operand::Local(0));
        assert_eq!(ldloc.local_index(), Some(0));
        assert_eq!(ldloc.to_string(), "IL_0003: ldloc.0 V_0");

        let initobj = Instruction {
            prefix: 0xFE,
            ..Instruction::new(5, 0x15, "initobj", FlowType::Sequential, Operand::None)
        };
        assert_eq!(initobj.to_string(), "IL_0005: FE:initobj");
    }
}
