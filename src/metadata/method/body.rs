//! In-memory representation of method bodies.
//!
//! A method either has native code, addressed by its RVA, or a CIL body that owns its
//! instructions, exception handler clauses and local slots. The representation is chosen when the
//! body is created and never changes.
//!
//! # Examples
//!
//! ```rust
//! use dotbind::assembly::{FlowType, Instruction, Operand};
//! use dotbind::metadata::method::{CilBody, MethodBody, MethodBodyFlags};
//!
//! let mut body = CilBody::new();
//! assert!(body.init_locals());
//! assert!(!body.has_instructions());
//!
//! body.instructions_mut().push(Instruction::new(0, 0x2A, "ret", FlowType::Return, Operand::None));
//! body.set_max_stack(1);
//! assert_eq!(body.header_flags(), MethodBodyFlags::FAT_FORMAT | MethodBodyFlags::INIT_LOCALS);
//!
//! let method = MethodBody::from(body);
//! assert!(method.is_cil());
//! ```
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 25.4 - Method Header Format

use std::mem;

use crate::{
    assembly::Instruction,
    metadata::method::{ExceptionHandler, Local, LocalList, MethodBodyFlags},
    Error, Result,
};

/// Largest number of locals a body can describe; slots are addressed with 16-bit indexes
pub const MAX_LOCALS: usize = u16::MAX as usize + 1;

/// The body of a method
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    /// Native code at an RVA
    Native(NativeMethodBody),
    /// CIL bytecode
    Cil(CilBody),
}

impl MethodBody {
    /// Returns `true` for native code
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, MethodBody::Native(_))
    }

    /// Returns `true` for a CIL body
    #[must_use]
    pub fn is_cil(&self) -> bool {
        matches!(self, MethodBody::Cil(_))
    }

    /// The CIL body, if this is one
    #[must_use]
    pub fn as_cil(&self) -> Option<&CilBody> {
        match self {
            MethodBody::Cil(body) => Some(body),
            MethodBody::Native(_) => None,
        }
    }

    /// Mutable access to the CIL body, if this is one
    pub fn as_cil_mut(&mut self) -> Option<&mut CilBody> {
        match self {
            MethodBody::Cil(body) => Some(body),
            MethodBody::Native(_) => None,
        }
    }

    /// The native body, if this is one
    #[must_use]
    pub fn as_native(&self) -> Option<&NativeMethodBody> {
        match self {
            MethodBody::Native(body) => Some(body),
            MethodBody::Cil(_) => None,
        }
    }
}

impl From<NativeMethodBody> for MethodBody {
    fn from(body: NativeMethodBody) -> Self {
        MethodBody::Native(body)
    }
}

impl From<CilBody> for MethodBody {
    fn from(body: CilBody) -> Self {
        MethodBody::Cil(body)
    }
}

/// A native method body. The RVA is stored as-is and not checked against the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeMethodBody {
    rva: u32,
}

impl NativeMethodBody {
    /// Create a body at `rva`
    #[must_use]
    pub fn new(rva: u32) -> Self {
        NativeMethodBody { rva }
    }

    /// RVA of the native code
    #[must_use]
    pub fn rva(&self) -> u32 {
        self.rva
    }

    /// Set the RVA of the native code
    pub fn set_rva(&mut self, rva: u32) {
        self.rva = rva;
    }
}

/// A CIL method body.
///
/// The body is the sole owner of its instructions, exception handlers and locals. Nothing is
/// validated: `max_stack` is not compared against the code, handler regions are not checked
/// against instruction offsets, and local indexes used by instructions are the caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct CilBody {
    init_locals: bool,
    max_stack: u16,
    local_var_sig_token: u32,
    instructions: Vec<Instruction>,
    exception_handlers: Vec<ExceptionHandler>,
    locals: LocalList,
}

impl Default for CilBody {
    fn default() -> Self {
        CilBody {
            init_locals: true,
            max_stack: 0,
            local_var_sig_token: 0,
            instructions: Vec::new(),
            exception_handlers: Vec::new(),
            locals: LocalList::new(),
        }
    }
}

impl CilBody {
    /// Create an empty body with `init_locals` set
    #[must_use]
    pub fn new() -> Self {
        CilBody::default()
    }

    /// Create a body that takes ownership of the given parts, keeping their order.
    ///
    /// Locals are renumbered by position.
    #[must_use]
    pub fn with_parts(
        init_locals: bool,
        instructions: Vec<Instruction>,
        exception_handlers: Vec<ExceptionHandler>,
        locals: Vec<Local>,
    ) -> Self {
        CilBody {
            init_locals,
            instructions,
            exception_handlers,
            locals: LocalList::from_vec(locals),
            ..CilBody::default()
        }
    }

    /// Same as [`CilBody::with_parts`], but rejects parts that the body format can not describe.
    ///
    /// # Errors
    /// Returns [`Error::MalformedBody`] if there are more than [`MAX_LOCALS`] locals, or more
    /// than `u32::MAX` instructions or exception handlers.
    pub fn with_parts_checked(
        init_locals: bool,
        instructions: Vec<Instruction>,
        exception_handlers: Vec<ExceptionHandler>,
        locals: Vec<Local>,
    ) -> Result<Self> {
        if locals.len() > MAX_LOCALS {
            return Err(Error::MalformedBody(format!(
                "{} locals exceed the maximum of {}",
                locals.len(),
                MAX_LOCALS
            )));
        }
        if u32::try_from(instructions.len()).is_err() {
            return Err(Error::MalformedBody(format!(
                "{} instructions can not be counted in 32 bits",
                instructions.len()
            )));
        }
        if u32::try_from(exception_handlers.len()).is_err() {
            return Err(Error::MalformedBody(format!(
                "{} exception handlers can not be counted in 32 bits",
                exception_handlers.len()
            )));
        }

        Ok(CilBody::with_parts(
            init_locals,
            instructions,
            exception_handlers,
            locals,
        ))
    }

    /// Whether locals are zero-initialized on entry
    #[must_use]
    pub fn init_locals(&self) -> bool {
        self.init_locals
    }

    /// Set whether locals are zero-initialized on entry
    pub fn set_init_locals(&mut self, init_locals: bool) {
        self.init_locals = init_locals;
    }

    /// Maximum number of items on the operand stack
    #[must_use]
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    /// Set the maximum number of items on the operand stack
    pub fn set_max_stack(&mut self, max_stack: u16) {
        self.max_stack = max_stack;
    }

    /// Token of the `StandAloneSig` describing the locals, 0 for none
    #[must_use]
    pub fn local_var_sig_token(&self) -> u32 {
        self.local_var_sig_token
    }

    /// Set the token of the locals signature
    pub fn set_local_var_sig_token(&mut self, token: u32) {
        self.local_var_sig_token = token;
    }

    /// Returns `true` if the body has at least one instruction
    #[must_use]
    pub fn has_instructions(&self) -> bool {
        !self.instructions.is_empty()
    }

    /// The instructions, in order
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Mutable access to the instructions
    pub fn instructions_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instructions
    }

    /// Replace all instructions, returning the previous ones
    pub fn set_instructions(&mut self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        mem::replace(&mut self.instructions, instructions)
    }

    /// Returns `true` if the body has at least one exception handler
    #[must_use]
    pub fn has_exception_handlers(&self) -> bool {
        !self.exception_handlers.is_empty()
    }

    /// The exception handler clauses, in order
    #[must_use]
    pub fn exception_handlers(&self) -> &[ExceptionHandler] {
        &self.exception_handlers
    }

    /// Mutable access to the exception handler clauses
    pub fn exception_handlers_mut(&mut self) -> &mut Vec<ExceptionHandler> {
        &mut self.exception_handlers
    }

    /// Returns `true` if the body has at least one local
    #[must_use]
    pub fn has_variables(&self) -> bool {
        !self.locals.is_empty()
    }

    /// The local variable slots
    #[must_use]
    pub fn variables(&self) -> &LocalList {
        &self.locals
    }

    /// Mutable access to the local variable slots
    pub fn variables_mut(&mut self) -> &mut LocalList {
        &mut self.locals
    }

    /// The fat header flags describing this body
    #[must_use]
    pub fn header_flags(&self) -> MethodBodyFlags {
        let mut flags = MethodBodyFlags::FAT_FORMAT;
        if self.has_exception_handlers() {
            flags |= MethodBodyFlags::MORE_SECTS;
        }
        if self.init_locals {
            flags |= MethodBodyFlags::INIT_LOCALS;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::{FlowType, Operand},
        metadata::{method::ExceptionHandlerFlags, token::Token},
    };

    fn nop(offset: u32) -> Instruction {
        Instruction::new(offset, 0x00, "nop", FlowType::Sequential, Operand::None)
    }

    #[test]
    fn default_body() {
        let body = CilBody::new();
        assert!(body.init_locals());
        assert_eq!(body.max_stack(), 0);
        assert_eq!(body.local_var_sig_token(), 0);
        assert!(!body.has_instructions());
        assert!(!body.has_exception_handlers());
        assert!(!body.has_variables());
        assert_eq!(
            body.header_flags(),
            MethodBodyFlags::FAT_FORMAT | MethodBodyFlags::INIT_LOCALS
        );
    }

    #[test]
    fn with_parts_keeps_order() {
        let instructions = vec![nop(0), nop(1), nop(2)];
        let handlers = vec![
            ExceptionHandler::new(ExceptionHandlerFlags::FINALLY),
            ExceptionHandler::new(ExceptionHandlerFlags::FAULT),
        ];
        let locals = vec![
            Local::named("first", Some(Token::new(0x0100_0001))),
            Local::named("second", None),
        ];

        let body = CilBody::with_parts(false, instructions.clone(), handlers.clone(), locals);
        assert!(!body.init_locals());
        assert_eq!(body.instructions(), instructions.as_slice());
        assert_eq!(body.exception_handlers(), handlers.as_slice());
        assert_eq!(body.variables().len(), 2);
        assert_eq!(body.variables().get(1).unwrap().name.as_deref(), Some("second"));
        assert_eq!(body.variables().get(1).unwrap().index, 1);
        assert_eq!(
            body.header_flags(),
            MethodBodyFlags::FAT_FORMAT | MethodBodyFlags::MORE_SECTS
        );
    }

    #[test]
    fn set_instructions_returns_previous() {
        let mut body = CilBody::with_parts(true, vec![nop(0)], Vec::new(), Vec::new());
        let previous = body.set_instructions(vec![nop(0), nop(1)]);

        assert_eq!(previous, vec![nop(0)]);
        assert_eq!(body.instructions().len(), 2);

        body.instructions_mut().clear();
        assert!(!body.has_instructions());
    }

    #[test]
    fn mutable_sections() {
        let mut body = CilBody::new();
        body.exception_handlers_mut()
            .push(ExceptionHandler::new(ExceptionHandlerFlags::EXCEPTION));
        body.variables_mut().push(Local::new(None));
        body.set_local_var_sig_token(0x1100_0001);
        body.set_max_stack(8);
        body.set_init_locals(false);

        assert!(body.has_exception_handlers());
        assert!(body.has_variables());
        assert_eq!(body.local_var_sig_token(), 0x1100_0001);
        assert_eq!(body.max_stack(), 8);
        assert_eq!(
            body.header_flags(),
            MethodBodyFlags::FAT_FORMAT | MethodBodyFlags::MORE_SECTS
        );
    }

    #[test]
    fn checked_rejects_too_many_locals() {
        let locals = vec![Local::default(); MAX_LOCALS + 1];
        let result = CilBody::with_parts_checked(true, Vec::new(), Vec::new(), locals);
        assert!(matches!(result, Err(Error::MalformedBody(_))));

        let locals = vec![Local::default(); MAX_LOCALS];
        let body = CilBody::with_parts_checked(true, Vec::new(), Vec::new(), locals).unwrap();
        assert_eq!(body.variables().len(), MAX_LOCALS);
        assert_eq!(body.variables().get(MAX_LOCALS - 1).unwrap().index, MAX_LOCALS - 1);
    }

    #[test]
    fn native_body() {
        let mut native = NativeMethodBody::default();
        assert_eq!(native.rva(), 0);
        native.set_rva(0x2050);

        let body = MethodBody::from(native);
        assert!(body.is_native());
        assert!(!body.is_cil());
        assert_eq!(body.as_native().unwrap().rva(), 0x2050);
        assert!(body.as_cil().is_none());

        let mut cil = MethodBody::from(CilBody::new());
        cil.as_cil_mut().unwrap().set_max_stack(2);
        assert_eq!(cil.as_cil().unwrap().max_stack(), 2);
        assert!(cil.as_native().is_none());
        assert_eq!(NativeMethodBody::new(0x1000).rva(), 0x1000);
    }
}
