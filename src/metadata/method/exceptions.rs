//! Exception handler clauses of CIL method bodies.
//!
//! A clause describes one protected region (`try`) and the code that handles it. The body keeps
//! clauses in the order they were added; nesting and bounds are not checked here.

use bitflags::bitflags;

use crate::metadata::token::Token;

bitflags! {
    /// Exception handler flags defining the type of exception handling clause.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExceptionHandlerFlags: u16 {
        /// A typed exception clause.
        ///
        /// The `handler` field holds the token of the exception type that is caught.
        const EXCEPTION = 0x0000;

        /// An exception filter and handler clause.
        ///
        /// The filter code starting at `filter_offset` decides whether the handler runs.
        const FILTER = 0x0001;

        /// A finally clause.
        const FINALLY = 0x0002;

        /// A fault clause (finally that executes only on exception).
        const FAULT = 0x0004;
    }
}

/// Exception handler defining try/catch/finally blocks within a method.
///
/// # Layout in IL
///
/// ```text
/// try {
///     // try_offset -> try_offset + try_length
/// }
/// catch (ExceptionType) {
///     // handler_offset -> handler_offset + handler_length
/// }
/// ```
///
/// # References
/// - ECMA-335 6th Edition, Partition II, Section 25.4.6 - Exception Handling
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionHandler {
    /// Flags describing the type of exception handler (catch, filter, finally, fault).
    pub flags: ExceptionHandlerFlags,
    /// Offset in bytes of try block from start of method body.
    pub try_offset: u32,
    /// Length in bytes of the try block.
    pub try_length: u32,
    /// Location of the handler for this try block.
    pub handler_offset: u32,
    /// Size of the handler code in bytes.
    pub handler_length: u32,
    /// If flags == EXCEPTION, the token of the exception type this clause catches.
    pub handler: Option<Token>,
    /// Offset in method body for filter-based exception handler.
    pub filter_offset: u32,
}

impl ExceptionHandler {
    /// Create a clause of the given kind with all offsets zeroed
    #[must_use]
    pub fn new(flags: ExceptionHandlerFlags) -> Self {
        ExceptionHandler {
            flags,
            ..ExceptionHandler::default()
        }
    }

    /// Returns `true` for a typed `catch` clause
    #[must_use]
    pub fn is_catch(&self) -> bool {
        !self.flags.intersects(
            ExceptionHandlerFlags::FILTER
                | ExceptionHandlerFlags::FINALLY
                | ExceptionHandlerFlags::FAULT,
        )
    }

    /// End of the protected region, `None` if it overflows
    #[must_use]
    pub fn try_end(&self) -> Option<u32> {
        self.try_offset.checked_add(self.try_length)
    }

    /// End of the handler region, `None` if it overflows
    #[must_use]
    pub fn handler_end(&self) -> Option<u32> {
        self.handler_offset.checked_add(self.handler_length)
    }
}
