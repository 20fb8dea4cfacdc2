//! # dotbind Prelude
//!
//! The most commonly used types of the crate in one glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotbind operations
pub use crate::Error;

/// The result type used throughout dotbind
pub use crate::Result;

/// Validation settings for row-backed entities
pub use crate::metadata::validation::{ValidationConfig, ValidationMode};

// ================================================================================================
// Addressing
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Table identification, coded indexes and sizing
pub use crate::metadata::tables::{CodedIndex, CodedIndexType, TableId, TableInfo, TableInfoRef};

// ================================================================================================
// Entities
// ================================================================================================

/// Deferred field values
pub use crate::metadata::deferred::{Deferred, DeferredState};

/// Interface implementations and custom attributes
pub use crate::metadata::tables::{
    CustomAttribute, CustomAttributeList, CustomAttributeRc, InterfaceImpl,
    RowBackedInterfaceImpl, UserInterfaceImpl,
};

/// Row source and the in-memory module implementation
pub use crate::metadata::{module::ModuleTables, source::MetadataSource};

/// Type entities
pub use crate::metadata::typesystem::{CilType, CilTypeRc, TypeAttributes, TypeRegistry};

// ================================================================================================
// Method Bodies
// ================================================================================================

/// Method body representations
pub use crate::metadata::method::{
    CilBody, ExceptionHandler, ExceptionHandlerFlags, Local, LocalList, MethodBody,
    MethodBodyFlags, NativeMethodBody,
};

/// CIL instructions
pub use crate::assembly::{FlowType, Immediate, Instruction, Operand};

/// Lazily materialized lists
pub use crate::utils::LazyList;
