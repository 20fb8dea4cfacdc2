//! The row source and resolver consumed by row-backed entities.
//!
//! Row-backed entities do not parse anything themselves. They hold a non-owning handle to a
//! [`MetadataSource`] and call into it the first time one of their fields is read. Any type that
//! can hand out raw rows and map indexes to type entities can back them; [`crate::metadata::module::ModuleTables`]
//! is the in-memory implementation shipped with this crate.
//!
//! # Contract
//!
//! - Reads are idempotent: the same row id always yields an equivalent raw row.
//! - Index 0 means "no reference" and resolves to `None`; a non-zero index that can not be
//!   mapped to a live entity is an error.
//! - Custom attribute row ids are returned in table order.

use crate::{
    metadata::{
        tables::{CodedIndex, CustomAttributeRc, InterfaceImplRaw, TableId},
        token::Token,
        typesystem::CilTypeRc,
    },
    Result,
};

/// Row source and resolver for row-backed entities.
pub trait MetadataSource {
    /// Number of rows present in `table`
    fn row_count(&self, table: TableId) -> u32;

    /// Returns `true` if `rid` addresses an existing row of `table`
    fn is_valid_rid(&self, table: TableId, rid: u32) -> bool {
        rid != 0 && rid <= self.row_count(table)
    }

    /// Read row `rid` of the `InterfaceImpl` table.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidRowId`] if the row does not exist, or a decoding error.
    fn read_interface_impl(&self, rid: u32) -> Result<InterfaceImplRaw>;

    /// Resolve an index into the `TypeDef` table.
    ///
    /// # Errors
    /// Returns an error if a non-zero index does not map to a known type.
    fn resolve_type_def(&self, index: u32) -> Result<Option<CilTypeRc>>;

    /// Resolve a `TypeDefOrRef` coded index.
    ///
    /// # Errors
    /// Returns an error if a non-null index does not map to a known type.
    fn resolve_type_def_or_ref(&self, index: &CodedIndex) -> Result<Option<CilTypeRc>>;

    /// Row ids of all custom attributes whose parent is `parent`, in table order.
    ///
    /// # Errors
    /// Returns an error if the custom attribute table can not be read.
    fn custom_attribute_rids(&self, parent: Token) -> Result<Vec<u32>>;

    /// Read and convert row `rid` of the `CustomAttribute` table.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidRowId`] if the row does not exist, or a decoding error.
    fn read_custom_attribute(&self, rid: u32) -> Result<CustomAttributeRc>;
}
