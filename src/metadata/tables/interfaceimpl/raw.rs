//! Raw `InterfaceImpl` table row.
//!
//! Each row records that the type at `class` (an index into the `TypeDef` table) implements the
//! interface referenced by `interface` (a `TypeDefOrRef` coded index).
//!
//! ## Row Layout
//!
//! | Column      | Type                          |
//! |-------------|-------------------------------|
//! | `Class`     | `TypeDef` index (2 or 4 bytes)|
//! | `Interface` | `TypeDefOrRef` coded index    |
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Section II.22.23

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `InterfaceImpl` table row as stored in the file, with unresolved indexes
pub struct InterfaceImplRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the `TypeDef` table
    pub class: u32,
    /// an index into the `TypeDef`, `TypeRef`, or `TypeSpec` table; more precisely, a `TypeDefOrRef` coded index
    pub interface: CodedIndex,
}

impl RowReadable for InterfaceImplRaw {
    const TABLE: TableId = TableId::InterfaceImpl;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */        sizes.table_index_bytes(TableId::TypeDef) +
            /* interface */    sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(InterfaceImplRaw {
            rid,
            token: Token::from_parts(TableId::InterfaceImpl, rid),
            offset: *offset,
            class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            interface: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
        })
    }
}
