//! Raw `CustomAttribute` table row.
//!
//! ## Row Layout
//!
//! | Column   | Type                              |
//! |----------|-----------------------------------|
//! | `Parent` | `HasCustomAttribute` coded index  |
//! | `Type`   | `CustomAttributeType` coded index |
//! | `Value`  | `#Blob` heap index                |
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Section II.22.10

use std::sync::Arc;

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        streams::Blob,
        tables::{
            CodedIndex, CodedIndexType, CustomAttribute, CustomAttributeRc, RowReadable, TableId,
            TableInfoRef,
        },
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `CustomAttribute` table row as stored in the file, with unresolved indexes
pub struct CustomAttributeRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into any table that can carry attributes; a `HasCustomAttribute` coded index
    pub parent: CodedIndex,
    /// an index into the `MethodDef` or `MemberRef` table; a `CustomAttributeType` coded index
    pub constructor: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl CustomAttributeRaw {
    /// Convert into a [`CustomAttribute`], copying the value blob out of the heap.
    ///
    /// A value index of 0 yields an empty value.
    ///
    /// # Errors
    /// Returns an error if the value index points outside of `blob`.
    pub fn to_owned(&self, blob: &Blob) -> Result<CustomAttributeRc> {
        let value = if self.value == 0 {
            Vec::new()
        } else {
            blob.get(self.value as usize)?.to_vec()
        };

        Ok(Arc::new(CustomAttribute {
            rid: self.rid,
            token: self.token,
            offset: self.offset,
            parent: self.parent.token,
            constructor: self.constructor.token,
            value,
        }))
    }
}

impl RowReadable for CustomAttributeRaw {
    const TABLE: TableId = TableId::CustomAttribute;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */    sizes.coded_index_bytes(CodedIndexType::HasCustomAttribute) +
            /* type */      sizes.coded_index_bytes(CodedIndexType::CustomAttributeType) +
            /* value */     sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            token: Token::from_parts(TableId::CustomAttribute, rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasCustomAttribute)?,
            constructor: CodedIndex::read(
                data,
                offset,
                sizes,
                CodedIndexType::CustomAttributeType,
            )?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
