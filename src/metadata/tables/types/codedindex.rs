//! # Coded Index Types Module
//!
//! Coded indices combine a table identifier and row index into a single value by using the
//! lower bits to encode which table type is being referenced, and the remaining bits for
//! the actual row index. `InterfaceImpl.Interface` is a `TypeDefOrRef` coded index, and
//! custom attributes are attached to their parent through a `HasCustomAttribute` coded index.
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Section II.24.2.6

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// Largest row id that a token can address
pub const MAX_ROW: u32 = 0x00FF_FFFF;

/// The coded index combinations consumed by the entity model.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// References `TypeDef`, `TypeRef`, or `TypeSpec` tables.
    TypeDefOrRef,

    /// References any entity that can have custom attributes attached.
    HasCustomAttribute,

    /// References `MethodDef` or `MemberRef` tables; the constructor of a custom attribute.
    ///
    /// Tags 0, 1 and 4 are reserved by the standard and are rejected on decode.
    CustomAttributeType,
}

impl CodedIndexType {
    /// Returns the tables that can be referenced by this coded index type, in tag order.
    ///
    /// Reserved tags of `CustomAttributeType` are represented by `None`.
    #[must_use]
    pub fn tables(&self) -> &'static [Option<TableId>] {
        match self {
            CodedIndexType::TypeDefOrRef => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasCustomAttribute => &[
                Some(TableId::MethodDef),
                Some(TableId::Field),
                Some(TableId::TypeRef),
                Some(TableId::TypeDef),
                Some(TableId::Param),
                Some(TableId::InterfaceImpl),
                Some(TableId::MemberRef),
                Some(TableId::Module),
                // The standard calls this 'Permission', no such table exists
                Some(TableId::DeclSecurity),
                Some(TableId::Property),
                Some(TableId::Event),
                Some(TableId::StandAloneSig),
                Some(TableId::ModuleRef),
                Some(TableId::TypeSpec),
                Some(TableId::Assembly),
                Some(TableId::AssemblyRef),
                Some(TableId::File),
                Some(TableId::ExportedType),
                Some(TableId::ManifestResource),
                Some(TableId::GenericParam),
                Some(TableId::GenericParamConstraint),
                Some(TableId::MethodSpec),
            ],
            CodedIndexType::CustomAttributeType => &[
                None,
                None,
                Some(TableId::MethodDef),
                Some(TableId::MemberRef),
                None,
            ],
        }
    }

    /// Number of low bits used for the tag
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tag_bits(&self) -> u8 {
        let count = self.tables().len();
        // ceil(log2(count)), count is always >= 2
        (usize::BITS - (count - 1).leading_zeros()) as u8
    }
}

/// A decoded representation of a coded index value.
///
/// ## Fields
///
/// - `tag`: The specific metadata table being referenced
/// - `row`: The 1-based row index within that table, 0 means 'no reference'
/// - `token`: The computed metadata token for direct table access
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodedIndex {
    /// The [`TableId`] this index is referring to.
    pub tag: TableId,
    /// The row ID that this `CodedIndex` is pointing to.
    pub row: u32,
    /// The computed metadata token for this coded index.
    pub token: Token,
}

impl CodedIndex {
    /// Reads and decodes a coded index from a byte buffer.
    ///
    /// Reads 2 or 4 bytes depending on the table sizes recorded in `info`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the buffer is too small or the tag is not valid for `ci_type`.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfoRef,
        ci_type: CodedIndexType,
    ) -> Result<Self> {
        let coded_index = if info.coded_index_bits(ci_type) > 16 {
            read_le_at::<u32>(data, offset)?
        } else {
            u32::from(read_le_at::<u16>(data, offset)?)
        };

        Self::decode(coded_index, ci_type)
    }

    /// Decodes a raw coded index value.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::Malformed`] if the tag is out of range or reserved, or if the row does not
    /// fit into the 24 row bits of a token.
    pub fn decode(value: u32, ci_type: CodedIndexType) -> Result<Self> {
        let tag_bits = ci_type.tag_bits();
        let tag = value & ((1 << tag_bits) - 1);
        let row = value >> tag_bits;

        if row > MAX_ROW {
            return Err(malformed_error!(
                "Row {} of coded index {:?} exceeds the token row range - 0x{:08X}",
                row,
                ci_type,
                value
            ));
        }

        match ci_type.tables().get(tag as usize) {
            Some(Some(table)) => Ok(CodedIndex::new(*table, row)),
            _ => Err(malformed_error!(
                "Invalid tag {} for coded index {:?} - 0x{:08X}",
                tag,
                ci_type,
                value
            )),
        }
    }

    /// Creates a new `CodedIndex` with the specified table and row.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Returns `true` if this index does not reference a row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }
}
