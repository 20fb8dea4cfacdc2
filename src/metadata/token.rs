//! Token addressing for metadata table rows.
//!
//! A [`Token`] is the universal key of the entity model: every row-backed entity is identified
//! by the table it lives in and its 1-based row id. Row id 0 is reserved for 'no reference'.

use std::fmt;

use crate::metadata::tables::TableId;

/// Address of a metadata table row: the table byte in bits 24-31, the row id in bits 0-23.
///
/// Entities compare, hash and order by their token, so ordering is by table first and row
/// second.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Wrap a raw token value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token addressing row `rid` of `table`
    ///
    /// Only the low 24 bits of `rid` are kept.
    #[must_use]
    pub fn from_parts(table: TableId, rid: u32) -> Self {
        Token(table.token_prefix() | (rid & 0x00FF_FFFF))
    }

    /// Returns the [`TableId`] this token addresses, if the table byte is assigned
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_token_table(self.table())
    }

    /// Raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Table byte
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Row id; 0 means the token addresses no row
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Whether this is the null token, which refers to nothing at all
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
