use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::tables::types::{CodedIndexType, TableId};

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::max`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` instance with the given row count.
    ///
    /// # Arguments
    /// * `rows` - The number of rows in the table
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// `TableInfo` holds the row count of every table and the resulting reference index field sizes
#[derive(Clone, Default, Debug)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Build a new `TableInfo` from the row counts of the present tables.
    ///
    /// ## Arguments
    /// * `valid_tables` - (table, row count) of every present table, absent tables have 0 rows
    /// * `large_blob`   - Specify if the #Blob heap indexes are 4 or 2 bytes
    #[must_use]
    pub fn new(valid_tables: &[(TableId, u32)], large_blob: bool) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::new(0); TableId::COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_blob: large_blob,
        };

        for (table, rows) in valid_tables {
            table_info.rows[*table as usize] = TableRowInfo::new(*rows);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Number of rows in `table`
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// Returns `true` if `rid` addresses an existing row of `table` (`1..=rows`)
    #[must_use]
    pub fn is_valid_rid(&self, table: TableId, rid: u32) -> bool {
        rid != 0 && rid <= self.rows(table)
    }

    /// Returns true, if a requested table is larger than 2^16 rows and hence requires 4 bytes instead of 2 bytes
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Returns the size of '#Blob' heap indexes in bytes
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Returns the number of bytes required to represent an index into a specific table.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached bit size for a specific coded index type.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Returns the cached byte size for a specific coded index reference.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .iter()
            .flatten()
            .map(|table| self.rows[*table as usize].bits)
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}
