//! # Metadata Table Types Module
//!
//! Core infrastructure for decoding rows out of .NET metadata tables: the [`TableId`] and
//! [`CodedIndex`] addressing types, the [`TableInfo`] sizing information, the
//! [`RowReadable`] trait and the byte-backed [`MetadataTable`] container.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dotbind::metadata::tables::{InterfaceImplRaw, MetadataTable, TableId, TableInfo};
//!
//! let info = Arc::new(TableInfo::new(&[(TableId::InterfaceImpl, 1), (TableId::TypeDef, 2)], false));
//! let table = MetadataTable::<InterfaceImplRaw>::new(vec![0x02, 0x00, 0x04, 0x00], 1, info)?;
//!
//! let row = table.get(1).unwrap();
//! assert_eq!(row.class, 2);
//! assert!(table.get(0).is_none());
//! # Ok::<(), dotbind::Error>(())
//! ```
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Partition II, Section 22

mod codedindex;
mod tableid;
mod tableinfo;

use std::marker::PhantomData;

use crate::{Error, Result};

pub use codedindex::{CodedIndex, CodedIndexType, CodedIndexTypeIter, MAX_ROW};
pub use tableid::{TableId, TableIdIter};
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};

/// Trait defining the interface for reading and parsing metadata table rows.
///
/// Implementations must support 1-based row indexing.
pub trait RowReadable: Sized {
    /// The table this row type is stored in
    const TABLE: TableId;

    /// Calculates the size in bytes of a single row for this table type.
    ///
    /// ## Arguments
    ///
    /// * `sizes` - Table size information used to determine the appropriate index sizes
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads and parses a single row from the provided byte buffer.
    ///
    /// ## Arguments
    ///
    /// * `data` - The byte buffer containing the table data to read from
    /// * `offset` - Current read position, advanced by the number of bytes consumed
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Table size information for parsing variable-sized fields
    ///
    /// ## Errors
    ///
    /// Returns an error if the buffer contains insufficient data or a coded index is malformed.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// Container for the bytes of one metadata table with typed, on-demand row access.
///
/// Rows are decoded every time they are requested; nothing is cached here. Caching of decoded
/// rows is the job of the entities that consume them.
pub struct MetadataTable<T> {
    data: Vec<u8>,
    row_count: u32,
    row_size: u32,
    sizes: TableInfoRef,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: RowReadable> MetadataTable<T> {
    /// Creates a new metadata table from raw byte data.
    ///
    /// ## Arguments
    ///
    /// * `data` - The raw byte buffer containing the table data
    /// * `row_count` - The total number of rows present in the table
    /// * `sizes` - Table configuration required for row size calculation
    ///
    /// ## Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `data` is too small to hold `row_count` rows.
    pub fn new(data: Vec<u8>, row_count: u32, sizes: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&sizes);
        if (data.len() as u64) < u64::from(row_count) * u64::from(row_size) {
            return Err(Error::OutOfBounds);
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            sizes,
            _phantom: PhantomData,
        })
    }

    /// Returns the total number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Retrieves a specific row by its 1-based index.
    ///
    /// Returns `None` if the index is out of bounds or parsing fails.
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<T> {
        self.try_get(rid).ok()
    }

    /// Retrieves a specific row by its 1-based index, reporting why it could not be read.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::InvalidRowId`] for row 0 or a row past the end of the table, and the
    /// decoding error if the row bytes are malformed.
    pub fn try_get(&self, rid: u32) -> Result<T> {
        if rid == 0 || self.row_count < rid {
            return Err(Error::InvalidRowId {
                table: T::TABLE,
                rid,
            });
        }

        T::row_read(
            &self.data,
            &mut ((rid as usize - 1) * self.row_size as usize),
            rid,
            &self.sizes,
        )
    }

    /// Iterates over all rows in table order.
    ///
    /// A row that fails to decode is yielded as an error and ends the iteration.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, T> {
        TableIterator {
            table: self,
            current_row: 0,
            current_offset: 0,
        }
    }
}

impl<'a, T: RowReadable> IntoIterator for &'a MetadataTable<T> {
    type Item = Result<T>;
    type IntoIter = TableIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'a, T> {
    table: &'a MetadataTable<T>,
    current_row: u32,
    current_offset: usize,
}

impl<T: RowReadable> Iterator for TableIterator<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        self.current_row += 1;
        let row = T::row_read(
            &self.table.data,
            &mut self.current_offset,
            self.current_row,
            &self.table.sizes,
        );
        if row.is_err() {
            self.current_row = self.table.row_count;
        }

        Some(row)
    }
}
