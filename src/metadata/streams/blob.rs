//! The `#Blob` heap.
//!
//! Every entry is a compressed length prefix followed by that many bytes. Index 0 always holds
//! the empty blob.
//!
//! # Examples
//!
//! ```rust
//! use dotbind::metadata::streams::Blob;
//!
//! let data = [0x00, 0x03, 0x01, 0x00, 0x00];
//! let blob = Blob::from(&data)?;
//! assert_eq!(blob.get(1)?, &[0x01, 0x00, 0x00]);
//! assert!(blob.get(0)?.is_empty());
//! # Ok::<(), dotbind::Error>(())
//! ```
//!
//! # Reference
//! * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - Partition II, Section 24.2.4

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// Read-only view over the `#Blob` heap.
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a `Blob` view over the heap bytes.
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the null entry.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Get the blob that starts at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index or the entry length point past the heap.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        parser.read_bytes(len)
    }
}
