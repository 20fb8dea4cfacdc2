//! Low-level access to raw metadata bytes.
//!
//! Table rows handed to the entity model are decoded from plain byte slices. This module holds
//! the bounds-checked little-endian readers used by every [`crate::metadata::tables::RowReadable`]
//! implementation, and the cursor used to walk length-prefixed heap entries.

pub mod io;
pub mod parser;
