//! `InterfaceImpl` table and its entity.
//!
//! Each row of the table records that a type implements an interface. The entity exists in two
//! variants behind the single [`InterfaceImpl`] type:
//!
//! - [`UserInterfaceImpl`] - built in memory, plain fields
//! - [`RowBackedInterfaceImpl`] - bound to a table row, fields resolved lazily through the
//!   owning [`crate::metadata::source::MetadataSource`]
//!
//! # Reference
//! - [ECMA-335 II.22.23](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
