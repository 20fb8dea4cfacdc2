//! Metadata tables consumed by the entity model.
//!
//! Each table lives in its own module with a `raw` row type, decoded straight from the table
//! bytes through [`RowReadable`], and an `owned` type that the rest of the crate works with.
//!
//! - [`interfaceimpl`] - `InterfaceImpl` (0x09), interface implementations of types
//! - [`customattribute`] - `CustomAttribute` (0x0C), attributes attached to entities
//! - [`types`] - table ids, coded indexes, sizing and the generic [`MetadataTable`] container

pub mod customattribute;
pub mod interfaceimpl;
pub mod types;

pub use customattribute::*;
pub use interfaceimpl::*;
pub use types::*;
