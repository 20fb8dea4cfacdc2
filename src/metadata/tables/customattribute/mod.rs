//! `CustomAttribute` table and its owned representation.
//!
//! Custom attributes are attached to their parent through a `HasCustomAttribute` coded index. A
//! parent's attributes are exposed as a [`CustomAttributeList`], which reads each attribute
//! from the table the first time its slot is accessed.

use std::sync::Arc;

use crate::utils::LazyList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `CustomAttribute`
pub type CustomAttributeRc = Arc<CustomAttribute>;
/// The custom attributes of one entity
pub type CustomAttributeList = LazyList<CustomAttributeRc>;
