//! Metadata heaps referenced by table rows.
//!
//! Only the `#Blob` heap is consumed by the entity model: custom attribute rows point into it
//! for their value. The blob contents stay opaque.

mod blob;

pub use blob::Blob;
