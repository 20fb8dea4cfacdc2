//! Metadata entities and their lazy binding to table rows.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`deferred`] - Fields that resolve on first read and stay overridden once written
//! - [`tables`] - Raw table rows and the entities built from them
//! - [`source`] - The row source / resolver contract used by row-backed entities
//! - [`module`] - An in-memory [`source::MetadataSource`] for one module
//! - [`typesystem`] - Type entities and the token-keyed type registry
//! - [`method`] - Native and CIL method bodies
//! - [`streams`] - The `#Blob` heap
//! - [`validation`] - When row ids are checked

pub mod deferred;
pub mod method;
pub mod module;
pub mod source;
pub mod streams;
pub mod tables;
pub mod token;
pub mod typesystem;
pub mod validation;
