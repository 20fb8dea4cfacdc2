// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotbind
//!
//! The entity-binding core of a .NET metadata library. Rows of the binary metadata tables are
//! turned into strongly typed entities on first access, and method bodies are represented as
//! explicit, owned instructions, exception handler clauses and local slots.
//!
//! ## Features
//!
//! - **Lazy, token-addressed entities** - row-backed entities resolve their fields the first
//!   time they are read, through a [`metadata::source::MetadataSource`]
//! - **Edits stick** - once a field is written, the underlying row is never consulted for it again
//! - **One contract for both origins** - entities built in memory and entities loaded from a
//!   module are the same type
//! - **Method body model** - native bodies by RVA, CIL bodies with instructions, exception
//!   handlers and locals
//!
//! ## Quick Start
//!
//! ```rust
//! use dotbind::prelude::*;
//! use std::sync::Arc;
//!
//! let info = Arc::new(TableInfo::new(
//!     &[(TableId::InterfaceImpl, 1), (TableId::TypeDef, 1), (TableId::TypeRef, 1)],
//!     false,
//! ));
//! let types = TypeRegistry::new();
//! types.insert(Arc::new(CilType::new(Token::new(0x02000001), "Demo", "Widget", TypeAttributes::PUBLIC)));
//! types.insert(Arc::new(CilType::new(Token::new(0x01000001), "System", "IDisposable", TypeAttributes::INTERFACE)));
//!
//! let module = Arc::new(ModuleTables::new(info, vec![0x01, 0x00, 0x05, 0x00], Vec::new(), vec![0x00], types)?);
//! let mut entry = module.interface_impl(1)?;
//!
//! // Resolved from the table on first read
//! assert_eq!(entry.interface()?.unwrap().fullname(), "System.IDisposable");
//!
//! // Overrides are never replaced by table data
//! entry.set_interface(None);
//! assert!(entry.interface()?.is_none());
//! # Ok::<(), dotbind::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::token`] - tokens addressing table rows
//! - [`metadata::deferred`] - the deferred cell behind every lazily resolved field
//! - [`metadata::tables`] - raw rows, coded indexes and the `InterfaceImpl` / `CustomAttribute` entities
//! - [`metadata::module`] - an in-memory row source for one module
//! - [`metadata::method`] - method bodies
//! - [`assembly`] - CIL instructions
//!
//! ## Concurrency
//!
//! Lazy resolution takes `&mut self`. Entities are confined to the thread that owns them;
//! share them across threads only behind a lock.
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Official CLI specification

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotbind::prelude::*;
///
/// let body = MethodBody::from(CilBody::new());
/// assert!(body.is_cil());
/// ```
pub mod prelude;

/// CIL instructions owned by method bodies
pub mod assembly;

/// Tokens, tables, entities and method bodies of CIL metadata based on ECMA-335
pub mod metadata;

/// Collections shared across the crate
pub mod utils;

/// `dotbind` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotbind` Error type
pub use error::Error;
