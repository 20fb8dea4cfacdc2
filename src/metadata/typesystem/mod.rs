//! Type entities that interface implementations resolve to.
//!
//! The entity model only needs a live handle for the types at both ends of an
//! `InterfaceImpl` row. [`CilType`] carries the identity of a type, and [`TypeRegistry`] maps
//! tokens to shared [`CilTypeRc`] handles.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dotbind::metadata::{token::Token, typesystem::{CilType, TypeAttributes, TypeRegistry}};
//!
//! let registry = TypeRegistry::new();
//! registry.insert(Arc::new(CilType::new(
//!     Token::new(0x0200_0002),
//!     "System",
//!     "IDisposable",
//!     TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
//! )));
//!
//! let found = registry.get(&Token::new(0x0200_0002)).unwrap();
//! assert!(found.is_interface());
//! assert_eq!(found.fullname(), "System.IDisposable");
//! ```

mod registry;

use std::{fmt, sync::Arc};

use bitflags::bitflags;

use crate::metadata::token::Token;

pub use registry::TypeRegistry;

/// A reference-counted handle to a type
pub type CilTypeRc = Arc<CilType>;

bitflags! {
    /// Type attribute flags (§II.23.1.15)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeAttributes: u32 {
        /// Type is visible outside of its assembly
        const PUBLIC = 0x0000_0001;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type can not be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type can not be derived from
        const SEALED = 0x0000_0100;
        /// Type is imported
        const IMPORT = 0x0000_1000;
        /// Static initializer may run before first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

/// Identity of a type defined in, or referenced by, a module
pub struct CilType {
    /// Token of the `TypeDef`, `TypeRef` or `TypeSpec` row
    pub token: Token,
    /// `TypeNamespace`, can be empty
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Type attributes
    pub flags: TypeAttributes,
}

impl CilType {
    /// Create a new type
    pub fn new(
        token: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        flags: TypeAttributes,
    ) -> Self {
        CilType {
            token,
            namespace: namespace.into(),
            name: name.into(),
            flags,
        }
    }

    /// `Namespace.Name`, or just `Name` for types without namespace
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns `true` if this type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeAttributes::INTERFACE)
    }
}

impl fmt::Debug for CilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CilType({}, {})", self.token, self.fullname())
    }
}
