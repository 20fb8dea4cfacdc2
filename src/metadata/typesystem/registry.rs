use crossbeam_skiplist::SkipMap;

use crate::metadata::{token::Token, typesystem::CilTypeRc};

/// Token-indexed storage for all types known to a module.
///
/// Lookups return shared handles; inserting a type under an existing token replaces it.
#[derive(Default)]
pub struct TypeRegistry {
    types: SkipMap<Token, CilTypeRc>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry {
            types: SkipMap::new(),
        }
    }

    /// Insert a type, keyed by its token
    pub fn insert(&self, new_type: CilTypeRc) {
        self.types.insert(new_type.token, new_type);
    }

    /// Get a type by its token
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<CilTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Returns the number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate all types in token order
    pub fn iter(&self) -> crossbeam_skiplist::map::Iter<'_, Token, CilTypeRc> {
        self.types.iter()
    }
}
