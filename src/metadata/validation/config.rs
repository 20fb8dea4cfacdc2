//! Validation configuration for row-backed entity construction
//!
//! Building a row-backed entity checks that its row id exists in the owning table. This module
//! decides when that check runs.

/// How eagerly row ids are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Row ids are always validated
    #[default]
    Strict,
    /// Row ids are validated in debug builds only
    Fast,
}

/// Configuration for validation during entity construction
///
/// The presence of an owning module is always checked, independent of the mode, since a
/// row-backed entity can not resolve anything without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationConfig {
    /// The active validation mode
    pub mode: ValidationMode,
}

impl ValidationConfig {
    /// Always validate row ids
    #[must_use]
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
        }
    }

    /// Validate row ids only in debug builds
    #[must_use]
    pub fn fast() -> Self {
        Self {
            mode: ValidationMode::Fast,
        }
    }

    /// Returns `true` if row ids must be checked against the table's row count
    #[must_use]
    pub fn should_validate_rids(&self) -> bool {
        match self.mode {
            ValidationMode::Strict => true,
            ValidationMode::Fast => cfg!(debug_assertions),
        }
    }
}
