//! Validation settings applied while binding rows to entities.

mod config;

pub use config::{ValidationConfig, ValidationMode};
