use thiserror::Error;

use crate::metadata::{tables::TableId, token::Token};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error is surfaced synchronously at the access that triggered it; nothing is retried.
/// The type is `Clone` so that a failed lazy resolution can be cached and replayed to every
/// later reader of the same field.
///
/// # Error Categories
///
/// ## Entity construction
/// - [`Error::InvalidRowId`] - A row-backed entity was requested for a row that does not exist
/// - [`Error::NullOwner`] - A row-backed entity has no (or no longer a) owning module
///
/// ## Lazy resolution
/// - [`Error::Resolution`] - A stored index could not be mapped to a live entity
/// - [`Error::TypeNotFound`] - A type token is absent from the type registry
///
/// ## Structural
/// - [`Error::Malformed`] - Corrupted or invalid table data
/// - [`Error::OutOfBounds`] - Attempted to read beyond the provided data
/// - [`Error::MalformedBody`] - Method body parts that cannot be represented
///
/// # Examples
///
/// ```rust
/// use dotbind::{Error, metadata::tables::TableId};
///
/// let err = Error::InvalidRowId { table: TableId::InterfaceImpl, rid: 0 };
/// match err {
///     Error::InvalidRowId { table, rid } => println!("{table:?} has no row {rid}"),
///     other => println!("{other}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The table data is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding table data.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// A row-backed entity was constructed with a row id that is absent from its table.
    ///
    /// Row id 0 and any row id above the table's row count are rejected.
    #[error("{table:?} rid {rid} does not exist")]
    InvalidRowId {
        /// The table that was addressed
        table: TableId,
        /// The rejected row id
        rid: u32,
    },

    /// A row-backed entity was constructed without a live owning module, or the module
    /// was dropped before a lazy field could be resolved.
    #[error("Row-backed entity has no owning module")]
    NullOwner,

    /// The resolver could not map a stored index to a live entity.
    #[error("Failed to resolve {token} - {message}")]
    Resolution {
        /// The token that was being resolved
        token: Token,
        /// Why the resolution failed
        message: String,
    },

    /// Failed to find type in the `TypeRegistry`.
    #[error("Failed to find type in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// Method body parts that can not be represented in a method body.
    #[error("Malformed method body - {0}")]
    MalformedBody(String),
}
