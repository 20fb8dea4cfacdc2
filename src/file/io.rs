//! Bounds-checked little-endian reading utilities for metadata table rows.
//!
//! All metadata table data is stored little-endian. Index columns are either 2 or 4 bytes wide
//! depending on the row count of the referenced table, which is what [`read_le_at_dyn`] is for.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotbind::file::io::{read_le_at, read_le_at_dyn};
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! assert_eq!(first, 1);
//!
//! let second = read_le_at_dyn(&data, &mut offset, true)?;
//! assert_eq!(second, 2);
//! assert_eq!(offset, 6);
//! # Ok::<(), dotbind::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be decoded from a fixed-size little-endian byte array.
pub trait CilIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cilio {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cilio!(
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
);

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Dynamically reads either a 2-byte or 4-byte little-endian value, promoting to `u32`.
///
/// # Arguments
/// * `data` - The byte buffer to read from
/// * `offset` - Read position, advanced by 2 or 4
/// * `is_large` - If `true`, reads 4 bytes; otherwise 2
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
