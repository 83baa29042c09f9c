//! Little-endian primitive reading for PE and Shell Link structures.
//!
//! Both formats decoded by this crate store every integer in little-endian byte order, so this
//! module only implements that direction. It is the foundation [`crate::file::cursor::ByteCursor`]
//! builds on.
//!
//! # Key Components
//!
//! - [`crate::file::io::LeIO`] - Trait describing how a primitive is built from its little-endian bytes
//! - [`crate::file::io::read_le`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance that offset
//!
//! # Error Handling
//!
//! All reading functions return [`crate::Result<T>`] and fail with
//! [`crate::Error::TruncatedInput`] when the buffer holds fewer bytes than the value needs. Offset
//! arithmetic is checked, so an offset near `usize::MAX` is reported as truncation instead of
//! wrapping.
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;  // offset: 0 -> 2
//! let second: u16 = read_le_at(&data, &mut offset)?; // offset: 2 -> 4
//! let third: u32 = read_le_at(&data, &mut offset)?;  // offset: 4 -> 8
//!
//! assert_eq!((first, second, third), (1, 2, 3));
//! assert_eq!(offset, 8);
//! # Ok::<(), bottlescope::Error>(())
//! ```

use crate::{Error::TruncatedInput, Result};

/// Primitive types that can be decoded from little-endian bytes.
///
/// Each implementation names the fixed-size byte array it is built from (e.g. `[u8; 4]` for
/// `u32`), which lets [`read_le_at`] derive the read width from the type alone.
pub trait LeIO: Sized {
    /// Byte array holding the encoded value
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Build the value from its little-endian encoding
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_le_io {
    ($($ty:ty),+) => {
        $(
            impl LeIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )+
    };
}

impl_le_io!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Reads a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::TruncatedInput`] if there are insufficient bytes.
pub fn read_le<T: LeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a value of type `T` at `offset` and advances `offset` by the width of `T`.
///
/// On failure `offset` is left untouched.
///
/// # Errors
/// Returns [`crate::Error::TruncatedInput`] if `offset + size_of::<T>()` exceeds the buffer length.
pub fn read_le_at<T: LeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let truncated = TruncatedInput {
        offset: *offset,
        needed: type_len,
        len: data.len(),
    };

    let Some(end) = offset.checked_add(type_len) else {
        return Err(truncated);
    };
    if end > data.len() {
        return Err(truncated);
    }

    let Ok(read) = <T::Bytes as TryFrom<&[u8]>>::try_from(&data[*offset..end]) else {
        return Err(truncated);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_u8() {
        let result = read_le::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_le_i8() {
        let result = read_le::<i8>(&[0xFF]).unwrap();
        assert_eq!(result, -1);
    }

    #[test]
    fn read_le_u16() {
        let result = read_le::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0201);
    }

    #[test]
    fn read_le_i16() {
        let result = read_le::<i16>(&[0xFE, 0xFF]).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_le_u32() {
        let result = read_le::<u32>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0403_0201);
    }

    #[test]
    fn read_le_i32() {
        let result = read_le::<i32>(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(result, -1);
    }

    #[test]
    fn read_le_u64() {
        let result = read_le::<u64>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0807_0605_0403_0201);
    }

    #[test]
    fn read_le_at_advances() {
        let mut offset = 2;
        let result = read_le_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x0403);
        assert_eq!(offset, 4);

        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x0807_0605);
        assert_eq!(offset, 8);
    }

    #[test]
    fn truncated_reads_leave_offset() {
        let mut offset = 6;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(
            result,
            Err(Error::TruncatedInput {
                offset: 6,
                needed: 4,
                len: 8
            })
        ));
        assert_eq!(offset, 6);
    }

    #[test]
    fn empty_buffer() {
        assert!(matches!(
            read_le::<u8>(&[]),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn offset_overflow() {
        let mut offset = usize::MAX - 1;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(Error::TruncatedInput { .. })));
        assert_eq!(offset, usize::MAX - 1);
    }
}
