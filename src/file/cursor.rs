//! Bounds-checked byte cursor for PE and Shell Link decoding.
//!
//! This module provides [`crate::file::cursor::ByteCursor`], a cursor over an immutable byte slice
//! used by every decoder in this crate. The inputs it reads are arbitrary files taken from a
//! user-controlled filesystem tree, so every operation validates `offset + width <= len` before
//! touching the buffer and reports [`crate::Error::TruncatedInput`] instead of panicking or
//! wrapping.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::cursor::ByteCursor::seek`] - Move to an absolute position
//! - [`crate::file::cursor::ByteCursor::advance_by`] - Move forward by a number of bytes
//! - [`crate::file::cursor::ByteCursor::pos`] - Get current position
//! - [`crate::file::cursor::ByteCursor::sub_cursor`] - Scope a new cursor to an embedded structure
//!
//! ## Data Access Methods
//! - [`crate::file::cursor::ByteCursor::read_le`] - Read a primitive at the current position
//! - [`crate::file::cursor::ByteCursor::read_le_at`] - Read a primitive at an absolute offset
//! - [`crate::file::cursor::ByteCursor::peek_le`] - Read without advancing
//! - [`crate::file::cursor::ByteCursor::read_bytes`] / [`crate::file::cursor::ByteCursor::read_array`] - Fixed-length ranges
//!
//! ## String Methods
//! - [`crate::file::cursor::ByteCursor::read_cstr_bytes`] - NUL-terminated 8-bit string
//! - [`crate::file::cursor::ByteCursor::read_cstring`] - NUL-terminated string in a code page
//! - [`crate::file::cursor::ByteCursor::read_cwstring`] - NUL-terminated UTF-16 string
//! - [`crate::file::cursor::ByteCursor::read_prefixed_string`] - `u16` count followed by code units
//!
//! # Usage Examples
//!
//! ```rust
//! use bottlescope::ByteCursor;
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
//! let mut cursor = ByteCursor::new(&data);
//!
//! let first = cursor.read_le::<u32>()?;
//! assert_eq!(first, 0x04030201);
//!
//! // Offsets embedded in the data are always re-validated
//! let last = cursor.read_le_at::<u16>(6)?;
//! assert_eq!(last, 0x0807);
//! assert!(cursor.read_le_at::<u16>(7).is_err());
//! # Ok::<(), bottlescope::Error>(())
//! ```

use encoding_rs::Encoding;
use widestring::U16String;

use crate::{
    file::io::{read_le_at, LeIO},
    Error::TruncatedInput,
    Result,
};

/// A cursor over an immutable byte buffer with bounds-checked little-endian reads.
///
/// Cursors are cheap stack values that never outlive a single decode call. Reading
/// advances the position; a failed read leaves it unchanged and has no other side effect.
///
/// # Examples
///
/// ```rust
/// use bottlescope::ByteCursor;
///
/// let data = [0x03, 0x00, b'a', b'b', b'c'];
/// let mut cursor = ByteCursor::new(&data);
///
/// let name = cursor.read_prefixed_string(false, encoding_rs::WINDOWS_1252)?;
/// assert_eq!(name, "abc");
/// assert!(!cursor.has_more_data());
/// # Ok::<(), bottlescope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    /// The binary data being read
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a new cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the cursor has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the current position is before the end of the buffer.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes between the current position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Get the current position of the cursor.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    fn truncated(&self, offset: usize, needed: usize) -> crate::Error {
        TruncatedInput {
            offset,
            needed,
            len: self.data.len(),
        }
    }

    /// Move the cursor to an absolute position.
    ///
    /// Seeking to exactly `len()` is allowed; the next read will then fail.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if `pos` lies beyond the end of the buffer.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.truncated(pos, 0));
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if advancing would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(self.truncated(self.position, step)),
        }
    }

    /// Read a `T` at the current position and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if reading would exceed the data length.
    pub fn read_le<T: LeIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a `T` at an absolute `offset` and leave the cursor right after it.
    ///
    /// Used for offsets taken from the data itself; the offset is validated like any other read.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if `offset + size_of::<T>()` exceeds the data length.
    pub fn read_le_at<T: LeIO>(&mut self, offset: usize) -> Result<T> {
        let mut position = offset;
        let value = read_le_at::<T>(self.data, &mut position)?;
        self.position = position;
        Ok(value)
    }

    /// Read a `T` at the current position without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if reading would exceed the data length.
    pub fn peek_le<T: LeIO>(&self) -> Result<T> {
        let mut position = self.position;
        read_le_at::<T>(self.data, &mut position)
    }

    /// Read `length` raw bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let start = self.position;
        let Some(end) = start.checked_add(length) else {
            return Err(self.truncated(start, length));
        };
        if end > self.data.len() {
            return Err(self.truncated(start, length));
        }

        self.position = end;
        Ok(&self.data[start..end])
    }

    /// Read a fixed-size byte array, e.g. a 16-byte class identifier.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    /// Create a cursor over `length` bytes starting at `offset`.
    ///
    /// Offsets inside the returned cursor are relative to `offset`, which is how LinkInfo and its
    /// nested structures address their strings. The parent cursor does not move.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the range does not fit into this buffer.
    pub fn sub_cursor(&self, offset: usize, length: usize) -> Result<ByteCursor<'a>> {
        match offset.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(ByteCursor::new(&self.data[offset..end])),
            _ => Err(self.truncated(offset, length)),
        }
    }

    /// Read a NUL-terminated 8-bit string and advance past its terminator.
    ///
    /// The terminator is not part of the returned slice. A string that runs to the end of the
    /// buffer without a terminator is rejected: it cannot be told apart from a truncated one.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if no NUL byte is found before the end of the buffer.
    pub fn read_cstr_bytes(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let tail = self.data.get(start..).unwrap_or_default();

        match tail.iter().position(|&byte| byte == 0) {
            Some(len) => {
                self.position = start + len + 1;
                Ok(&tail[..len])
            }
            None => Err(self.truncated(start, tail.len() + 1)),
        }
    }

    /// Read a NUL-terminated 8-bit string in the given code page.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if no NUL byte is found before the end of the buffer.
    pub fn read_cstring(&mut self, encoding: &'static Encoding) -> Result<String> {
        let bytes = self.read_cstr_bytes()?;
        Ok(decode_ansi(bytes, encoding))
    }

    /// Read a NUL-terminated UTF-16LE string and advance past its terminator.
    ///
    /// Unpaired surrogates are replaced rather than rejected; Windows paths are not guaranteed to
    /// be valid UTF-16.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if no NUL code unit is found before the end of the buffer.
    pub fn read_cwstring(&mut self) -> Result<String> {
        let start = self.position;
        let mut units = Vec::new();

        loop {
            match self.read_le::<u16>() {
                Ok(0) => return Ok(U16String::from_vec(units).to_string_lossy()),
                Ok(unit) => units.push(unit),
                Err(_) => {
                    self.position = start;
                    return Err(self.truncated(start, (units.len() + 1) * 2));
                }
            }
        }
    }

    /// Read a string of `count` code units.
    ///
    /// With `unicode` set each unit is a 16-bit little-endian value, otherwise a single byte in
    /// `encoding`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the units lie beyond the buffer.
    pub fn read_string_fixed(
        &mut self,
        count: usize,
        unicode: bool,
        encoding: &'static Encoding,
    ) -> Result<String> {
        if !unicode {
            let bytes = self.read_bytes(count)?;
            return Ok(decode_ansi(bytes, encoding));
        }

        let Some(length) = count.checked_mul(2) else {
            return Err(self.truncated(self.position, count));
        };
        let bytes = self.read_bytes(length)?;
        let units = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect::<Vec<_>>();

        Ok(U16String::from_vec(units).to_string_lossy())
    }

    /// Read a `u16` element count followed by that many code units (see
    /// [`ByteCursor::read_string_fixed`]).
    ///
    /// The count is validated against the remaining data before anything is allocated, so a bogus
    /// count cannot trigger a large allocation. On failure the cursor does not move.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the count or the units lie beyond the buffer.
    pub fn read_prefixed_string(
        &mut self,
        unicode: bool,
        encoding: &'static Encoding,
    ) -> Result<String> {
        let start = self.position;
        let count = usize::from(self.read_le::<u16>()?);

        match self.read_string_fixed(count, unicode, encoding) {
            Ok(string) => Ok(string),
            Err(error) => {
                self.position = start;
                Err(error)
            }
        }
    }
}

/// Decode 8-bit text in the given code page, replacing unmappable bytes.
fn decode_ansi(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn sequential_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_le::<u16>().unwrap(), 0x0201);
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.read_le::<u32>().unwrap(), 0x0605_0403);
        assert_eq!(cursor.pos(), 6);
        assert_eq!(cursor.remaining(), 2);
        assert!(cursor.has_more_data());
        assert_eq!(cursor.read_le::<u16>().unwrap(), 0x0807);
        assert!(!cursor.has_more_data());
    }

    #[test]
    fn read_at_explicit_offset() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_le_at::<u16>(4).unwrap(), 0x0605);
        assert_eq!(cursor.pos(), 6);

        // Reading at len - width + 1 must fail and leave the cursor alone
        assert!(matches!(
            cursor.read_le_at::<u16>(5),
            Err(Error::TruncatedInput {
                offset: 5,
                needed: 2,
                len: 6
            })
        ));
        assert_eq!(cursor.pos(), 6);

        assert!(matches!(
            cursor.read_le_at::<u32>(usize::MAX),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let cursor = ByteCursor::new(&data);

        assert_eq!(cursor.peek_le::<u16>().unwrap(), 0x0201);
        assert_eq!(cursor.pos(), 0);
        assert_eq!(cursor.peek_le::<u32>().unwrap(), 0x0403_0201);
        assert!(cursor.peek_le::<u64>().is_err());
    }

    #[test]
    fn empty_buffer() {
        let mut cursor = ByteCursor::new(&[]);

        assert!(cursor.is_empty());
        assert_eq!(cursor.remaining(), 0);
        assert!(matches!(
            cursor.read_le::<u8>(),
            Err(Error::TruncatedInput { .. })
        ));
        assert!(cursor.read_bytes(1).is_err());
        assert!(cursor.read_bytes(0).unwrap().is_empty());
        assert!(cursor.read_cstr_bytes().is_err());
        assert!(cursor.read_cwstring().is_err());
        assert!(cursor.read_prefixed_string(true, WINDOWS_1252).is_err());
    }

    #[test]
    fn seek_and_advance() {
        let data = [0u8; 8];
        let mut cursor = ByteCursor::new(&data);

        cursor.seek(8).unwrap();
        assert_eq!(cursor.pos(), 8);
        assert!(cursor.seek(9).is_err());
        assert_eq!(cursor.pos(), 8);

        cursor.seek(2).unwrap();
        cursor.advance_by(6).unwrap();
        assert_eq!(cursor.pos(), 8);
        assert!(cursor.advance_by(1).is_err());
        assert!(cursor.advance_by(usize::MAX).is_err());
        assert_eq!(cursor.pos(), 8);
    }

    #[test]
    fn read_bytes_and_arrays() {
        let data = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert_eq!(cursor.read_array::<3>().unwrap(), [0xCC, 0xDD, 0xEE]);
        assert!(cursor.read_array::<1>().is_err());
        assert_eq!(cursor.pos(), 5);

        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.read_bytes(6).is_err());
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn sub_cursor_is_relative() {
        let data = [0x00, 0x00, 0x34, 0x12, 0x78, 0x56];
        let cursor = ByteCursor::new(&data);

        let mut sub = cursor.sub_cursor(2, 4).unwrap();
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.read_le_at::<u16>(0).unwrap(), 0x1234);
        assert_eq!(sub.read_le::<u16>().unwrap(), 0x5678);
        assert!(sub.read_le::<u8>().is_err());

        assert!(cursor.sub_cursor(2, 5).is_err());
        assert!(cursor.sub_cursor(usize::MAX, 2).is_err());
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn nul_terminated_strings() {
        let data = [b'C', b':', b'\\', 0x00, b'x'];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_cstr_bytes().unwrap(), b"C:\\");
        assert_eq!(cursor.pos(), 4);

        // No terminator before the end
        assert!(matches!(
            cursor.read_cstr_bytes(),
            Err(Error::TruncatedInput { .. })
        ));
        assert_eq!(cursor.pos(), 4);

        let data = [0x41, 0x00, 0x42, 0x00, 0x00, 0x00, 0x43];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_cwstring().unwrap(), "AB");
        assert_eq!(cursor.pos(), 6);
        assert!(cursor.read_cwstring().is_err());
        assert_eq!(cursor.pos(), 6);
    }

    #[test]
    fn cstring_code_page() {
        // 0xE9 is 'é' in Windows-1252
        let data = [b'C', b'a', b'f', 0xE9, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_cstring(WINDOWS_1252).unwrap(), "Café");
    }

    #[test]
    fn prefixed_strings() {
        let data = [0x02, 0x00, 0x48, 0x00, 0x69, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_prefixed_string(true, WINDOWS_1252).unwrap(),
            "Hi"
        );
        assert_eq!(cursor.pos(), 6);

        let data = [0x02, 0x00, 0x48, 0x69];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_prefixed_string(false, WINDOWS_1252).unwrap(),
            "Hi"
        );

        let data = [0x00, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_prefixed_string(true, WINDOWS_1252).unwrap(),
            ""
        );

        // Count larger than what is left
        let data = [0xFF, 0xFF, 0x48, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_prefixed_string(true, WINDOWS_1252),
            Err(Error::TruncatedInput { .. })
        ));
        assert_eq!(cursor.pos(), 0);

        // Unpaired surrogate is replaced, not rejected
        let data = [0x01, 0x00, 0x00, 0xD8];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_prefixed_string(true, WINDOWS_1252).unwrap(),
            "\u{FFFD}"
        );
    }
}
