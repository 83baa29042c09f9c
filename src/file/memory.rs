//! In-memory backend for buffers the caller already holds.
//!
//! This module provides the [`crate::file::memory::Memory`] backend that implements the
//! [`crate::file::Backend`] trait for owned byte buffers, e.g. shortcut files fetched from an
//! archive or bytes read by the bottle manager itself.

use super::Backend;
use crate::{Error::TruncatedInput, Result};

/// In-memory file backend owning its data.
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create a new `Memory` backend from a byte vector.
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }
}

impl Backend for Memory {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let truncated = TruncatedInput {
            offset,
            needed: len,
            len: self.data.len(),
        };

        let Some(offset_end) = offset.checked_add(len) else {
            return Err(truncated);
        };

        if offset_end > self.data.len() {
            return Err(truncated);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
