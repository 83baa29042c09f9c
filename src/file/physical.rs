//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`crate::file::physical::Physical`] backend that implements the
//! [`crate::file::Backend`] trait for files on disk. Bottle scans touch many executables of which
//! only the first few hundred bytes matter, so the file is mapped instead of read: pages that are
//! never looked at are never loaded.
//!
//! Opening and mapping are the only fallible steps; both surface as
//! [`crate::Error::FileError`].

use super::Backend;
use crate::{
    Error::{FileError, TruncatedInput},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// Memory-mapped file backend.
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Open and map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path).map_err(FileError)?;

        // The mapping is read-only and dropped together with `Physical`. Files inside a bottle
        // can still be truncated by other processes while mapped, which is a caller concern.
        let mmap = unsafe { Mmap::map(&file) }.map_err(FileError)?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
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
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
