//! Input abstraction and low-level reading primitives.
//!
//! The decoders in this crate never perform I/O: they operate on a borrowed byte slice. This
//! module is the caller-side half of that contract. It loads artifacts from disk or memory and
//! hands their bytes to the decoders.
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::Input`] - An artifact loaded from disk or memory
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//!
//! ## Reading Infrastructure
//! - [`crate::file::cursor::ByteCursor`] - Bounds-checked cursor used by all decoders
//! - [`crate::file::io`] - Little-endian primitive reading
//!
//! ## Backend Implementations
//! - `Physical` - Memory-mapped file backend for disk access
//! - `Memory` - In-memory buffer backend
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::Input;
//! use std::path::Path;
//!
//! let input = Input::from_file(Path::new("drive_c/users/Public/Desktop/Game.lnk"))?;
//! if let Some(target) = input.resolve_shortcut() {
//!     let exe = Input::from_file(Path::new(&target))?;
//!     println!("{target}: {:?}", exe.classify());
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`Backend`] requires `Send + Sync`, so an [`Input`] can be moved into worker threads, which is
//! what [`crate::scan`] does.

pub mod cursor;
pub mod io;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    config::DecoderConfig,
    pe::{Architecture, PeHeader, PeHeaderDecoder},
    shelllink::{ShellLinkDecoder, ShellLinkFile},
    DecodeFailure, Result,
};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of artifact data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// An artifact loaded from disk or memory, ready to be decoded.
///
/// `Input` owns the bytes; every decode call borrows them for its own duration only.
pub struct Input {
    data: Box<dyn Backend>,
}

impl Input {
    /// Memory-map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped. This is the
    /// only failure mode: empty or malformed files load fine and are rejected by the decoders.
    pub fn from_file(path: &Path) -> Result<Input> {
        let input = Physical::new(path)?;
        log::debug!("mapped {} ({} bytes)", path.display(), input.len());

        Ok(Input {
            data: Box::new(input),
        })
    }

    /// Wrap an owned buffer.
    #[must_use]
    pub fn from_mem(data: Vec<u8>) -> Input {
        Input {
            data: Box::new(Memory::new(data)),
        }
    }

    /// Returns the total size of the artifact in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the artifact holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the raw bytes of the artifact.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the range lies outside the artifact.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Decode the PE headers of this artifact.
    ///
    /// # Errors
    /// Returns [`DecodeFailure::INVALID_PE_FILE`] for anything that is not a well-formed PE image.
    pub fn pe_header(&self) -> std::result::Result<PeHeader, DecodeFailure> {
        PeHeaderDecoder::decode(self.data())
    }

    /// Classify the target architecture of this artifact.
    ///
    /// # Errors
    /// Returns [`DecodeFailure::INVALID_PE_FILE`] for anything that is not a well-formed PE image.
    pub fn classify(&self) -> std::result::Result<Architecture, DecodeFailure> {
        crate::classify_executable(self.data())
    }

    /// Decode this artifact as a Shell Link file.
    ///
    /// # Errors
    /// Returns an error if the 76-byte header is missing or invalid.
    pub fn shell_link(&self, config: DecoderConfig) -> Result<ShellLinkFile> {
        ShellLinkDecoder::new(config).decode(self.data())
    }

    /// Resolve the target path of this artifact, if it is a shortcut with a usable LinkInfo block.
    #[must_use]
    pub fn resolve_shortcut(&self) -> Option<String> {
        crate::resolve_shortcut(self.data())
    }
}
