// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # bottlescope
//!
//! Defensive decoders for the two Windows binary formats a bottle manager has to look into:
//!
//! - **PE executables**, to tell well-formed images from corrupt or foreign files and to report
//!   whether they are 32-bit or 64-bit;
//! - **Shell Links** (`.lnk` shortcuts), to find the executable an installer's shortcut points at.
//!
//! Both decoders work on a borrowed byte slice, never perform I/O, and never panic or read out of
//! bounds, whatever the input. Every read goes through the bounds-checked [`ByteCursor`].
//!
//! ## Quick Start
//!
//! ```rust
//! use bottlescope::{classify_executable, resolve_shortcut, DecodeFailure};
//!
//! // Not a PE image
//! assert_eq!(
//!     classify_executable(b"#!/bin/sh"),
//!     Err(DecodeFailure::INVALID_PE_FILE)
//! );
//!
//! // Not a shortcut
//! assert_eq!(resolve_shortcut(&[0u8; 76]), None);
//! ```
//!
//! ### Working with files
//!
//! ```rust,no_run
//! use bottlescope::prelude::*;
//! use std::path::Path;
//!
//! let link = Input::from_file(Path::new("drive_c/users/Public/Desktop/Game.lnk"))?;
//! let decoded = link.shell_link(DecoderConfig::default())?;
//!
//! println!("flags: {:?}", decoded.link_flags());
//! if let Some(target) = decoded.target() {
//!     println!("target: {target}");
//! }
//! for issue in &decoded.issues {
//!     println!("skipped {issue}");
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - [`Input`] (memory-mapped or in-memory artifacts), [`ByteCursor`] and little-endian primitives
//! - [`pe`] - [`PeHeaderDecoder`], [`Magic`], [`Architecture`]
//! - [`shelllink`] - [`ShellLinkDecoder`], [`ShellLinkFile`], [`LinkFlags`], [`LinkInfo`]
//! - [`scan`] - Parallel classification of many files
//! - [`Error`], [`Result`] and [`DecodeFailure`] - Error handling
//! - [`DecoderConfig`] - Shell Link decoder configuration
//!
//! ## Error Handling
//!
//! Decoding problems are values, not panics. [`classify_executable`] collapses every problem into
//! [`DecodeFailure::INVALID_PE_FILE`]; [`PeHeaderDecoder::parse`] keeps the detailed [`Error`] for
//! diagnostics. A Shell Link whose header is valid always decodes; optional structures that cannot
//! be read are listed in [`ShellLinkFile::issues`], and [`resolve_shortcut`] returning `None` is an
//! ordinary outcome.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade (`debug` for skipped structures and rejected
//! inputs, `warn` for suspicious shortcuts). It never installs a logger.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run shell_link
//! ```
#[macro_use]
pub(crate) mod error;
pub(crate) mod config;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use bottlescope::prelude::*;
///
/// let decoder = ShellLinkDecoder::new(DecoderConfig::minimal());
/// assert!(decoder.decode(&[]).is_err());
/// ```
pub mod prelude;

pub mod file;
pub mod pe;
pub mod scan;
pub mod shelllink;

use std::path::Path;

/// `bottlescope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use config::DecoderConfig;
pub use error::{DecodeFailure, Error};
pub use file::{cursor::ByteCursor, Input};
pub use pe::{Architecture, Characteristics, Machine, Magic, PeHeader, PeHeaderDecoder};
pub use shelllink::{
    LinkFlags, LinkInfo, LinkSection, SectionIssue, ShellLinkDecoder, ShellLinkFile,
    ShellLinkHeader, StringData,
};

/// Classify the target architecture of a PE image.
///
/// # Errors
/// Returns [`DecodeFailure::INVALID_PE_FILE`] if `data` is not a well-formed PE image, whatever
/// the reason.
///
/// # Examples
///
/// ```rust
/// use bottlescope::{classify_executable, DecodeFailure};
///
/// assert_eq!(
///     classify_executable(&[]).unwrap_err().message(),
///     "Invalid PE file"
/// );
/// ```
pub fn classify_executable(data: &[u8]) -> std::result::Result<Architecture, DecodeFailure> {
    PeHeaderDecoder::decode(data).map(|header| header.architecture)
}

/// Resolve the target path of a Shell Link.
///
/// Returns `None` if `data` is not a Shell Link, has no `LinkInfo`, or its `LinkInfo` cannot be
/// decoded. StringData is not decoded.
#[must_use]
pub fn resolve_shortcut(data: &[u8]) -> Option<String> {
    ShellLinkDecoder::new(DecoderConfig::minimal()).resolve_target(data)
}

/// Load the file at `path` and classify it with [`classify_executable`].
///
/// # Errors
/// Returns a failure carrying the I/O error message if the file cannot be read, and
/// [`DecodeFailure::INVALID_PE_FILE`] if it is not a well-formed PE image.
pub fn classify_file(path: &Path) -> std::result::Result<Architecture, DecodeFailure> {
    Input::from_file(path)?.classify()
}

/// Load the file at `path` and resolve it with [`resolve_shortcut`].
///
/// # Errors
/// Returns [`Error::FileError`] if the file cannot be read.
pub fn resolve_shortcut_file(path: &Path) -> Result<Option<String>> {
    Ok(Input::from_file(path)?.resolve_shortcut())
}
