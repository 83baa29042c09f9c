//! # bottlescope Prelude
//!
//! The types needed for everyday decoding, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all bottlescope operations
pub use crate::Error;

/// The result type used throughout bottlescope
pub use crate::Result;

/// Caller-facing decode failure
pub use crate::DecodeFailure;

/// Shell Link decoder configuration
pub use crate::DecoderConfig;

// ================================================================================================
// Entry Points
// ================================================================================================

/// One-call classification and resolution
pub use crate::{classify_executable, classify_file, resolve_shortcut, resolve_shortcut_file};

/// Artifacts loaded from disk or memory
pub use crate::Input;

/// Bounds-checked reading
pub use crate::ByteCursor;

// ================================================================================================
// PE
// ================================================================================================

/// PE header decoding and classification values
pub use crate::pe::{Architecture, Characteristics, Machine, Magic, PeHeader, PeHeaderDecoder};

// ================================================================================================
// Shell Link
// ================================================================================================

/// Shell Link decoding
pub use crate::shelllink::{
    LinkFlags, LinkInfo, LinkSection, SectionIssue, ShellLinkDecoder, ShellLinkFile,
    ShellLinkHeader, StringData,
};
