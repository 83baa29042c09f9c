//! Decoder configuration.
//!
//! [`DecoderConfig`] controls how tolerant the Shell Link decoder is and which optional sections it
//! bothers to decode. The PE decoder has nothing to configure: its contract is fixed.
//!
//! # Presets
//!
//! - [`DecoderConfig::default`] - Tolerant decoding of everything, Windows-1252 for ANSI strings
//! - [`DecoderConfig::minimal`] - Header, ID list and LinkInfo only; StringData is skipped
//! - [`DecoderConfig::strict`] - Like the default, but rejects files with a foreign class id
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::{DecoderConfig, ShellLinkDecoder};
//!
//! let config = DecoderConfig {
//!     ansi_encoding: encoding_rs::SHIFT_JIS,
//!     ..DecoderConfig::default()
//! };
//! let decoder = ShellLinkDecoder::new(config);
//! assert!(decoder.decode(&[]).is_err());
//! ```

use encoding_rs::{Encoding, WINDOWS_1252};

/// Configuration for [`crate::ShellLinkDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Reject files whose class id is not the Shell Link CLSID.
    ///
    /// Off by default: a mismatch is logged and reported on the decoded file instead.
    pub strict_class_id: bool,

    /// Decode the StringData entries (name, relative path, working dir, arguments, icon location).
    pub parse_string_data: bool,

    /// Code page used for non-Unicode strings.
    ///
    /// Shortcuts store ANSI strings in the code page of the machine that wrote them. Bottles
    /// created for a particular locale should pass the matching encoding.
    pub ansi_encoding: &'static Encoding,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strict_class_id: false,
            parse_string_data: true,
            ansi_encoding: WINDOWS_1252,
        }
    }
}

impl DecoderConfig {
    /// Only what target resolution needs.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            parse_string_data: false,
            ..Self::default()
        }
    }

    /// Reject anything that does not carry the Shell Link class id.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_class_id: true,
            ..Self::default()
        }
    }
}
