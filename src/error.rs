use std::borrow::Cow;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::MalformedSubsection {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedSubsection {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant except [`Error::FileError`] describes a problem with the *content* of a buffer.
/// None of them are fatal to the process: callers are expected to log the failure and either skip
/// the artifact or report that the file could not be read.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::TruncatedInput`] - A required field lies beyond the end of the buffer
/// - [`Error::InvalidSignature`] - DOS/PE signature mismatch, or a Shell Link header size other than 76
/// - [`Error::UnrecognizedMagic`] - PE optional-header magic outside the known set
/// - [`Error::MalformedSubsection`] - LinkInfo/StringData offsets or sizes are inconsistent
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors while loading an input
///
/// # Examples
///
/// ```rust
/// use bottlescope::{Error, PeHeaderDecoder};
///
/// match PeHeaderDecoder::parse(&[0x4D, 0x5A]) {
///     Err(Error::TruncatedInput { offset, needed, len }) => {
///         println!("needed {needed} bytes at {offset}, buffer has {len}");
///     }
///     other => println!("{other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A read would have crossed the end of the buffer.
    ///
    /// Raised by [`crate::ByteCursor`] before any out-of-bounds access happens.
    #[error("Truncated input - needed {needed} bytes at offset {offset}, buffer holds {len}")]
    TruncatedInput {
        /// Offset of the attempted read
        offset: usize,
        /// Width of the attempted read
        needed: usize,
        /// Length of the buffer that was read from
        len: usize,
    },

    /// A signature or fixed header-size field did not hold the expected value.
    #[error("Invalid {structure} signature - found 0x{found:X}")]
    InvalidSignature {
        /// Name of the structure whose signature was checked
        structure: &'static str,
        /// The value that was actually read
        found: u32,
    },

    /// The PE optional-header magic is not one of `0x0000`, `0x010B` or `0x020B`.
    #[error("Unrecognized optional header magic - 0x{0:04X}")]
    UnrecognizedMagic(u16),

    /// An embedded substructure is internally inconsistent.
    ///
    /// This error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    MalformedSubsection {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// The only error that does not originate from the content of a buffer.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

/// Caller-facing decode failure.
///
/// A small value carrying a human-readable message. Two failures compare equal when their
/// messages are equal, which keeps assertions in tests simple; it is not an identity guarantee.
///
/// # Examples
///
/// ```rust
/// use bottlescope::{classify_executable, DecodeFailure};
///
/// let failure = classify_executable(&[0u8; 128]).unwrap_err();
/// assert_eq!(failure, DecodeFailure::INVALID_PE_FILE);
/// assert_eq!(failure.message(), "Invalid PE file");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{message}")]
pub struct DecodeFailure {
    message: Cow<'static, str>,
}

impl DecodeFailure {
    /// The canonical failure for any buffer that is not a well-formed PE image.
    pub const INVALID_PE_FILE: DecodeFailure = DecodeFailure {
        message: Cow::Borrowed("Invalid PE file"),
    };

    /// Create a failure with a custom message
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        DecodeFailure {
            message: message.into(),
        }
    }

    /// The human-readable message of this failure
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for DecodeFailure {
    fn from(error: Error) -> Self {
        DecodeFailure::new(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pe_file_message() {
        assert_eq!(DecodeFailure::INVALID_PE_FILE.message(), "Invalid PE file");
        assert_eq!(
            DecodeFailure::INVALID_PE_FILE.to_string(),
            "Invalid PE file"
        );
    }

    #[test]
    fn equality_by_message() {
        assert_eq!(
            DecodeFailure::new("Invalid PE file"),
            DecodeFailure::INVALID_PE_FILE
        );
        assert_eq!(
            DecodeFailure::new(String::from("Invalid PE file")),
            DecodeFailure::INVALID_PE_FILE
        );
        assert_ne!(
            DecodeFailure::new("Invalid shortcut"),
            DecodeFailure::INVALID_PE_FILE
        );
    }

    #[test]
    fn from_error_keeps_message() {
        let failure = DecodeFailure::from(Error::UnrecognizedMagic(0x0001));
        assert_eq!(
            failure.message(),
            "Unrecognized optional header magic - 0x0001"
        );

        let failure = DecodeFailure::from(malformed_error!("bad offset {}", 12));
        assert!(failure.message().ends_with("bad offset 12"));
    }
}
