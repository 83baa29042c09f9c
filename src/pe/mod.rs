//! PE header decoding and architecture classification.
//!
//! Reads just enough of a Portable Executable to decide whether it is a well-formed image and
//! which architecture it targets:
//!
//! 1. the DOS header (`"MZ"` at offset 0, PE header offset at `0x3C`),
//! 2. the PE signature (`"PE\0\0"`) at that offset,
//! 3. the fixed-size COFF file header,
//! 4. the first field of the optional header, its magic.
//!
//! Sections, data directories, resources and debug information are never touched.
//!
//! # Key Components
//!
//! - [`crate::pe::PeHeaderDecoder`] - The decoder
//! - [`crate::pe::PeHeader`] - What a successful decode yields
//! - [`crate::pe::Magic`] / [`crate::pe::Architecture`] - Classification values
//!
//! # Failure Reporting
//!
//! [`PeHeaderDecoder::decode`] collapses every failure (too short, bad signature, unknown magic)
//! into [`crate::DecodeFailure::INVALID_PE_FILE`]. Callers that want to know *why* a file was
//! rejected use [`PeHeaderDecoder::parse`], which keeps the detailed [`crate::Error`].
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::{Architecture, DecodeFailure, PeHeaderDecoder};
//!
//! let not_a_pe = [0u8; 256];
//! assert_eq!(
//!     PeHeaderDecoder::decode(&not_a_pe).unwrap_err(),
//!     DecodeFailure::INVALID_PE_FILE
//! );
//! ```

mod types;

pub use types::{Architecture, Characteristics, Machine, Magic};

use crate::{file::cursor::ByteCursor, DecodeFailure, Error, Result};

/// Size of the DOS header, the smallest buffer that can hold a PE image.
pub const DOS_HEADER_SIZE: usize = 64;
/// `"MZ"`
pub const DOS_SIGNATURE: u16 = 0x5A4D;
/// `"PE\0\0"`
pub const PE_SIGNATURE: u32 = 0x0000_4550;
/// Offset of `e_lfanew` within the DOS header.
const PE_OFFSET_FIELD: usize = 0x3C;
/// Size of the COFF file header following the PE signature.
pub const COFF_HEADER_SIZE: usize = 20;

/// Facts decoded from the headers of a PE image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeHeader {
    /// Architecture derived from [`PeHeader::magic`]
    pub architecture: Architecture,
    /// Optional-header magic
    pub magic: Magic,
    /// File offset of the PE signature (`e_lfanew`)
    pub pe_offset: u32,
    /// Target machine from the COFF header
    pub machine: Machine,
    /// Number of section headers
    pub number_of_sections: u16,
    /// Link time, seconds since the Unix epoch
    pub time_date_stamp: u32,
    /// Size of the optional header as declared by the COFF header
    pub size_of_optional_header: u16,
    /// COFF characteristics, unknown bits preserved
    pub characteristics: Characteristics,
}

/// Decoder for PE headers.
///
/// Stateless; both entry points are pure functions of their input.
pub struct PeHeaderDecoder;

impl PeHeaderDecoder {
    /// Decode the headers of a PE image.
    ///
    /// # Errors
    /// Returns [`DecodeFailure::INVALID_PE_FILE`] for any buffer that is not a well-formed PE
    /// image, whatever the reason.
    pub fn decode(data: &[u8]) -> std::result::Result<PeHeader, DecodeFailure> {
        Self::parse(data).map_err(|error| {
            log::debug!("rejected PE image: {error}");
            DecodeFailure::INVALID_PE_FILE
        })
    }

    /// Decode the headers of a PE image, keeping the detailed reason on failure.
    ///
    /// # Errors
    /// - [`Error::TruncatedInput`] if any header lies (partly) beyond the buffer
    /// - [`Error::InvalidSignature`] if the DOS or PE signature does not match
    /// - [`Error::UnrecognizedMagic`] if the optional-header magic is not a known value
    pub fn parse(data: &[u8]) -> Result<PeHeader> {
        let mut cursor = ByteCursor::new(data);
        if cursor.len() < DOS_HEADER_SIZE {
            return Err(Error::TruncatedInput {
                offset: 0,
                needed: DOS_HEADER_SIZE,
                len: cursor.len(),
            });
        }

        let dos_signature = cursor.read_le::<u16>()?;
        if dos_signature != DOS_SIGNATURE {
            return Err(Error::InvalidSignature {
                structure: "DOS",
                found: u32::from(dos_signature),
            });
        }

        let pe_offset = cursor.read_le_at::<u32>(PE_OFFSET_FIELD)?;
        let pe_signature = cursor.read_le_at::<u32>(pe_offset as usize)?;
        if pe_signature != PE_SIGNATURE {
            return Err(Error::InvalidSignature {
                structure: "PE",
                found: pe_signature,
            });
        }

        let machine = cursor.read_le::<u16>()?;
        let number_of_sections = cursor.read_le::<u16>()?;
        let time_date_stamp = cursor.read_le::<u32>()?;
        // PointerToSymbolTable, NumberOfSymbols
        cursor.advance_by(8)?;
        let size_of_optional_header = cursor.read_le::<u16>()?;
        let characteristics = cursor.read_le::<u16>()?;

        let magic = Magic::try_from(cursor.read_le::<u16>()?)?;

        Ok(PeHeader {
            architecture: Architecture::from(magic),
            magic,
            pe_offset,
            machine: Machine::from(machine),
            number_of_sections,
            time_date_stamp,
            size_of_optional_header,
            characteristics: Characteristics::from_bits_retain(characteristics),
        })
    }
}
