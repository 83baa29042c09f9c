//! Value types produced by the PE header decoder.

use std::fmt;

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::{Error, Result};

/// The optional-header magic word.
///
/// Only three raw values are meaningful. `Unknown` stands for an explicit zero and is a
/// recognized value in its own right; every other raw value is rejected by [`Magic::from_raw`]
/// instead of being folded into `Unknown`.
///
/// # Examples
///
/// ```rust
/// use bottlescope::Magic;
///
/// assert_eq!(Magic::from_raw(0x020B), Some(Magic::Pe32Plus));
/// assert_eq!(Magic::from_raw(0x0000), Some(Magic::Unknown));
/// assert_eq!(Magic::from_raw(0x0001), None);
/// assert_eq!(Magic::Pe32.to_string(), "PE32");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u16)]
pub enum Magic {
    /// Explicit zero
    #[strum(serialize = "unknown")]
    Unknown = 0x0000,
    /// 32-bit image
    #[strum(serialize = "PE32")]
    Pe32 = 0x010B,
    /// 64-bit image
    #[strum(serialize = "PE32+")]
    Pe32Plus = 0x020B,
}

impl Magic {
    /// Parse a raw magic value. Returns `None` for anything but `0x0000`, `0x010B` and `0x020B`.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Magic> {
        match raw {
            0x0000 => Some(Magic::Unknown),
            0x010B => Some(Magic::Pe32),
            0x020B => Some(Magic::Pe32Plus),
            _ => None,
        }
    }

    /// The raw 16-bit value of this magic
    #[must_use]
    pub fn raw(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Magic {
    type Error = Error;

    fn try_from(raw: u16) -> Result<Self> {
        Magic::from_raw(raw).ok_or(Error::UnrecognizedMagic(raw))
    }
}

/// Architecture classification of a PE image.
///
/// Derived from a validated [`Magic`] through `From<Magic>`.
///
/// # Examples
///
/// ```rust
/// use bottlescope::{Architecture, Magic};
///
/// assert_eq!(Architecture::from(Magic::Pe32), Architecture::X32);
/// assert_eq!(Architecture::X64.display_name(), Some("64-bit"));
/// assert_eq!(Architecture::Unknown.display_name(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Architecture {
    /// 32-bit (PE32)
    X32,
    /// 64-bit (PE32+)
    X64,
    /// Magic was zero
    Unknown,
}

impl Architecture {
    /// Label shown to users. `Unknown` has none.
    #[must_use]
    pub fn display_name(self) -> Option<&'static str> {
        match self {
            Architecture::X32 => Some("32-bit"),
            Architecture::X64 => Some("64-bit"),
            Architecture::Unknown => None,
        }
    }
}

impl From<Magic> for Architecture {
    fn from(magic: Magic) -> Self {
        match magic {
            Magic::Pe32 => Architecture::X32,
            Magic::Pe32Plus => Architecture::X64,
            Magic::Unknown => Architecture::Unknown,
        }
    }
}

/// Target machine from the COFF file header.
///
/// Informational only; classification is driven by [`Magic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    /// `IMAGE_FILE_MACHINE_I386`
    I386,
    /// `IMAGE_FILE_MACHINE_AMD64`
    Amd64,
    /// `IMAGE_FILE_MACHINE_ARMNT`
    Arm,
    /// `IMAGE_FILE_MACHINE_ARM64`
    Arm64,
    /// `IMAGE_FILE_MACHINE_IA64`
    Ia64,
    /// Anything else, with its raw value
    Other(u16),
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Machine::I386 => write!(f, "x86"),
            Machine::Amd64 => write!(f, "x86-64"),
            Machine::Arm => write!(f, "ARM"),
            Machine::Arm64 => write!(f, "ARM64"),
            Machine::Ia64 => write!(f, "IA-64"),
            Machine::Other(raw) => write!(f, "other (0x{raw:04X})"),
        }
    }
}

impl From<u16> for Machine {
    fn from(raw: u16) -> Self {
        match raw {
            0x014C => Machine::I386,
            0x8664 => Machine::Amd64,
            0x01C4 => Machine::Arm,
            0xAA64 => Machine::Arm64,
            0x0200 => Machine::Ia64,
            other => Machine::Other(other),
        }
    }
}

bitflags! {
    /// COFF file header characteristics
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Characteristics: u16 {
        /// Relocation information was stripped
        const RELOCS_STRIPPED = 0x0001;
        /// The image is valid and can be run
        const EXECUTABLE_IMAGE = 0x0002;
        /// The application can handle addresses above 2 GB
        const LARGE_ADDRESS_AWARE = 0x0020;
        /// The machine is based on a 32-bit-word architecture
        const MACHINE_32BIT = 0x0100;
        /// Debugging information was removed
        const DEBUG_STRIPPED = 0x0200;
        /// The image is a system file
        const SYSTEM = 0x1000;
        /// The image is a DLL
        const DLL = 0x2000;
    }
}
