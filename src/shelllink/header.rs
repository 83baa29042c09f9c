//! The fixed 76-byte `ShellLinkHeader` and the value types stored in it.
//!
//! # Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 4    | Header size, always 76 |
//! | 4      | 16   | Class id |
//! | 20     | 4    | [`LinkFlags`] |
//! | 24     | 4    | [`FileAttributes`] of the target |
//! | 28     | 8    | Creation time |
//! | 36     | 8    | Access time |
//! | 44     | 8    | Write time |
//! | 52     | 4    | Target file size |
//! | 56     | 4    | Icon index |
//! | 60     | 4    | [`ShowCommand`] |
//! | 64     | 2    | [`HotKey`] |
//! | 66     | 10   | Reserved |
//!
//! # Reference
//! - [MS-SHLLINK 2.1](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-shllink/)

use bitflags::bitflags;
use strum::{Display, EnumIter};
use uguid::{guid, Guid};

use crate::{file::cursor::ByteCursor, Error, Result};

/// Size of the header, and the only value its size field may hold.
pub const SHELL_LINK_HEADER_SIZE: usize = 76;

/// `00021401-0000-0000-C000-000000000046`
pub const SHELL_LINK_CLSID: Guid = guid!("00021401-0000-0000-c000-000000000046");

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH_DELTA: i64 = 11_644_473_600;

bitflags! {
    /// Which optional structures follow the header, and how its strings are encoded.
    ///
    /// Built with `from_bits_retain`, so bits not named here survive a round trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LinkFlags: u32 {
        /// A LinkTargetIDList follows the header
        const HAS_LINK_TARGET_ID_LIST = 0x0000_0001;
        /// A LinkInfo block is present
        const HAS_LINK_INFO = 0x0000_0002;
        /// StringData holds NAME_STRING
        const HAS_NAME = 0x0000_0004;
        /// StringData holds RELATIVE_PATH
        const HAS_RELATIVE_PATH = 0x0000_0008;
        /// StringData holds WORKING_DIR
        const HAS_WORKING_DIR = 0x0000_0010;
        /// StringData holds COMMAND_LINE_ARGUMENTS
        const HAS_ARGUMENTS = 0x0000_0020;
        /// StringData holds ICON_LOCATION
        const HAS_ICON_LOCATION = 0x0000_0040;
        /// StringData is UTF-16LE instead of the system code page
        const IS_UNICODE = 0x0000_0080;
        /// LinkInfo is to be ignored
        const FORCE_NO_LINK_INFO = 0x0000_0100;
        /// An EnvironmentVariableDataBlock is present
        const HAS_EXP_STRING = 0x0000_0200;
        /// Run a 16-bit target in a separate VM
        const RUN_IN_SEPARATE_PROCESS = 0x0000_0400;
        /// Undefined, must be ignored
        const UNUSED1 = 0x0000_0800;
        /// A DarwinDataBlock is present
        const HAS_DARWIN_ID = 0x0000_1000;
        /// Run the target as a different user
        const RUN_AS_USER = 0x0000_2000;
        /// An IconEnvironmentDataBlock is present
        const HAS_EXP_ICON = 0x0000_4000;
        /// The file system location is a member of the user namespace
        const NO_PIDL_ALIAS = 0x0000_8000;
        /// Undefined, must be ignored
        const UNUSED2 = 0x0001_0000;
        /// A ShimDataBlock is present
        const RUN_WITH_SHIM_LAYER = 0x0002_0000;
        /// A TrackerDataBlock is to be ignored
        const FORCE_NO_LINK_TRACK = 0x0004_0000;
        /// Collect target properties into a PropertyStoreDataBlock
        const ENABLE_TARGET_METADATA = 0x0008_0000;
        /// An EnvironmentVariableDataBlock is to be ignored
        const DISABLE_LINK_PATH_TRACKING = 0x0010_0000;
        /// SpecialFolder and KnownFolder blocks are to be ignored
        const DISABLE_KNOWN_FOLDER_TRACKING = 0x0020_0000;
        /// Do not translate a known folder to its alias
        const DISABLE_KNOWN_FOLDER_ALIAS = 0x0040_0000;
        /// The target may itself be a link
        const ALLOW_LINK_TO_LINK = 0x0080_0000;
        /// Store the unaliased target when saving
        const UNALIAS_ON_SAVE = 0x0100_0000;
        /// Prefer the environment path over the ID list
        const PREFER_ENVIRONMENT_PATH = 0x0200_0000;
        /// Keep the local ID list for UNC targets
        const KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET = 0x0400_0000;
    }
}

impl LinkFlags {
    /// Flags that each gate one StringData entry, in on-disk order.
    pub const STRING_DATA: [LinkFlags; 5] = [
        LinkFlags::HAS_NAME,
        LinkFlags::HAS_RELATIVE_PATH,
        LinkFlags::HAS_WORKING_DIR,
        LinkFlags::HAS_ARGUMENTS,
        LinkFlags::HAS_ICON_LOCATION,
    ];

    /// Returns `true` if any StringData entry is present.
    #[must_use]
    pub fn has_string_data(self) -> bool {
        Self::STRING_DATA.iter().any(|flag| self.contains(*flag))
    }
}

bitflags! {
    /// Attributes of the link target at the time the link was saved
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileAttributes: u32 {
        /// Read-only
        const READONLY = 0x0000_0001;
        /// Hidden
        const HIDDEN = 0x0000_0002;
        /// Used by the operating system
        const SYSTEM = 0x0000_0004;
        /// A directory
        const DIRECTORY = 0x0000_0010;
        /// Marked for backup or removal
        const ARCHIVE = 0x0000_0020;
        /// No other attributes set
        const NORMAL = 0x0000_0080;
        /// Temporary storage
        const TEMPORARY = 0x0000_0100;
        /// A sparse file
        const SPARSE_FILE = 0x0000_0200;
        /// Has a reparse point
        const REPARSE_POINT = 0x0000_0400;
        /// Compressed
        const COMPRESSED = 0x0000_0800;
        /// Data is not immediately available
        const OFFLINE = 0x0000_1000;
        /// Excluded from content indexing
        const NOT_CONTENT_INDEXED = 0x0000_2000;
        /// Encrypted
        const ENCRYPTED = 0x0000_4000;
    }
}

/// A Windows `FILETIME`: 100-nanosecond intervals since 1601-01-01 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileTime(pub u64);

impl FileTime {
    /// Zero means "not set".
    #[must_use]
    pub fn is_set(self) -> bool {
        self.0 != 0
    }

    /// Whole seconds relative to the Unix epoch. Negative before 1970.
    #[must_use]
    pub fn to_unix_seconds(self) -> i64 {
        // u64::MAX / 10^7 fits comfortably in an i64
        (self.0 / 10_000_000) as i64 - FILETIME_UNIX_EPOCH_DELTA
    }
}

/// Window state the target is launched in.
///
/// Any value other than the three defined ones must be treated as [`ShowCommand::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u32)]
pub enum ShowCommand {
    /// `SW_SHOWNORMAL`
    #[strum(serialize = "normal")]
    Normal = 0x0000_0001,
    /// `SW_SHOWMAXIMIZED`
    #[strum(serialize = "maximized")]
    Maximized = 0x0000_0003,
    /// `SW_SHOWMINNOACTIVE`
    #[strum(serialize = "minimized")]
    MinNoActive = 0x0000_0007,
}

impl From<u32> for ShowCommand {
    fn from(raw: u32) -> Self {
        match raw {
            0x0000_0003 => ShowCommand::Maximized,
            0x0000_0007 => ShowCommand::MinNoActive,
            _ => ShowCommand::Normal,
        }
    }
}

bitflags! {
    /// Modifier keys of a [`HotKey`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HotKeyModifiers: u8 {
        /// Shift
        const SHIFT = 0x01;
        /// Ctrl
        const CONTROL = 0x02;
        /// Alt
        const ALT = 0x04;
    }
}

/// Keyboard shortcut that activates the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotKey {
    /// Virtual key code, `0` if no hot key is assigned
    pub key: u8,
    /// Modifier keys
    pub modifiers: HotKeyModifiers,
}

impl HotKey {
    /// Split the raw 16-bit field (key in the low byte, modifiers in the high byte).
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        let [key, modifiers] = raw.to_le_bytes();
        HotKey {
            key,
            modifiers: HotKeyModifiers::from_bits_retain(modifiers),
        }
    }

    /// Returns `true` if a key is assigned.
    #[must_use]
    pub fn is_set(self) -> bool {
        self.key != 0
    }
}

/// The `ShellLinkHeader` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLinkHeader {
    /// Size of the header, always 76
    pub header_size: u32,
    /// Class id; [`SHELL_LINK_CLSID`] for a trustworthy file
    pub class_id: Guid,
    /// Which optional structures follow
    pub link_flags: LinkFlags,
    /// Attributes of the target
    pub file_attributes: FileAttributes,
    /// Creation time of the target
    pub creation_time: FileTime,
    /// Last access time of the target
    pub access_time: FileTime,
    /// Last write time of the target
    pub write_time: FileTime,
    /// Low 32 bits of the target size in bytes
    pub file_size: u32,
    /// Index of the icon within the icon location
    pub icon_index: i32,
    /// Initial window state
    pub show_command: ShowCommand,
    /// Activation hot key
    pub hot_key: HotKey,
    /// Must be zero
    pub reserved1: u16,
    /// Must be zero
    pub reserved2: u32,
    /// Must be zero
    pub reserved3: u32,
}

impl ShellLinkHeader {
    /// Read the header from the start of `data`.
    ///
    /// The class id is not checked here; whether a foreign class id is acceptable is up to the
    /// caller.
    ///
    /// # Errors
    /// - [`Error::TruncatedInput`] if `data` is shorter than 76 bytes
    /// - [`Error::InvalidSignature`] if the header size field is not 76
    pub fn read(data: &[u8]) -> Result<ShellLinkHeader> {
        if data.len() < SHELL_LINK_HEADER_SIZE {
            return Err(Error::TruncatedInput {
                offset: 0,
                needed: SHELL_LINK_HEADER_SIZE,
                len: data.len(),
            });
        }

        let mut cursor = ByteCursor::new(data);

        let header_size = cursor.read_le::<u32>()?;
        if header_size as usize != SHELL_LINK_HEADER_SIZE {
            return Err(Error::InvalidSignature {
                structure: "Shell Link header size",
                found: header_size,
            });
        }

        let class_id = Guid::from_bytes(cursor.read_array::<16>()?);
        let link_flags = LinkFlags::from_bits_retain(cursor.read_le::<u32>()?);
        let file_attributes = FileAttributes::from_bits_retain(cursor.read_le::<u32>()?);
        let creation_time = FileTime(cursor.read_le::<u64>()?);
        let access_time = FileTime(cursor.read_le::<u64>()?);
        let write_time = FileTime(cursor.read_le::<u64>()?);
        let file_size = cursor.read_le::<u32>()?;
        let icon_index = cursor.read_le::<i32>()?;
        let show_command = ShowCommand::from(cursor.read_le::<u32>()?);
        let hot_key = HotKey::from_raw(cursor.read_le::<u16>()?);
        let reserved1 = cursor.read_le::<u16>()?;
        let reserved2 = cursor.read_le::<u32>()?;
        let reserved3 = cursor.read_le::<u32>()?;

        Ok(ShellLinkHeader {
            header_size,
            class_id,
            link_flags,
            file_attributes,
            creation_time,
            access_time,
            write_time,
            file_size,
            icon_index,
            show_command,
            hot_key,
            reserved1,
            reserved2,
            reserved3,
        })
    }

    /// Returns `true` if the class id is the Shell Link CLSID.
    #[must_use]
    pub fn class_id_matches(&self) -> bool {
        self.class_id == SHELL_LINK_CLSID
    }
}
