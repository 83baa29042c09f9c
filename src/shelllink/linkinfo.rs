//! The `LinkInfo` block: where the link target lives on a local volume or a network share.
//!
//! All offsets inside the block are relative to its first byte, and all nested structures
//! (`VolumeID`, `CommonNetworkRelativeLink`) address their own strings relative to *their* first
//! byte. Every offset read from the file is checked against the enclosing structure before it is
//! followed.
//!
//! # Layout
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00   | `LinkInfoSize` |
//! | 0x04   | `LinkInfoHeaderSize` (0x1C, or >= 0x24 when Unicode offsets follow) |
//! | 0x08   | [`LinkInfoFlags`] |
//! | 0x0C   | `VolumeIDOffset` |
//! | 0x10   | `LocalBasePathOffset` |
//! | 0x14   | `CommonNetworkRelativeLinkOffset` |
//! | 0x18   | `CommonPathSuffixOffset` |
//! | 0x1C   | `LocalBasePathOffsetUnicode` (optional) |
//! | 0x20   | `CommonPathSuffixOffsetUnicode` (optional) |

use bitflags::bitflags;
use encoding_rs::Encoding;
use strum::{Display, EnumIter};

use crate::{file::cursor::ByteCursor, Result};

/// Smallest valid `LinkInfoHeaderSize`.
pub const LINK_INFO_MIN_HEADER_SIZE: usize = 0x1C;
/// `LinkInfoHeaderSize` from which the Unicode offsets are present.
const LINK_INFO_UNICODE_HEADER_SIZE: usize = 0x24;
/// Fixed part of a `VolumeID`, excluding the optional Unicode label offset.
const VOLUME_ID_HEADER_SIZE: usize = 0x10;
/// `VolumeLabelOffset` value announcing a Unicode label.
const VOLUME_LABEL_UNICODE_MARKER: usize = 0x14;
/// Fixed part of a `CommonNetworkRelativeLink`, excluding the optional Unicode offsets.
const NETWORK_LINK_HEADER_SIZE: usize = 0x14;

bitflags! {
    /// Which location structures a [`LinkInfo`] carries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LinkInfoFlags: u32 {
        /// `VolumeID` and `LocalBasePath` are present
        const VOLUME_ID_AND_LOCAL_BASE_PATH = 0x0000_0001;
        /// `CommonNetworkRelativeLink` is present
        const COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX = 0x0000_0002;
    }
}

bitflags! {
    /// Which optional fields of a [`CommonNetworkRelativeLink`] are meaningful
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NetworkLinkFlags: u32 {
        /// `DeviceNameOffset` is valid
        const VALID_DEVICE = 0x0000_0001;
        /// `NetworkProviderType` is valid
        const VALID_NET_TYPE = 0x0000_0002;
    }
}

/// Type of drive the link target was stored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DriveType {
    /// `DRIVE_UNKNOWN`, also used for undefined values
    #[strum(serialize = "unknown")]
    Unknown,
    /// `DRIVE_NO_ROOT_DIR`
    #[strum(serialize = "no root directory")]
    NoRootDir,
    /// `DRIVE_REMOVABLE`
    #[strum(serialize = "removable")]
    Removable,
    /// `DRIVE_FIXED`
    #[strum(serialize = "fixed")]
    Fixed,
    /// `DRIVE_REMOTE`
    #[strum(serialize = "remote")]
    Remote,
    /// `DRIVE_CDROM`
    #[strum(serialize = "CD-ROM")]
    Cdrom,
    /// `DRIVE_RAMDISK`
    #[strum(serialize = "RAM disk")]
    Ramdisk,
}

impl From<u32> for DriveType {
    fn from(raw: u32) -> Self {
        match raw {
            1 => DriveType::NoRootDir,
            2 => DriveType::Removable,
            3 => DriveType::Fixed,
            4 => DriveType::Remote,
            5 => DriveType::Cdrom,
            6 => DriveType::Ramdisk,
            _ => DriveType::Unknown,
        }
    }
}

/// The `VolumeID` structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeId {
    /// Drive type
    pub drive_type: DriveType,
    /// Volume serial number
    pub drive_serial_number: u32,
    /// Volume label, possibly empty
    pub volume_label: String,
}

impl VolumeId {
    /// Read a `VolumeID` from a cursor spanning exactly its `VolumeIDSize` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSubsection`] if the label offset lies outside the structure
    /// or the label is not terminated inside it.
    pub fn read(mut block: ByteCursor<'_>, encoding: &'static Encoding) -> Result<VolumeId> {
        let size = block.read_le::<u32>()? as usize;
        if size <= VOLUME_ID_HEADER_SIZE || size != block.len() {
            return Err(malformed_error!("Invalid VolumeID size 0x{:X}", size));
        }

        let drive_type = DriveType::from(block.read_le::<u32>()?);
        let drive_serial_number = block.read_le::<u32>()?;
        let label_offset = block.read_le::<u32>()? as usize;

        let volume_label = if label_offset == VOLUME_LABEL_UNICODE_MARKER {
            let unicode_offset = block.read_le::<u32>()? as usize;
            let offset = checked_offset(unicode_offset, VOLUME_ID_HEADER_SIZE + 4, size)?;
            wide_string_at(&mut block, offset, "VolumeLabelUnicode")?
        } else {
            let offset = checked_offset(label_offset, VOLUME_ID_HEADER_SIZE, size)?;
            string_at(&mut block, offset, encoding, "VolumeLabel")?
        };

        Ok(VolumeId {
            drive_type,
            drive_serial_number,
            volume_label,
        })
    }
}

/// The `CommonNetworkRelativeLink` structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonNetworkRelativeLink {
    /// Which optional fields are meaningful
    pub flags: NetworkLinkFlags,
    /// Server share path, e.g. `\\server\share`
    pub net_name: String,
    /// Mapped drive, e.g. `Z:`, when [`NetworkLinkFlags::VALID_DEVICE`] is set
    pub device_name: Option<String>,
    /// `WNNC_NET_*` provider, when [`NetworkLinkFlags::VALID_NET_TYPE`] is set
    pub network_provider_type: Option<u32>,
}

impl CommonNetworkRelativeLink {
    /// Read a `CommonNetworkRelativeLink` from a cursor spanning exactly its size.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSubsection`] if a name offset lies outside the structure or
    /// a name is not terminated inside it.
    pub fn read(
        mut block: ByteCursor<'_>,
        encoding: &'static Encoding,
    ) -> Result<CommonNetworkRelativeLink> {
        let size = block.read_le::<u32>()? as usize;
        if size < NETWORK_LINK_HEADER_SIZE || size != block.len() {
            return Err(malformed_error!(
                "Invalid CommonNetworkRelativeLink size 0x{:X}",
                size
            ));
        }

        let flags = NetworkLinkFlags::from_bits_retain(block.read_le::<u32>()?);
        let net_name_offset = block.read_le::<u32>()? as usize;
        let device_name_offset = block.read_le::<u32>()? as usize;
        let provider_type = block.read_le::<u32>()?;

        // Unicode offsets only exist when the ANSI net name does not start right after the header
        let (net_name_unicode, device_name_unicode) = if net_name_offset > NETWORK_LINK_HEADER_SIZE {
            (block.read_le::<u32>()? as usize, block.read_le::<u32>()? as usize)
        } else {
            (0, 0)
        };
        let floor = block.pos();

        let net_name = if net_name_unicode != 0 {
            let offset = checked_offset(net_name_unicode, floor, size)?;
            wide_string_at(&mut block, offset, "NetNameUnicode")?
        } else {
            let offset = checked_offset(net_name_offset, floor, size)?;
            string_at(&mut block, offset, encoding, "NetName")?
        };

        let device_name = if !flags.contains(NetworkLinkFlags::VALID_DEVICE) {
            None
        } else if device_name_unicode != 0 {
            let offset = checked_offset(device_name_unicode, floor, size)?;
            Some(wide_string_at(&mut block, offset, "DeviceNameUnicode")?)
        } else {
            let offset = checked_offset(device_name_offset, floor, size)?;
            Some(string_at(&mut block, offset, encoding, "DeviceName")?)
        };

        Ok(CommonNetworkRelativeLink {
            flags,
            net_name,
            device_name,
            network_provider_type: flags
                .contains(NetworkLinkFlags::VALID_NET_TYPE)
                .then_some(provider_type),
        })
    }
}

/// The `LinkInfo` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    /// Total size of the block
    pub size: u32,
    /// Size of the fixed part of the block
    pub header_size: u32,
    /// Which location structures are present
    pub flags: LinkInfoFlags,
    /// Volume the target was stored on
    pub volume_id: Option<VolumeId>,
    /// Local path prefix, e.g. `C:\Program Files\`
    pub local_base_path: Option<String>,
    /// Network share the target was stored on
    pub common_network_relative_link: Option<CommonNetworkRelativeLink>,
    /// Path remainder appended to the local base path or the share name
    pub common_path_suffix: String,
}

impl LinkInfo {
    /// Read a `LinkInfo` block from `data`, which must span exactly `LinkInfoSize` bytes.
    ///
    /// When a Unicode variant of a path is present it takes precedence over the code-page one,
    /// which is decoded with `encoding`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSubsection`] if the sizes are inconsistent, an offset points
    /// into the header or past the block, or a string is not terminated inside the block.
    pub fn read(data: &[u8], encoding: &'static Encoding) -> Result<LinkInfo> {
        let mut block = ByteCursor::new(data);

        let size = block.read_le::<u32>()?;
        let header_size = block.read_le::<u32>()?;
        let block_size = size as usize;
        let header_len = header_size as usize;

        if block_size != data.len() {
            return Err(malformed_error!(
                "LinkInfoSize 0x{:X} does not match block of 0x{:X} bytes",
                size,
                data.len()
            ));
        }
        if header_len < LINK_INFO_MIN_HEADER_SIZE || header_len > block_size {
            return Err(malformed_error!(
                "Invalid LinkInfoHeaderSize 0x{:X}",
                header_size
            ));
        }

        let flags = LinkInfoFlags::from_bits_retain(block.read_le::<u32>()?);
        let volume_id_offset = block.read_le::<u32>()? as usize;
        let local_base_path_offset = block.read_le::<u32>()? as usize;
        let network_link_offset = block.read_le::<u32>()? as usize;
        let common_path_suffix_offset = block.read_le::<u32>()? as usize;

        let (local_base_path_unicode, common_path_suffix_unicode) =
            if header_len >= LINK_INFO_UNICODE_HEADER_SIZE {
                (block.read_le::<u32>()? as usize, block.read_le::<u32>()? as usize)
            } else {
                (0, 0)
            };

        let mut volume_id = None;
        let mut local_base_path = None;
        if flags.contains(LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH) {
            let offset = checked_offset(volume_id_offset, header_len, block_size)?;
            let volume_size = block.read_le_at::<u32>(offset)? as usize;
            let volume = block.sub_cursor(offset, volume_size).map_err(|_| {
                malformed_error!("VolumeID of 0x{:X} bytes overruns LinkInfo", volume_size)
            })?;
            volume_id = Some(VolumeId::read(volume, encoding)?);

            local_base_path = Some(if local_base_path_unicode != 0 {
                let offset = checked_offset(local_base_path_unicode, header_len, block_size)?;
                wide_string_at(&mut block, offset, "LocalBasePathUnicode")?
            } else {
                let offset = checked_offset(local_base_path_offset, header_len, block_size)?;
                string_at(&mut block, offset, encoding, "LocalBasePath")?
            });
        }

        let mut common_network_relative_link = None;
        if flags.contains(LinkInfoFlags::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX) {
            let offset = checked_offset(network_link_offset, header_len, block_size)?;
            let link_size = block.read_le_at::<u32>(offset)? as usize;
            let link = block.sub_cursor(offset, link_size).map_err(|_| {
                malformed_error!(
                    "CommonNetworkRelativeLink of 0x{:X} bytes overruns LinkInfo",
                    link_size
                )
            })?;
            common_network_relative_link = Some(CommonNetworkRelativeLink::read(link, encoding)?);
        }

        let common_path_suffix = if common_path_suffix_unicode != 0 {
            let offset = checked_offset(common_path_suffix_unicode, header_len, block_size)?;
            wide_string_at(&mut block, offset, "CommonPathSuffixUnicode")?
        } else if flags.is_empty() && common_path_suffix_offset == 0 {
            String::new()
        } else {
            let offset = checked_offset(common_path_suffix_offset, header_len, block_size)?;
            string_at(&mut block, offset, encoding, "CommonPathSuffix")?
        };

        Ok(LinkInfo {
            size,
            header_size,
            flags,
            volume_id,
            local_base_path,
            common_network_relative_link,
            common_path_suffix,
        })
    }

    /// The full path of the link target.
    ///
    /// A local base path wins over a network share when both are present. Returns `None` if the
    /// block carries neither, or if the joined path would be empty.
    #[must_use]
    pub fn target(&self) -> Option<String> {
        let suffix = self.common_path_suffix.as_str();

        let target = if let Some(base) = &self.local_base_path {
            format!("{base}{suffix}")
        } else {
            let net_name = &self.common_network_relative_link.as_ref()?.net_name;
            if suffix.is_empty() || net_name.ends_with('\\') {
                format!("{net_name}{suffix}")
            } else {
                format!("{net_name}\\{suffix}")
            }
        };

        (!target.is_empty()).then_some(target)
    }
}

/// Validate an embedded offset: it must not point into the fixed part of its structure (`floor`)
/// and must lie inside the structure (`size`).
fn checked_offset(offset: usize, floor: usize, size: usize) -> Result<usize> {
    if offset < floor || offset >= size {
        return Err(malformed_error!(
            "Offset 0x{:X} outside of 0x{:X}..0x{:X}",
            offset,
            floor,
            size
        ));
    }

    Ok(offset)
}

fn string_at(
    block: &mut ByteCursor<'_>,
    offset: usize,
    encoding: &'static Encoding,
    field: &str,
) -> Result<String> {
    block.seek(offset)?;
    block
        .read_cstring(encoding)
        .map_err(|_| malformed_error!("{} at 0x{:X} is not terminated", field, offset))
}

fn wide_string_at(block: &mut ByteCursor<'_>, offset: usize, field: &str) -> Result<String> {
    block.seek(offset)?;
    block
        .read_cwstring()
        .map_err(|_| malformed_error!("{} at 0x{:X} is not terminated", field, offset))
}
