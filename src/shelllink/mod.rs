//! Windows Shell Link (`.lnk`) decoding and link target resolution.
//!
//! A Shell Link is a fixed 76-byte header followed by optional structures, each announced by a
//! bit in the header's [`LinkFlags`]:
//!
//! 1. `LinkTargetIDList` ([`LinkTargetIdList`]), skipped but retained
//! 2. `LinkInfo` ([`LinkInfo`]), the local or network path of the target
//! 3. `StringData` ([`StringData`]), name, relative path, working dir, arguments, icon location
//! 4. `ExtraData`, not decoded
//!
//! The decoder makes one linear pass over these. Only an unusable header is fatal. Any later
//! structure that cannot be decoded is left out of the [`ShellLinkFile`] and described in
//! [`ShellLinkFile::issues`] instead, so a shortcut with a broken `StringData` still resolves.
//!
//! # Key Components
//!
//! - [`crate::shelllink::ShellLinkDecoder`] - The decoder
//! - [`crate::shelllink::ShellLinkFile`] - A (possibly partially) decoded shortcut
//! - [`crate::shelllink::ShellLinkHeader`] / [`crate::shelllink::LinkFlags`] - The fixed header
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::{DecoderConfig, ShellLinkDecoder};
//!
//! let data = std::fs::read("Game.lnk")?;
//! let link = ShellLinkDecoder::new(DecoderConfig::default()).decode(&data)?;
//!
//! if let Some(target) = link.target() {
//!     println!("{target}");
//! }
//! for issue in &link.issues {
//!     eprintln!("{issue}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Reference
//! - [MS-SHLLINK](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-shllink/)

mod header;
mod idlist;
mod linkinfo;
mod stringdata;

use std::fmt;

use strum::Display;

pub use header::{
    FileAttributes, FileTime, HotKey, HotKeyModifiers, LinkFlags, ShellLinkHeader, ShowCommand,
    SHELL_LINK_CLSID, SHELL_LINK_HEADER_SIZE,
};
pub use idlist::LinkTargetIdList;
pub use linkinfo::{
    CommonNetworkRelativeLink, DriveType, LinkInfo, LinkInfoFlags, NetworkLinkFlags, VolumeId,
};
pub use stringdata::StringData;

use crate::{config::DecoderConfig, file::cursor::ByteCursor, Error, Result};
use linkinfo::LINK_INFO_MIN_HEADER_SIZE;

/// The optional structures of a Shell Link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LinkSection {
    /// `LinkTargetIDList`
    #[strum(serialize = "LinkTargetIDList")]
    LinkTargetIdList,
    /// `LinkInfo`
    #[strum(serialize = "LinkInfo")]
    LinkInfo,
    /// `StringData`
    #[strum(serialize = "StringData")]
    StringData,
}

/// Why an optional structure is missing from a [`ShellLinkFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionIssue {
    /// The structure that could not be decoded
    pub section: LinkSection,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for SectionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.section, self.message)
    }
}

/// A decoded Shell Link.
///
/// Optional structures are `None` when their flag is clear or when they could not be decoded; in
/// the latter case [`ShellLinkFile::issues`] says why. Structures that follow one whose size
/// could not be trusted are not attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLinkFile {
    /// The fixed header
    pub header: ShellLinkHeader,
    /// The shell namespace path of the target
    pub link_target_id_list: Option<LinkTargetIdList>,
    /// The file system location of the target
    pub link_info: Option<LinkInfo>,
    /// The user-facing strings, `None` if not decoded
    pub string_data: Option<StringData>,
    /// Structures that were announced but could not be decoded
    pub issues: Vec<SectionIssue>,
}

impl ShellLinkFile {
    fn new(header: ShellLinkHeader) -> Self {
        ShellLinkFile {
            header,
            link_target_id_list: None,
            link_info: None,
            string_data: None,
            issues: Vec::new(),
        }
    }

    fn record(&mut self, section: LinkSection, error: &Error) {
        log::warn!("{section} unavailable: {error}");
        self.issues.push(SectionIssue {
            section,
            message: error.to_string(),
        });
    }

    /// The link flags from the header
    #[must_use]
    pub fn link_flags(&self) -> LinkFlags {
        self.header.link_flags
    }

    /// Returns `true` if the class id is the Shell Link CLSID.
    #[must_use]
    pub fn class_id_matches(&self) -> bool {
        self.header.class_id_matches()
    }

    /// Returns `true` if every announced structure was decoded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// The resolved path of the link target.
    ///
    /// Only `LinkInfo` is consulted: without [`LinkFlags::HAS_LINK_INFO`], or with a `LinkInfo`
    /// that could not be decoded, this is `None` even if an ID list is present.
    #[must_use]
    pub fn target(&self) -> Option<String> {
        if !self.header.link_flags.contains(LinkFlags::HAS_LINK_INFO) {
            return None;
        }

        self.link_info.as_ref()?.target()
    }
}

/// Decoder for Shell Link files.
///
/// Holds nothing but its [`DecoderConfig`]; one decoder can serve any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLinkDecoder {
    config: DecoderConfig,
}

impl ShellLinkDecoder {
    /// Create a decoder with the given configuration
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        ShellLinkDecoder { config }
    }

    /// The configuration this decoder was created with
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a Shell Link.
    ///
    /// # Errors
    /// - [`Error::TruncatedInput`] if `data` is shorter than the 76-byte header
    /// - [`Error::InvalidSignature`] if the header size field is not 76
    /// - [`Error::MalformedSubsection`] if the class id is foreign and
    ///   [`DecoderConfig::strict_class_id`] is set
    ///
    /// Problems past the header never fail the decode; see [`ShellLinkFile::issues`].
    pub fn decode(&self, data: &[u8]) -> Result<ShellLinkFile> {
        let header = ShellLinkHeader::read(data)?;

        if !header.class_id_matches() {
            if self.config.strict_class_id {
                return Err(malformed_error!(
                    "Unexpected Shell Link class id {}",
                    header.class_id
                ));
            }
            log::warn!("Shell Link with unexpected class id {}", header.class_id);
        }

        let mut file = ShellLinkFile::new(header);
        let mut cursor = ByteCursor::new(data);
        cursor.seek(SHELL_LINK_HEADER_SIZE)?;
        self.decode_sections(&mut cursor, &mut file);

        Ok(file)
    }

    /// Decode `data` and resolve its link target.
    ///
    /// `None` is an ordinary outcome: the file is not a Shell Link, has no `LinkInfo`, or its
    /// `LinkInfo` is unusable.
    #[must_use]
    pub fn resolve_target(&self, data: &[u8]) -> Option<String> {
        match self.decode(data) {
            Ok(file) => file.target(),
            Err(error) => {
                log::debug!("not a usable Shell Link: {error}");
                None
            }
        }
    }

    fn decode_sections(&self, cursor: &mut ByteCursor<'_>, file: &mut ShellLinkFile) {
        let flags = file.header.link_flags;

        if flags.contains(LinkFlags::HAS_LINK_TARGET_ID_LIST) {
            match LinkTargetIdList::read(cursor) {
                Ok(list) => {
                    log::debug!("skipped LinkTargetIDList of {} bytes", list.len());
                    file.link_target_id_list = Some(list);
                }
                Err(error) => {
                    file.record(LinkSection::LinkTargetIdList, &error);
                    return;
                }
            }
        }

        if flags.contains(LinkFlags::HAS_LINK_INFO) {
            let block = match link_info_block(cursor) {
                Ok(block) => block,
                Err(error) => {
                    file.record(LinkSection::LinkInfo, &error);
                    return;
                }
            };

            // The block size is trusted from here on, so StringData can still be located
            match LinkInfo::read(block, self.config.ansi_encoding) {
                Ok(info) => file.link_info = Some(info),
                Err(error) => file.record(LinkSection::LinkInfo, &error),
            }
        }

        if !self.config.parse_string_data {
            return;
        }

        let mut strings = StringData::default();
        if flags.has_string_data() {
            if let Err(error) = strings.read(cursor, flags, self.config.ansi_encoding) {
                file.record(LinkSection::StringData, &error);
            }
        }
        file.string_data = Some(strings);
    }
}

/// Take the bytes of the `LinkInfo` block at the cursor, as announced by its size field.
fn link_info_block<'a>(cursor: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    let size = cursor.peek_le::<u32>()? as usize;

    if size < LINK_INFO_MIN_HEADER_SIZE {
        return Err(malformed_error!(
            "LinkInfoSize 0x{:X} is smaller than its header",
            size
        ));
    }
    if size > cursor.remaining() {
        return Err(malformed_error!(
            "LinkInfoSize 0x{:X} exceeds the 0x{:X} bytes left",
            size,
            cursor.remaining()
        ));
    }

    cursor.read_bytes(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::LinkBuilder;

    fn decode(data: &[u8]) -> ShellLinkFile {
        ShellLinkDecoder::default().decode(data).unwrap()
    }

    #[test]
    fn header_only() {
        let file = decode(&LinkBuilder::new().build());

        assert!(file.class_id_matches());
        assert!(file.link_flags().is_empty());
        assert!(file.link_target_id_list.is_none());
        assert!(file.link_info.is_none());
        assert_eq!(file.string_data, Some(StringData::default()));
        assert!(file.is_complete());
        assert_eq!(file.target(), None);
    }

    #[test]
    fn full_link() {
        let data = LinkBuilder::new()
            .flags(
                LinkFlags::HAS_LINK_TARGET_ID_LIST
                    | LinkFlags::HAS_LINK_INFO
                    | LinkFlags::HAS_NAME
                    | LinkFlags::HAS_WORKING_DIR
                    | LinkFlags::HAS_ARGUMENTS
                    | LinkFlags::IS_UNICODE,
            )
            .id_list(&[&[0x1F, 0x50], &[0x2F, 0x43, 0x3A, 0x5C]])
            .local_link_info("C:\\Program Files\\Game\\", "bin\\game.exe")
            .string("Play the game")
            .string("C:\\Program Files\\Game")
            .string("--windowed")
            .build();

        let file = decode(&data);
        assert!(file.is_complete(), "{:?}", file.issues);
        assert_eq!(file.link_target_id_list.as_ref().unwrap().items().count(), 2);

        let info = file.link_info.as_ref().unwrap();
        assert_eq!(
            info.volume_id.as_ref().unwrap().drive_type,
            DriveType::Fixed
        );
        assert_eq!(
            file.target().as_deref(),
            Some("C:\\Program Files\\Game\\bin\\game.exe")
        );

        let strings = file.string_data.as_ref().unwrap();
        assert_eq!(strings.name.as_deref(), Some("Play the game"));
        assert_eq!(strings.relative_path, None);
        assert_eq!(strings.working_dir.as_deref(), Some("C:\\Program Files\\Game"));
        assert_eq!(strings.arguments.as_deref(), Some("--windowed"));
    }

    #[test]
    fn network_target() {
        let data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_INFO)
            .network_link_info("\\\\nas\\games", "Game.exe")
            .build();

        assert_eq!(
            ShellLinkDecoder::default().resolve_target(&data).as_deref(),
            Some("\\\\nas\\games\\Game.exe")
        );
    }

    #[test]
    fn unicode_offsets_win() {
        let data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_INFO)
            .unicode_link_info("C:\\Spiele\\", "Über.exe")
            .build();

        assert_eq!(
            decode(&data).target().as_deref(),
            Some("C:\\Spiele\\Über.exe")
        );
    }

    #[test]
    fn id_list_alone_does_not_resolve() {
        let data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_TARGET_ID_LIST)
            .id_list(&[&[0x1F, 0x50]])
            .build();

        let file = decode(&data);
        assert!(file.link_target_id_list.is_some());
        assert_eq!(file.target(), None);
    }

    #[test]
    fn link_info_ignored_without_flag() {
        let data = LinkBuilder::new()
            .local_link_info("C:\\", "Game.exe")
            .build();

        assert_eq!(decode(&data).target(), None);
    }

    #[test]
    fn id_list_overrun_stops_decoding() {
        let mut data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_TARGET_ID_LIST | LinkFlags::HAS_LINK_INFO)
            .id_list(&[&[0x1F, 0x50]])
            .local_link_info("C:\\", "Game.exe")
            .build();
        data[SHELL_LINK_HEADER_SIZE] = 0xFF;
        data[SHELL_LINK_HEADER_SIZE + 1] = 0xFF;

        let file = decode(&data);
        assert!(file.link_target_id_list.is_none());
        assert!(file.link_info.is_none());
        assert!(file.string_data.is_none());
        assert_eq!(file.issues.len(), 1);
        assert_eq!(file.issues[0].section, LinkSection::LinkTargetIdList);
        assert_eq!(file.target(), None);
    }

    #[test]
    fn bad_link_info_offsets_keep_string_data() {
        let mut data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_INFO | LinkFlags::HAS_ARGUMENTS)
            .local_link_info("C:\\", "Game.exe")
            .string("-safe")
            .build();
        // LocalBasePathOffset far outside the block
        data[SHELL_LINK_HEADER_SIZE + 0x10] = 0xF0;
        data[SHELL_LINK_HEADER_SIZE + 0x11] = 0xFF;

        let file = decode(&data);
        assert!(file.link_info.is_none());
        assert_eq!(file.issues.len(), 1);
        assert_eq!(file.issues[0].section, LinkSection::LinkInfo);
        assert_eq!(file.target(), None);
        assert_eq!(
            file.string_data.unwrap().arguments.as_deref(),
            Some("-safe")
        );
    }

    #[test]
    fn link_info_size_overrun() {
        let mut data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_INFO | LinkFlags::HAS_NAME)
            .local_link_info("C:\\", "Game.exe")
            .string("Game")
            .build();
        data[SHELL_LINK_HEADER_SIZE + 2] = 0x01;

        let file = decode(&data);
        assert!(file.link_info.is_none());
        assert!(file.string_data.is_none());
        assert_eq!(file.issues[0].section, LinkSection::LinkInfo);
        assert!(file.issues[0].to_string().starts_with("LinkInfo: "));
    }

    #[test]
    fn zeroed_link_info_is_not_fatal() {
        let mut data = LinkBuilder::new().flags(LinkFlags::HAS_LINK_INFO).build();
        data.extend_from_slice(&[0u8; 64]);

        let file = decode(&data);
        assert!(file.link_flags().contains(LinkFlags::HAS_LINK_INFO));
        assert!(file.link_info.is_none());
        assert!(!file.is_complete());
        assert_eq!(file.target(), None);
    }

    #[test]
    fn truncated_string_data() {
        let mut data = LinkBuilder::new()
            .flags(LinkFlags::HAS_NAME | LinkFlags::HAS_ARGUMENTS | LinkFlags::IS_UNICODE)
            .string("Game")
            .string("--fullscreen")
            .build();
        data.truncate(data.len() - 3);

        let file = decode(&data);
        let strings = file.string_data.as_ref().unwrap();
        assert_eq!(strings.name.as_deref(), Some("Game"));
        assert_eq!(strings.arguments, None);
        assert_eq!(file.issues[0].section, LinkSection::StringData);
    }

    #[test]
    fn minimal_config_skips_string_data() {
        let data = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_INFO | LinkFlags::HAS_NAME)
            .local_link_info("D:\\", "Setup.exe")
            .string("Setup")
            .build();

        let file = ShellLinkDecoder::new(DecoderConfig::minimal())
            .decode(&data)
            .unwrap();
        assert!(file.string_data.is_none());
        assert!(file.is_complete());
        assert_eq!(file.target().as_deref(), Some("D:\\Setup.exe"));
    }

    #[test]
    fn class_id_policy() {
        let data = LinkBuilder::new()
            .class_id(uguid::guid!("00000000-0000-0000-0000-000000000001"))
            .flags(LinkFlags::HAS_LINK_INFO)
            .local_link_info("C:\\", "Game.exe")
            .build();

        let file = decode(&data);
        assert!(!file.class_id_matches());
        assert_eq!(file.target().as_deref(), Some("C:\\Game.exe"));

        let strict = ShellLinkDecoder::new(DecoderConfig::strict());
        assert!(matches!(
            strict.decode(&data),
            Err(Error::MalformedSubsection { .. })
        ));
        assert_eq!(strict.resolve_target(&data), None);
    }

    #[test]
    fn header_failures() {
        for len in [0, 1, 75] {
            let data = vec![0u8; len];
            assert!(matches!(
                ShellLinkDecoder::default().decode(&data),
                Err(Error::TruncatedInput { .. })
            ));
        }

        let data = LinkBuilder::new().header_size(0x50).build();
        assert!(matches!(
            ShellLinkDecoder::default().decode(&data),
            Err(Error::InvalidSignature { found: 0x50, .. })
        ));
        assert_eq!(ShellLinkDecoder::default().resolve_target(&data), None);
    }
}
