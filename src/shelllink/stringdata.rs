//! `StringData`: the optional user-facing strings that follow LinkInfo.
//!
//! Each entry is a `u16` character count followed by that many characters, UTF-16LE when
//! [`LinkFlags::IS_UNICODE`] is set and in the system code page otherwise. Entries are not
//! terminated and appear in a fixed order, each only if its flag is set.

use encoding_rs::Encoding;

use crate::{file::cursor::ByteCursor, shelllink::LinkFlags, Result};

/// Decoded `StringData` entries. An entry is `None` when its flag is clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringData {
    /// `NAME_STRING`, a description of the shortcut
    pub name: Option<String>,
    /// `RELATIVE_PATH` from the link to its target
    pub relative_path: Option<String>,
    /// `WORKING_DIR` the target is started in
    pub working_dir: Option<String>,
    /// `COMMAND_LINE_ARGUMENTS`
    pub arguments: Option<String>,
    /// `ICON_LOCATION`
    pub icon_location: Option<String>,
}

impl StringData {
    /// Read the entries announced by `flags`, in order, starting at the cursor position.
    ///
    /// Entries are stored as they are read, so on failure `self` keeps everything that came
    /// before the bad entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if an entry runs past the end of the buffer.
    pub fn read(
        &mut self,
        cursor: &mut ByteCursor<'_>,
        flags: LinkFlags,
        encoding: &'static Encoding,
    ) -> Result<()> {
        let unicode = flags.contains(LinkFlags::IS_UNICODE);
        let entries = [
            (LinkFlags::HAS_NAME, &mut self.name),
            (LinkFlags::HAS_RELATIVE_PATH, &mut self.relative_path),
            (LinkFlags::HAS_WORKING_DIR, &mut self.working_dir),
            (LinkFlags::HAS_ARGUMENTS, &mut self.arguments),
            (LinkFlags::HAS_ICON_LOCATION, &mut self.icon_location),
        ];

        for (flag, entry) in entries {
            if flags.contains(flag) {
                *entry = Some(cursor.read_prefixed_string(unicode, encoding)?);
            }
        }

        Ok(())
    }
}
