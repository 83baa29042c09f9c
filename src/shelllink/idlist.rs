//! The `LinkTargetIDList`: a shell namespace path to the target.
//!
//! Resolving an ID list needs the shell namespace of the machine that wrote it, so the list is
//! kept as raw bytes. [`LinkTargetIdList::items`] splits it into its `ItemID`s for callers that
//! want to look inside.

use crate::{file::cursor::ByteCursor, Result};

/// The `LinkTargetIDList` structure, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTargetIdList {
    /// The `IDList` bytes, including the terminating zero-sized item
    pub data: Vec<u8>,
}

impl LinkTargetIdList {
    /// Read the `u16` size and the list it announces, leaving the cursor right after it.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInput`] if the list runs past the end of the buffer.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<LinkTargetIdList> {
        let size = usize::from(cursor.read_le::<u16>()?);
        let data = cursor.read_bytes(size)?.to_vec();

        Ok(LinkTargetIdList { data })
    }

    /// Size of the list in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the list holds no bytes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the payloads of the `ItemID`s.
    ///
    /// Stops at the terminating zero-sized item, or silently at the first item that does not fit.
    pub fn items(&self) -> impl Iterator<Item = &[u8]> {
        let mut cursor = ByteCursor::new(&self.data);

        std::iter::from_fn(move || {
            let size = usize::from(cursor.read_le::<u16>().ok()?);
            let payload = size.checked_sub(2)?;
            cursor.read_bytes(payload).ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x0A, 0x00,             // IDListSize = 10
            0x04, 0x00, 0xAA, 0xBB, // ItemID
            0x04, 0x00, 0xCC, 0xDD, // ItemID
            0x00, 0x00,             // TerminalID
            0x4C,                   // whatever follows
        ];

        let mut cursor = ByteCursor::new(&data);
        let list = LinkTargetIdList::read(&mut cursor).unwrap();

        assert_eq!(list.len(), 10);
        assert_eq!(cursor.pos(), 12);
        let items = list.items().collect::<Vec<_>>();
        assert_eq!(items, vec![&[0xAA, 0xBB][..], &[0xCC, 0xDD][..]]);
    }

    #[test]
    fn overrun() {
        let data = [0xFF, 0x00, 0x01, 0x02];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            LinkTargetIdList::read(&mut cursor),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn items_stop_at_bad_size() {
        let list = LinkTargetIdList {
            data: vec![0x03, 0x00, 0x01, 0x10, 0x00, 0x02],
        };
        assert_eq!(list.items().collect::<Vec<_>>(), vec![&[0x01][..]]);
    }
}
