//! Packed 64-bit item addresses.

use std::fmt;

use crate::item::ItemKind;
use crate::source::SourceId;

/// Errors packing or unpacking an [`ItemLocator`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    #[error("token offset {0} exceeds the 40-bit locator field")]
    OffsetTooLarge(u64),
    #[error("locator kind byte {0:#04x} is not an item kind")]
    UnknownKind(u8),
}

/// Compact address of an item: which kind, in which source, at which token.
///
/// Layout (non-overlapping):
/// - Bits 63-56: item kind
/// - Bits 55-40: source id
/// - Bits 39-0: byte offset of the item's first token
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ItemLocator(u64);

impl ItemLocator {
    const KIND_SHIFT: u32 = 56;
    const SOURCE_SHIFT: u32 = 40;
    const SOURCE_MASK: u64 = 0xFFFF;
    pub const OFFSET_MASK: u64 = (1 << 40) - 1;

    pub fn new(kind: ItemKind, source: SourceId, offset: u64) -> Result<Self, LocatorError> {
        if offset > Self::OFFSET_MASK {
            return Err(LocatorError::OffsetTooLarge(offset));
        }
        Ok(ItemLocator(
            (u64::from(kind as u8) << Self::KIND_SHIFT)
                | (u64::from(source.raw()) << Self::SOURCE_SHIFT)
                | offset,
        ))
    }

    /// Decode a raw value, validating the kind byte.
    pub fn from_raw(raw: u64) -> Result<Self, LocatorError> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shifted value fits in 8 bits"
        )]
        let byte = (raw >> Self::KIND_SHIFT) as u8;
        ItemKind::from_byte(byte).ok_or(LocatorError::UnknownKind(byte))?;
        Ok(ItemLocator(raw))
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn kind(self) -> ItemKind {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shifted value fits in 8 bits"
        )]
        let byte = (self.0 >> Self::KIND_SHIFT) as u8;
        match ItemKind::from_byte(byte) {
            Some(kind) => kind,
            // Both constructors validate the kind byte.
            None => unreachable!("locator with invalid kind byte {byte:#04x}"),
        }
    }

    #[inline]
    pub const fn source(self) -> SourceId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "masked to 16 bits"
        )]
        let raw = ((self.0 >> Self::SOURCE_SHIFT) & Self::SOURCE_MASK) as u16;
        SourceId::new(raw)
    }

    #[inline]
    pub const fn offset(self) -> u64 {
        self.0 & Self::OFFSET_MASK
    }
}

impl fmt::Debug for ItemLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ItemLocator({:?}, {:?}, @{})",
            self.kind(),
            self.source(),
            self.offset()
        )
    }
}
