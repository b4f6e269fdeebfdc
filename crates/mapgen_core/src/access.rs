//! Tile classification and keycard access partitions.
//!
//! Every grid cell carries an [`AccessCode`]: a mutually exclusive
//! [`BaseType`] plus an orthogonal set of keycard [`AccessBits`] marking
//! the locked region the cell belongs to. The packed 16-bit form only
//! exists at the serialization boundary ([`AccessCode::to_bits`]).
//!
//! # Bit layout
//!
//! | Bits     | Meaning                          |
//! |----------|----------------------------------|
//! | `0x00FF` | base type                        |
//! | `0x0100` | yellow access                    |
//! | `0x0200` | green access                     |
//! | `0x0400` | blue access                      |
//! | `0x0800` | red access                       |
//! | `0x1000` | leave-free placement hint        |

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Mask of the base type in the packed form.
pub const BASE_TYPE_MASK: u16 = 0x00FF;
/// Mask of the keycard access bits in the packed form.
pub const ACCESS_MASK: u16 = 0x0F00;
/// Leave-free hint bit in the packed form.
pub const LEAVE_FREE_BIT: u16 = 0x1000;

/// Mutually exclusive tile classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BaseType {
    /// Open corridor floor.
    #[default]
    Floor = 0,
    /// Solid wall.
    Wall = 1,
    /// Door cell; one of a contiguous door group.
    Door = 2,
    /// Room interior floor.
    Room = 3,
    /// Void outside the playable area.
    Nothing = 4,
    /// Decorated floor square.
    Square = 5,
}

impl BaseType {
    /// All base types in packed-value order.
    pub const ALL: [Self; 6] = [
        Self::Floor,
        Self::Wall,
        Self::Door,
        Self::Room,
        Self::Nothing,
        Self::Square,
    ];

    /// Decode a packed base type value.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// Canonical name, as used in mission files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floor => "Floor",
            Self::Wall => "Wall",
            Self::Door => "Door",
            Self::Room => "Room",
            Self::Nothing => "Nothing",
            Self::Square => "Square",
        }
    }

    /// Character used in ASCII map dumps.
    #[must_use]
    pub const fn ascii(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Door => '+',
            Self::Room => '-',
            Self::Nothing => ' ',
            Self::Square => '_',
        }
    }

    /// Inverse of [`BaseType::ascii`].
    #[must_use]
    pub fn from_ascii(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.ascii() == c)
    }

    /// Floor-like types that take a floor or shadow picture.
    #[must_use]
    pub const fn is_floor_like(self) -> bool {
        matches!(self, Self::Floor | Self::Square | Self::Room)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BaseType {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `Floor`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .unwrap_or(Self::Floor))
    }
}

bitflags! {
    /// Keycard access bits. A cell with any bit set is in a locked region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AccessBits: u16 {
        /// Yellow access.
        const YELLOW = 0x0100;
        /// Green access.
        const GREEN = 0x0200;
        /// Blue access.
        const BLUE = 0x0400;
        /// Red access.
        const RED = 0x0800;
    }
}

/// A keycard color.
///
/// Ordering follows priority: `Red` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keycard {
    /// Yellow card, key index 0.
    Yellow,
    /// Green card, key index 1.
    Green,
    /// Blue card, key index 2.
    Blue,
    /// Red card, key index 3.
    Red,
}

/// Decode order for multi-bit access codes, highest priority first.
pub const KEYCARD_PRIORITY: [Keycard; 4] =
    [Keycard::Red, Keycard::Blue, Keycard::Green, Keycard::Yellow];

impl Keycard {
    /// Keycard for a key index (0 = yellow .. 3 = red).
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Yellow),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            3 => Some(Self::Red),
            _ => None,
        }
    }

    /// Key index of this card.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The access bit this card opens.
    #[must_use]
    pub const fn access_bit(self) -> AccessBits {
        match self {
            Self::Yellow => AccessBits::YELLOW,
            Self::Green => AccessBits::GREEN,
            Self::Blue => AccessBits::BLUE,
            Self::Red => AccessBits::RED,
        }
    }

    /// Lowercase color name, used to build key pickup class names.
    #[must_use]
    pub const fn color_name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }
}

/// Access bit for a key index. `None` means "no card" and maps to no bits.
///
/// # Panics
///
/// Panics if `key_index` is greater than 3.
#[must_use]
pub fn access_mask_for_key_index(key_index: Option<usize>) -> AccessBits {
    match key_index {
        None => AccessBits::empty(),
        Some(k) => Keycard::from_index(k)
            .unwrap_or_else(|| panic!("key index {k} out of range"))
            .access_bit(),
    }
}

/// Per-cell static metadata: base type, access partition and placement hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccessCode {
    /// Tile classification.
    pub base: BaseType,
    /// Locked region membership.
    pub access: AccessBits,
    /// Placement hint: keep this cell free (something faces onto it).
    pub leave_free: bool,
}

impl AccessCode {
    /// Code returned for reads outside the grid.
    pub const NOTHING: Self = Self::new(BaseType::Nothing);
    /// Default code of a freshly allocated cell.
    pub const FLOOR: Self = Self::new(BaseType::Floor);

    /// Create an unlocked code of the given base type.
    #[must_use]
    pub const fn new(base: BaseType) -> Self {
        Self {
            base,
            access: AccessBits::empty(),
            leave_free: false,
        }
    }

    /// Set the access bits.
    #[must_use]
    pub const fn with_access(mut self, access: AccessBits) -> Self {
        self.access = access;
        self
    }

    /// Set the leave-free hint.
    #[must_use]
    pub const fn with_leave_free(mut self) -> Self {
        self.leave_free = true;
        self
    }

    /// Whether this cell belongs to a locked region.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        !self.access.is_empty()
    }

    /// Raw access bits as they appear in the packed form.
    #[must_use]
    pub const fn raw_access(self) -> u16 {
        self.access.bits()
    }

    /// Pack into the 16-bit serialized form.
    #[must_use]
    pub const fn to_bits(self) -> u16 {
        let mut bits = self.base as u16 | self.access.bits();
        if self.leave_free {
            bits |= LEAVE_FREE_BIT;
        }
        bits
    }

    /// Unpack from the 16-bit serialized form.
    ///
    /// Returns `None` for an unknown base type.
    #[must_use]
    pub fn from_bits(bits: u16) -> Option<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let base = BaseType::from_u8((bits & BASE_TYPE_MASK) as u8)?;
        Some(Self {
            base,
            access: AccessBits::from_bits_truncate(bits & ACCESS_MASK),
            leave_free: bits & LEAVE_FREE_BIT != 0,
        })
    }
}

/// Highest-priority keycard whose bit is set, in [`KEYCARD_PRIORITY`] order.
#[must_use]
pub fn decode_keycard_flag(code: AccessCode) -> Option<Keycard> {
    KEYCARD_PRIORITY
        .into_iter()
        .find(|card| code.access.contains(card.access_bit()))
}
