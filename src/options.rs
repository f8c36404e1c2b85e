//! Structured operation options.
//!
//! Searching and mutating operations take these small records of named fields instead of a packed
//! flags word. The legacy single-word encoding is still available through
//! [`FindOptions::to_bits`] / [`FindOptions::from_bits`] with a fixed, documented layout (bit 0
//! direction, bits 1-3 organization, bit 4 multi-value, bit 5 move semantics, bits 6-7 search
//! kind), so stored flag values keep meaning across versions.

use derive_more::IsVariant;

use crate::util::error::Error;

/// Scan direction for find, iterate and compare operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Self-organization policy applied by `find` on a hit.
///
/// `CountBased` and `Auto` are map-only policies kept for layout stability; the list containers
/// reject them with [`Error::BadParam`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Organize {
    #[default]
    None,
    /// Swap the found element's payload with the scan origin's payload, so the hot value ends up
    /// at the front (the tail, for backward scans).
    MoveToFront,
    /// Swap the found element's payload with an adjacent node, bubbling frequently-accessed
    /// values over repeated calls. See the individual lists for which neighbor is chosen.
    Transpose,
    CountBased,
    Auto,
}

/// Whether an insertion copies the supplied value or moves it out of its cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Transfer {
    #[default]
    Copy,
    Move,
}

/// The search algorithm requested. Nothing here maintains sorted order, so `Binary` is reported
/// as [`Error::NoSuchMethod`] by every current container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum SearchKind {
    #[default]
    Linear,
    Binary,
}

/// The option record accepted by `find`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub direction: Direction,
    pub organize: Organize,
    /// Multi-value semantics, relevant only to map-like structures; carried for layout stability.
    pub multi: bool,
    pub transfer: Transfer,
    pub search: SearchKind,
}

impl FindOptions {
    pub const fn new() -> FindOptions {
        FindOptions {
            direction: Direction::Forward,
            organize: Organize::None,
            multi: false,
            transfer: Transfer::Copy,
            search: SearchKind::Linear,
        }
    }

    pub const fn with_direction(mut self, direction: Direction) -> FindOptions {
        self.direction = direction;
        self
    }

    pub const fn with_organize(mut self, organize: Organize) -> FindOptions {
        self.organize = organize;
        self
    }

    pub const fn with_search(mut self, search: SearchKind) -> FindOptions {
        self.search = search;
        self
    }

    /// Packs the record into the legacy flag-word layout.
    pub const fn to_bits(self) -> u32 {
        let direction = match self.direction {
            Direction::Forward => 0,
            Direction::Backward => 1,
        };
        let organize = match self.organize {
            Organize::None => 0,
            Organize::MoveToFront => 1,
            Organize::Transpose => 2,
            Organize::CountBased => 3,
            Organize::Auto => 4,
        };
        let transfer = match self.transfer {
            Transfer::Copy => 0,
            Transfer::Move => 1,
        };
        let search = match self.search {
            SearchKind::Linear => 0,
            SearchKind::Binary => 1,
        };
        direction | organize << 1 | (self.multi as u32) << 4 | transfer << 5 | search << 6
    }

    /// Unpacks a legacy flag word, rejecting out-of-range field values with
    /// [`Error::BadParam`].
    pub const fn from_bits(bits: u32) -> Result<FindOptions, Error> {
        if bits >> 8 != 0 {
            return Err(Error::BadParam);
        }
        let direction = match bits & 0b1 {
            0 => Direction::Forward,
            _ => Direction::Backward,
        };
        let organize = match (bits >> 1) & 0b111 {
            0 => Organize::None,
            1 => Organize::MoveToFront,
            2 => Organize::Transpose,
            3 => Organize::CountBased,
            4 => Organize::Auto,
            _ => return Err(Error::BadParam),
        };
        let multi = (bits >> 4) & 0b1 != 0;
        let transfer = match (bits >> 5) & 0b1 {
            0 => Transfer::Copy,
            _ => Transfer::Move,
        };
        let search = match (bits >> 6) & 0b11 {
            0 => SearchKind::Linear,
            1 => SearchKind::Binary,
            _ => return Err(Error::BadParam),
        };
        Ok(FindOptions { direction, organize, multi, transfer, search })
    }
}
