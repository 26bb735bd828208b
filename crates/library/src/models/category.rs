//! Categories and their packed display/sort settings.
//!
//! A category's presentation settings are persisted as a single integer of
//! bit-flags:
//!
//! | Bits          | Setting        | Values                                         |
//! |---------------|----------------|------------------------------------------------|
//! | `0b0000_0011` | display mode   | compact grid, comfortable grid, list, cover-only grid |
//! | `0b0011_1100` | sort mode      | see [`SortMode`]; unassigned values are invalid |
//! | `0b0100_0000` | sort direction | set = ascending                                |

use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// ID of the implicit "default" category that holds uncategorised entries.
pub const SYSTEM_CATEGORY: u64 = 0;

const DISPLAY_MASK: u64 = 0b0000_0011;
const SORT_MODE_MASK: u64 = 0b0011_1100;
const DIRECTION_MASK: u64 = 0b0100_0000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_flags")]
    pub flags: u64,
}
fn default_flags() -> u64 {
    LibrarySort::default().flags()
}
impl Category {
    /// A category shown as a compact grid, sorted alphabetically (ascending).
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            order: 0,
            flags: default_flags(),
        }
    }

    /// The implicit category holding uncategorised entries.
    pub fn system() -> Self {
        Self::new(SYSTEM_CATEGORY, "Default").with_order(-1)
    }

    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_CATEGORY
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.flags = (self.flags & !DISPLAY_MASK) | mode.flags();
        self
    }

    pub fn with_sort(mut self, sort: LibrarySort) -> Self {
        self.flags = (self.flags & !(SORT_MODE_MASK | DIRECTION_MASK)) | sort.flags();
        self
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_flags(self.flags)
    }

    /// The sort configured for this category.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidSortMode`] if the flags hold an unassigned sort
    /// mode value.
    pub fn sort(&self) -> Result<LibrarySort> {
        LibrarySort::from_flags(self.flags)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    #[default]
    CompactGrid,
    ComfortableGrid,
    List,
    CoverOnlyGrid,
}
impl DisplayMode {
    pub fn from_flags(flags: u64) -> Self {
        // Two bits, four variants: every value is valid.
        match flags & DISPLAY_MASK {
            0b00 => Self::CompactGrid,
            0b01 => Self::ComfortableGrid,
            0b10 => Self::List,
            _ => Self::CoverOnlyGrid,
        }
    }

    pub fn flags(self) -> u64 {
        match self {
            Self::CompactGrid => 0b00,
            Self::ComfortableGrid => 0b01,
            Self::List => 0b10,
            Self::CoverOnlyGrid => 0b11,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Title, case- and accent-insensitive.
    #[default]
    Alphabetical,
    /// Position in the read history, most recently read first.
    LastRead,
    /// When the manga's details were last refreshed.
    LastUpdate,
    /// Number of unread chapters; manga with nothing left to read always
    /// sort last, whichever the direction.
    UnreadCount,
    TotalChapters,
    /// Position in the "latest chapter upload" ranking.
    LatestChapter,
    /// Position in the "latest chapter fetch" ranking.
    ChapterFetchDate,
    DateAdded,
}
impl SortMode {
    pub const ALL: [Self; 8] = [
        Self::Alphabetical,
        Self::LastRead,
        Self::LastUpdate,
        Self::UnreadCount,
        Self::TotalChapters,
        Self::LatestChapter,
        Self::ChapterFetchDate,
        Self::DateAdded,
    ];

    pub fn from_flags(flags: u64) -> Result<Self> {
        let bits = flags & SORT_MODE_MASK;
        match Self::ALL.into_iter().find(|mode| mode.flags() == bits) {
            Some(mode) => Ok(mode),
            None => exn::bail!(ErrorKind::InvalidSortMode(flags)),
        }
    }

    pub fn flags(self) -> u64 {
        match self {
            Self::Alphabetical => 0b0000_0000,
            Self::LastRead => 0b0000_0100,
            Self::LastUpdate => 0b0000_1000,
            Self::UnreadCount => 0b0000_1100,
            Self::TotalChapters => 0b0001_0000,
            Self::LatestChapter => 0b0001_0100,
            Self::ChapterFetchDate => 0b0001_1000,
            Self::DateAdded => 0b0001_1100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::LastRead => "last read",
            Self::LastUpdate => "last update",
            Self::UnreadCount => "unread count",
            Self::TotalChapters => "total chapters",
            Self::LatestChapter => "latest chapter",
            Self::ChapterFetchDate => "chapter fetch date",
            Self::DateAdded => "date added",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}
impl SortDirection {
    pub fn from_flags(flags: u64) -> Self {
        if flags & DIRECTION_MASK == 0 { Self::Descending } else { Self::Ascending }
    }

    pub fn flags(self) -> u64 {
        match self {
            Self::Ascending => DIRECTION_MASK,
            Self::Descending => 0,
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Ascending
    }
}

/// A category's complete sort setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LibrarySort {
    pub mode: SortMode,
    pub direction: SortDirection,
}
impl LibrarySort {
    pub fn new(mode: SortMode, direction: SortDirection) -> Self {
        Self { mode, direction }
    }

    pub fn from_flags(flags: u64) -> Result<Self> {
        Ok(Self {
            mode: SortMode::from_flags(flags)?,
            direction: SortDirection::from_flags(flags),
        })
    }

    pub fn flags(self) -> u64 {
        self.mode.flags() | self.direction.flags()
    }
}
impl Display for LibrarySort {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let direction = if self.direction.is_ascending() { "ascending" } else { "descending" };
        write!(f, "{} ({direction})", self.mode.as_str())
    }
}
