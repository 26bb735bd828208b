mod category;
mod entry;
mod item;
mod library;

pub use self::category::{Category, DisplayMode, LibrarySort, SYSTEM_CATEGORY, SortDirection, SortMode};
pub use self::entry::{LibraryEntry, MangaStatus};
pub use self::item::{BADGE_DISABLED, LibraryItem};
pub use self::library::Library;
use std::collections::{BTreeMap, HashMap};

/// Display-ready items grouped by category ID.
pub type LibraryMap = BTreeMap<u64, Vec<LibraryItem>>;

/// Manga ID → tracking service ID → "has an entry on this (logged-in) service".
pub type TrackPresence = HashMap<u64, HashMap<u64, bool>>;
