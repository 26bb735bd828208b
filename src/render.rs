//! Plain-text rendering of a published library.

use shelf_config::DisplayPreferences;
use shelf_library::Library;
use shelf_library::models::{BADGE_DISABLED, LibraryItem};
use shelf_library::projection::{category_counts, toolbar_title};
use std::io::{Result, Write};

pub const DEFAULT_TITLE: &str = "Library";
pub const DEFAULT_CATEGORY_TITLE: &str = "Default";

/// Write every visible category and its items.
///
/// With category tabs the toolbar title is written once and each category
/// gets a tab heading; without tabs each category is headed by its own
/// toolbar title.
pub fn write_library(w: &mut impl Write, library: &Library, display: &DisplayPreferences) -> Result<()> {
    if library.categories.is_empty() {
        return writeln!(w, "{}", toolbar_title(library, 0, display, DEFAULT_TITLE, DEFAULT_CATEGORY_TITLE));
    }
    let counts = category_counts(&library.items);
    if display.category_tabs {
        writeln!(w, "{}", toolbar_title(library, 0, display, DEFAULT_TITLE, DEFAULT_CATEGORY_TITLE))?;
    }
    for (page, category) in library.categories.iter().enumerate() {
        if display.category_tabs {
            let name = if category.is_system() { DEFAULT_CATEGORY_TITLE } else { category.name.as_str() };
            match counts.get(&category.id).filter(|_| display.manga_count) {
                Some(count) => writeln!(w, "== {name} ({count}) ==")?,
                None => writeln!(w, "== {name} ==")?,
            }
        } else {
            writeln!(w, "{}", toolbar_title(library, page, display, DEFAULT_TITLE, DEFAULT_CATEGORY_TITLE))?;
        }
        for item in library.items(category.id) {
            writeln!(w, "  {}", item_line(item))?;
        }
    }
    Ok(())
}

/// An item's title followed by its enabled badges.
pub fn item_line(item: &LibraryItem) -> String {
    let mut line = item.title().to_string();
    if item.download_count != BADGE_DISABLED {
        line.push_str(&format!(" [{} downloaded]", item.download_count));
    }
    if item.unread_count != BADGE_DISABLED {
        line.push_str(&format!(" [{} unread]", item.unread_count));
    }
    if item.is_local {
        line.push_str(" [local]");
    }
    if !item.source_language.is_empty() {
        line.push_str(&format!(" [{}]", item.source_language));
    }
    line
}
