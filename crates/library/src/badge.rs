//! Badge annotation: the first stage of a pass.

use crate::Context;
use crate::models::{BADGE_DISABLED, LibraryItem, LibraryMap};
use shelf_config::BadgePreferences;
use tracing::instrument;

/// Compute every item's badges, or store their "disabled" sentinel.
///
/// Returns a new map with the same categories and order; only the badge
/// fields differ. Collaborators are only asked about badges that are
/// switched on.
#[instrument(level = "trace", skip_all, fields(badges = ?badges))]
pub fn annotate(map: LibraryMap, badges: &BadgePreferences, ctx: &Context) -> LibraryMap {
    map.into_iter()
        .map(|(category, items)| {
            let items = items.into_iter().map(|item| annotate_item(item, badges, ctx)).collect();
            (category, items)
        })
        .collect()
}

fn annotate_item(item: LibraryItem, badges: &BadgePreferences, ctx: &Context) -> LibraryItem {
    let entry = &item.entry;
    let download_count = match badges.download {
        true => saturating_i64(ctx.downloads.download_count(entry)),
        false => BADGE_DISABLED,
    };
    let unread_count = match badges.unread {
        true => saturating_i64(entry.unread_count),
        false => BADGE_DISABLED,
    };
    let is_local = badges.local && ctx.classifier.is_local(entry);
    let source_language = match badges.language {
        true => ctx.registry.language(entry.source).map(|lang| lang.to_uppercase()).unwrap_or_default(),
        false => String::new(),
    };
    LibraryItem {
        download_count,
        unread_count,
        is_local,
        source_language,
        ..item
    }
}

fn saturating_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
