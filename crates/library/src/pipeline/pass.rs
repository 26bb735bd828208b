//! One run of the three stages, reusing cached upstream outputs.

use crate::badge;
use crate::categories::{group_entries, visible_categories, with_system_category};
use crate::context::Context;
use crate::error::Result;
use crate::filter::Filter;
use crate::models::{Category, Library, LibraryEntry, LibraryMap};
use crate::sort;
use crate::tracks::{self, TrackRecord};
use shelf_config::Preferences;
use std::sync::Arc;
use tracing::instrument;

/// Pass stages in execution order. Invalidating a stage invalidates every
/// later one too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Stage {
    Badges,
    Filter,
    Sort,
}

/// Upstream snapshots a pass works from.
#[derive(Debug, Clone)]
pub(crate) struct Inputs {
    pub entries: Arc<[Arc<LibraryEntry>]>,
    pub categories: Arc<[Category]>,
    pub tracks: Arc<[TrackRecord]>,
}

#[derive(Debug)]
pub(crate) struct Annotated {
    /// Category list including the system category when it is needed.
    categories: Vec<Category>,
    map: LibraryMap,
}

/// Cached stage outputs from the previous pass. The sort stage is never
/// cached: it is the last one, so there is nothing downstream to reuse it.
#[derive(Debug, Default)]
pub(crate) struct Stages {
    badges: Option<Annotated>,
    filtered: Option<LibraryMap>,
}
impl Stages {
    pub fn invalidate(&mut self, from: Stage) {
        if from <= Stage::Badges {
            self.badges = None;
        }
        if from <= Stage::Filter {
            self.filtered = None;
        }
    }

    #[cfg(test)]
    pub fn cached(&self) -> (bool, bool) {
        (self.badges.is_some(), self.filtered.is_some())
    }
}

#[instrument(level = "debug", skip_all, fields(entries = inputs.entries.len()))]
pub(crate) fn run(inputs: &Inputs, stages: &mut Stages, prefs: &Preferences, ctx: &Context) -> Result<Library> {
    let annotated = match stages.badges.take() {
        Some(annotated) => annotated,
        None => {
            let categories = with_system_category(&inputs.categories, &inputs.entries);
            let grouped = group_entries(&inputs.entries, &categories);
            let map = badge::annotate(grouped, &prefs.badges, ctx);
            Annotated { categories, map }
        },
    };
    let annotated = stages.badges.insert(annotated);

    let filtered = match stages.filtered.take() {
        Some(filtered) => filtered,
        None => {
            let logged_in = ctx.trackers.logged_in();
            let presence = tracks::presence(&inputs.tracks, &logged_in);
            Filter::new(prefs, &logged_in).apply(annotated.map.clone(), &presence, ctx)
        },
    };
    let filtered = stages.filtered.insert(filtered);

    let items = sort::apply(&annotated.categories, filtered.clone(), ctx.rankings.as_ref())?;
    let categories = visible_categories(annotated.categories.clone(), &annotated.map);
    Ok(Library { categories, items })
}
