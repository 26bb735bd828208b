use crate::TriState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the library pipeline reads from user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Global "downloaded only" mode. When enabled, it overrides
    /// [`FilterPreferences::downloaded`] with [`TriState::Include`].
    pub downloaded_only: bool,
    pub badges: BadgePreferences,
    pub filters: FilterPreferences,
    pub display: DisplayPreferences,
}

/// Which per-item badges are computed. Disabled badges are still present on
/// every item, holding their "disabled" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgePreferences {
    pub download: bool,
    pub unread: bool,
    pub local: bool,
    pub language: bool,
}
impl Default for BadgePreferences {
    fn default() -> Self {
        Self {
            download: false,
            unread: true,
            local: true,
            language: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPreferences {
    pub downloaded: TriState,
    pub unread: TriState,
    pub started: TriState,
    pub completed: TriState,
    /// Per tracking service, keyed by the service ID.
    ///
    /// Keys are strings because every configuration format (and environment
    /// variables) only has string keys; use [`tracking()`](Self::tracking)
    /// to look a service up by its numeric ID.
    pub tracking: BTreeMap<String, TriState>,
}
impl FilterPreferences {
    /// The filter configured for a tracking service, [`TriState::Ignore`] if
    /// the service has never been configured.
    pub fn tracking(&self, service: u64) -> TriState {
        self.tracking.get(&service.to_string()).copied().unwrap_or_default()
    }

    pub fn set_tracking(&mut self, service: u64, state: TriState) {
        self.tracking.insert(service.to_string(), state);
    }
}

/// Presentation toggles used by the toolbar title projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPreferences {
    pub category_tabs: bool,
    pub manga_count: bool,
}
impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            category_tabs: true,
            manga_count: false,
        }
    }
}
