//! Tracking-service presence.

use crate::models::TrackPresence;
use serde::{Deserialize, Serialize};

/// One row of tracking state: this manga has an entry on that service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRecord {
    pub manga_id: u64,
    pub service_id: u64,
}

/// Build the [`TrackPresence`] map the filter engine consults.
///
/// A record only counts as present while the user is logged in to its
/// service; records for other services are kept as `false` so that a later
/// login doesn't need a new snapshot to be interpreted.
pub fn presence(records: &[TrackRecord], logged_in: &[u64]) -> TrackPresence {
    let mut map = TrackPresence::new();
    for record in records {
        map.entry(record.manga_id)
            .or_default()
            .insert(record.service_id, logged_in.contains(&record.service_id));
    }
    map
}
