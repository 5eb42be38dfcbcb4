// Stats pipeline: reduce events, derive rate stats, rank leaders.

pub mod leaderboard;
pub mod metrics;
pub mod reducer;

use crate::events::RawEvent;
use metrics::PlayerLine;

/// Reduce `events` and compute a [`PlayerLine`] per participant.
pub fn lines_from_events(events: &[RawEvent]) -> Vec<PlayerLine> {
    let reduced = reducer::reduce_events(events);
    metrics::compute_lines(&reduced)
}
