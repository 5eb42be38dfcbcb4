// Library root: baseball event ingestion, aggregation, ranking and
// image-signal classification.

pub mod events;
pub mod feed;
pub mod loader;
pub mod stats;
pub mod vision;
