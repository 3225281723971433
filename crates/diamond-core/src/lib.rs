// Library root: the aggregation and derived-metric pipeline for historical
// batting and pitching records, plus the loaders and config that feed it.

pub mod aggregate;
pub mod config;
pub mod era;
pub mod lines;
pub mod loader;
pub mod metrics;
pub mod names;
pub mod ranking;
