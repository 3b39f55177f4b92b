//! Temporal bucketing and aggregation over a [`TripTable`](crate::table::TripTable).
//!
//! Every query is computed fresh from the table and returns a named,
//! key-ordered [`Series`]. Buckets with no trips are absent rather than zero.

pub mod query;
pub mod series;
pub mod step;

pub use series::{BucketKey, Series};
pub use step::HourStep;
