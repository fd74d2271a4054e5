//! Counting, pivoting and significance testing.

pub mod aggregator;
pub mod stats;

pub use aggregator::{pivot, value_counts, AggregateError, PivotTable};
pub use stats::{stat_test, StatsError};
