pub mod inverted;
pub mod missing;
pub mod totals;
pub mod reindex;
