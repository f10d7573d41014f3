pub mod analysis;
pub mod choice;
pub mod filter;
pub mod ids;
pub mod item;
pub mod skill;
pub mod user;

/// Catalog entries that carry an aggregated usage counter
pub trait UsageEntry {
    fn name(&self) -> &str;

    fn total_usage(&self) -> Option<u64>;
}
