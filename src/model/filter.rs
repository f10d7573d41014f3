//! View-local filter state. Any change to one of these values triggers a refetch.

use super::{
    choice::{next_filter, previous_filter, Choice},
    item::ItemType,
    skill::SkillType,
    user::Tier,
};

pub const DEFAULT_RANKER_LIMIT: u32 = 100;
pub const DEFAULT_USAGE_LIMIT: u32 = 10;
pub const DEFAULT_TOP_PERCENT: u32 = 10;

pub const RANKER_LIMITS: [u32; 4] = [50, 100, 200, 500];
pub const USAGE_LIMITS: [u32; 3] = [10, 20, 50];

/// Next entry of `options` after `current`, wrapping around. Unknown values restart at the first option.
pub fn next_limit(current: u32, options: &[u32]) -> u32 {
    match options.iter().position(|o| *o == current) {
        Some(pos) => options[(pos + 1) % options.len()],
        None => options.first().copied().unwrap_or(current),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingFilter {
    pub limit: u32,
    pub tier: Option<Tier>,
}

impl Default for RankingFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RANKER_LIMIT,
            tier: None,
        }
    }
}

impl RankingFilter {
    pub fn next_tier(&mut self) {
        self.tier = next_filter(self.tier);
    }

    pub fn previous_tier(&mut self) {
        self.tier = previous_filter(self.tier);
    }

    pub fn next_limit(&mut self) {
        self.limit = next_limit(self.limit, &RANKER_LIMITS);
    }
}

/// Filter of the popular items/skills endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageFilter<K: Choice> {
    pub kind: Option<K>,
    pub tier: Option<Tier>,
    pub limit: u32,
}

impl<K: Choice> Default for UsageFilter<K> {
    fn default() -> Self {
        Self {
            kind: None,
            tier: None,
            limit: DEFAULT_USAGE_LIMIT,
        }
    }
}

impl<K: Choice> UsageFilter<K> {
    pub fn next_kind(&mut self) {
        self.kind = next_filter(self.kind);
    }

    pub fn previous_kind(&mut self) {
        self.kind = previous_filter(self.kind);
    }

    pub fn next_tier(&mut self) {
        self.tier = next_filter(self.tier);
    }

    pub fn previous_tier(&mut self) {
        self.tier = previous_filter(self.tier);
    }

    pub fn next_limit(&mut self) {
        self.limit = next_limit(self.limit, &USAGE_LIMITS);
    }
}

pub type ItemFilter = UsageFilter<ItemType>;
pub type SkillFilter = UsageFilter<SkillType>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_cycle_and_wrap() {
        assert_eq!(next_limit(100, &RANKER_LIMITS), 200);
        assert_eq!(next_limit(500, &RANKER_LIMITS), 50);
        assert_eq!(next_limit(7, &RANKER_LIMITS), 50);
    }

    #[test]
    fn usage_filter_defaults_to_unfiltered_top_ten() {
        let filter = ItemFilter::default();
        assert_eq!(filter.kind, None);
        assert_eq!(filter.tier, None);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn usage_filter_changes_are_observable() {
        let mut filter = SkillFilter::default();
        let before = filter;
        filter.next_kind();
        assert_ne!(filter, before);
        assert_eq!(filter.kind, Some(SkillType::Active));
        filter.previous_kind();
        assert_eq!(filter, before);
    }
}
