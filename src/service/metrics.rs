//! Values derived from committed snapshots. Everything here is pure and recomputed at render time.

use itertools::Itertools;

use crate::model::{
    choice::Choice,
    skill::{Skill, SkillType},
    user::{Tier, TierStats, User},
    UsageEntry,
};

/// Entries shown in the top-player panels
pub const TOP_PREFERRED_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct TierSlice {
    pub tier: Tier,
    pub count: u64,
    /// Fraction of all users, 0 when there are none
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_users: u64,
    /// Level averaged over all users, `None` without users
    pub avg_level: Option<f64>,
    pub top_tier_users: u64,
    pub slices: Vec<TierSlice>,
}

pub fn summarize_tiers(stats: &TierStats) -> DashboardSummary {
    let total_users: u64 = stats.iter().map(|(_, s)| s.count).sum();
    let level_sum: f64 = stats.iter().map(|(_, s)| s.avg_level * s.count as f64).sum();
    let avg_level = (total_users > 0).then(|| level_sum / total_users as f64);

    let slices = stats
        .iter()
        .map(|(tier, s)| TierSlice {
            tier: *tier,
            count: s.count,
            share: if total_users == 0 {
                0.0
            } else {
                s.count as f64 / total_users as f64
            },
        })
        .collect();

    DashboardSummary {
        total_users,
        avg_level,
        top_tier_users: stats.count(Tier::Grandmaster),
        slices,
    }
}

/// Users matching `tier` (all for `None`) paired with their 1-based rank within the result
pub fn filter_rankers(users: &[User], tier: Option<Tier>) -> Vec<(usize, &User)> {
    users
        .iter()
        .filter(|u| tier.map_or(true, |t| u.tier == t))
        .enumerate()
        .map(|(i, u)| (i + 1, u))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsagePoint {
    pub name: String,
    pub usage_count: u64,
}

/// Chart series of a popularity list, missing counters become 0
pub fn usage_series<T: UsageEntry>(entries: &[T]) -> Vec<UsagePoint> {
    entries
        .iter()
        .map(|e| UsagePoint {
            name: e.name().to_string(),
            usage_count: e.total_usage().unwrap_or(0),
        })
        .collect()
}

pub fn top_preferred<T>(entries: &[T]) -> &[T] {
    &entries[..entries.len().min(TOP_PREFERRED_COUNT)]
}

/// Number of skills per type, every type listed even when absent
pub fn type_distribution(skills: &[Skill]) -> Vec<(SkillType, usize)> {
    let counts = skills.iter().counts_by(|s| s.skill_type);
    SkillType::VARIANTS
        .iter()
        .map(|t| (*t, counts.get(t).copied().unwrap_or(0)))
        .collect()
}
