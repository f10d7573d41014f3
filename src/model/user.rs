use chrono::{DateTime, Utc};

use super::{choice::Choice, ids::UserId, item::Item, skill::Skill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl Choice for Tier {
    const VARIANTS: &'static [Self] = &[
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
    ];

    fn code(&self) -> &'static str {
        match self {
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    pub tier: Tier,
    pub level: u32,
    pub ranking_score: i64,
    /// Percentage between 0 and 100
    pub win_rate: f64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TierSummary {
    pub count: u64,
    pub avg_level: f64,
    pub avg_ranking_score: Option<f64>,
}

/// Per-tier aggregates, kept in tier order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TierStats {
    entries: Vec<(Tier, TierSummary)>,
}

impl TierStats {
    pub fn new(mut entries: Vec<(Tier, TierSummary)>) -> Self {
        entries.sort_by_key(|(tier, _)| *tier);
        entries.dedup_by_key(|(tier, _)| *tier);
        Self { entries }
    }

    pub fn get(&self, tier: Tier) -> Option<&TierSummary> {
        self.entries.iter().find(|(t, _)| *t == tier).map(|(_, summary)| summary)
    }

    /// Number of users in `tier`, zero if the server did not report it
    pub fn count(&self, tier: Tier) -> u64 {
        self.get(tier).map_or(0, |s| s.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Tier, TierSummary)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One page of the user list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<User>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDetail {
    pub id: UserId,
    pub nickname: String,
    pub tier: Tier,
    pub level: u32,
    pub ranking_score: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub stats: Option<PlayerStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
    /// Minutes
    pub play_time: u64,
    pub item_usages: Vec<ItemUsage>,
    pub skill_usages: Vec<SkillUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemUsage {
    pub item: Item,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillUsage {
    pub skill: Skill,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(count: u64) -> TierSummary {
        TierSummary {
            count,
            avg_level: 1.0,
            avg_ranking_score: None,
        }
    }

    #[test]
    fn tier_stats_are_kept_in_tier_order() {
        let stats = TierStats::new(vec![
            (Tier::Gold, summary(5)),
            (Tier::Bronze, summary(10)),
            (Tier::Grandmaster, summary(1)),
        ]);

        let tiers: Vec<_> = stats.iter().map(|(t, _)| *t).collect();
        assert_eq!(tiers, vec![Tier::Bronze, Tier::Gold, Tier::Grandmaster]);
    }

    #[test]
    fn absent_tier_counts_as_zero() {
        let stats = TierStats::new(vec![(Tier::Gold, summary(5))]);
        assert_eq!(stats.count(Tier::Gold), 5);
        assert_eq!(stats.count(Tier::Diamond), 0);
    }

    #[test]
    fn tiers_are_ordinal() {
        assert!(Tier::Bronze < Tier::Silver);
        assert!(Tier::Master < Tier::Grandmaster);
        assert_eq!(Tier::from_code("PLATINUM"), Some(Tier::Platinum));
        assert_eq!(Tier::from_code("platinum"), None);
    }
}
