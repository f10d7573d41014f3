//! Raw snapshots committed by the views. Each one is the verbatim result of one fetch set.

use super::{
    item::{Item, TopPlayerItems},
    skill::{Skill, TopPlayerSkills},
    user::{TierStats, User},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub tier_stats: TierStats,
    pub top_rankers: Vec<User>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemAnalysis {
    pub popular: Vec<Item>,
    pub top_players: TopPlayerItems,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillAnalysis {
    pub popular: Vec<Skill>,
    pub top_players: TopPlayerSkills,
}
