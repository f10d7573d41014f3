use super::{choice::Choice, ids::SkillId, UsageEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillType {
    Active,
    Passive,
    Ultimate,
}

impl Choice for SkillType {
    const VARIANTS: &'static [Self] = &[SkillType::Active, SkillType::Passive, SkillType::Ultimate];

    fn code(&self) -> &'static str {
        match self {
            SkillType::Active => "ACTIVE",
            SkillType::Passive => "PASSIVE",
            SkillType::Ultimate => "ULTIMATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub skill_type: SkillType,
    pub description: String,
    /// Seconds, 0 means no cooldown
    pub cooldown: u32,
    pub total_usage: Option<u64>,
}

impl Skill {
    pub fn has_cooldown(&self) -> bool {
        self.cooldown > 0
    }
}

impl UsageEntry for Skill {
    fn name(&self) -> &str {
        &self.name
    }

    fn total_usage(&self) -> Option<u64> {
        self.total_usage
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopPlayerSkills {
    pub top_percent: u32,
    pub top_user_count: u64,
    pub skills: Vec<Skill>,
}
