//! In-memory [`StatsApi`] used by pipeline and view tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        mpsc::{self, Receiver, Sender},
        Mutex,
    },
};

use crate::model::{
    filter::{ItemFilter, SkillFilter},
    ids::{ItemId, SkillId, UserId},
    item::{Item, ItemType, TopPlayerItems},
    skill::{Skill, SkillType, TopPlayerSkills},
    user::{Tier, TierStats, TierSummary, User, UserDetail, UserPage},
};

use super::{ApiError, ApiResult, StatsApi};

pub const FAKE_PAGE_SIZE: usize = 2;

#[derive(Default)]
pub struct FakeStatsApi {
    pub tier_stats: TierStats,
    pub users: Vec<User>,
    pub items: Vec<Item>,
    pub skills: Vec<Skill>,
    pub top_player_items: Vec<Item>,
    pub top_player_skills: Vec<Skill>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
    counts: Mutex<HashMap<&'static str, usize>>,
    gates: Mutex<HashMap<(&'static str, usize), Receiver<()>>>,
}

impl FakeStatsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small but complete data set covering every endpoint
    pub fn populated() -> Self {
        Self {
            tier_stats: TierStats::new(vec![
                (Tier::Bronze, tier_summary(10, 5.0)),
                (Tier::Gold, tier_summary(5, 20.0)),
                (Tier::Grandmaster, tier_summary(1, 90.0)),
            ]),
            users: vec![
                user(1, "Alpha", Tier::Grandmaster, 9000),
                user(2, "Bravo", Tier::Gold, 8000),
                user(3, "Charlie", Tier::Gold, 7000),
                user(4, "Delta", Tier::Bronze, 6000),
                user(5, "Echo", Tier::Bronze, 5000),
            ],
            items: vec![
                item(1, "Flame Sword", ItemType::Weapon, Some(120)),
                item(2, "Iron Plate", ItemType::Armor, Some(80)),
                item(3, "Health Potion", ItemType::Consumable, None),
            ],
            skills: vec![
                skill(1, "Fireball", SkillType::Active, Some(300)),
                skill(2, "Thick Skin", SkillType::Passive, Some(150)),
                skill(3, "Meteor", SkillType::Ultimate, Some(90)),
                skill(4, "Dash", SkillType::Active, Some(60)),
            ],
            top_player_items: (1..=8).map(|i| item(i, &format!("Relic {}", i), ItemType::Accessory, Some(100 - i))).collect(),
            top_player_skills: (1..=3).map(|i| skill(i, &format!("Art {}", i), SkillType::Active, Some(50 - i))).collect(),
            ..Self::default()
        }
    }

    /// Every call to `endpoint` (the trait method name) answers with a server error
    pub fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing.insert(endpoint);
        self
    }

    /// Holds the `nth` call (0-based) to `endpoint` until the returned sender fires or is dropped
    pub fn hold_call(self, endpoint: &'static str, nth: usize) -> (Self, Sender<()>) {
        let (release, gate) = mpsc::channel();
        if let Ok(mut gates) = self.gates.lock() {
            gates.insert((endpoint, nth), gate);
        }
        (self, release)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, endpoint: &'static str, call: String) -> ApiResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        let nth = match self.counts.lock() {
            Ok(mut counts) => {
                let count = counts.entry(endpoint).or_insert(0);
                *count += 1;
                *count - 1
            }
            Err(_) => 0,
        };
        let gate = self.gates.lock().ok().and_then(|mut gates| gates.remove(&(endpoint, nth)));
        if let Some(gate) = gate {
            gate.recv().ok();
        }
        if self.failing.contains(endpoint) {
            return Err(ApiError::Server {
                status: 500,
                body: format!("{} unavailable", endpoint),
            });
        }
        Ok(())
    }
}

impl StatsApi for FakeStatsApi {
    fn top_rankers(&self, limit: u32, tier: Option<Tier>) -> ApiResult<Vec<User>> {
        self.record("top_rankers", format!("top_rankers limit={} tier={:?}", limit, tier))?;
        let mut users: Vec<_> = self
            .users
            .iter()
            .filter(|u| tier.map_or(true, |t| u.tier == t))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.ranking_score.cmp(&a.ranking_score));
        users.truncate(limit as usize);
        Ok(users)
    }

    fn tier_stats(&self) -> ApiResult<TierStats> {
        self.record("tier_stats", "tier_stats".to_string())?;
        Ok(self.tier_stats.clone())
    }

    fn popular_items(&self, filter: &ItemFilter) -> ApiResult<Vec<Item>> {
        self.record("popular_items", format!("popular_items {:?}", filter))?;
        Ok(self
            .items
            .iter()
            .filter(|i| filter.kind.map_or(true, |k| i.item_type == k))
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    fn popular_skills(&self, filter: &SkillFilter) -> ApiResult<Vec<Skill>> {
        self.record("popular_skills", format!("popular_skills {:?}", filter))?;
        Ok(self
            .skills
            .iter()
            .filter(|s| filter.kind.map_or(true, |k| s.skill_type == k))
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    fn top_player_items(&self, top_percent: u32) -> ApiResult<TopPlayerItems> {
        self.record("top_player_items", format!("top_player_items {}", top_percent))?;
        Ok(TopPlayerItems {
            top_percent,
            top_user_count: 1,
            items: self.top_player_items.clone(),
        })
    }

    fn top_player_skills(&self, top_percent: u32) -> ApiResult<TopPlayerSkills> {
        self.record("top_player_skills", format!("top_player_skills {}", top_percent))?;
        Ok(TopPlayerSkills {
            top_percent,
            top_user_count: 1,
            skills: self.top_player_skills.clone(),
        })
    }

    fn users(&self, page: u32) -> ApiResult<UserPage> {
        self.record("users", format!("users page={}", page))?;
        let start = (page.max(1) as usize - 1) * FAKE_PAGE_SIZE;
        let results: Vec<_> = self.users.iter().skip(start).take(FAKE_PAGE_SIZE).cloned().collect();
        let has_next = start + FAKE_PAGE_SIZE < self.users.len();
        Ok(UserPage {
            count: self.users.len() as u64,
            next: has_next.then(|| format!("/users/?page={}", page + 1)),
            previous: (page > 1).then(|| format!("/users/?page={}", page - 1)),
            results,
        })
    }

    fn user_detail(&self, id: UserId) -> ApiResult<UserDetail> {
        self.record("user_detail", format!("user_detail {}", id))?;
        let user = self.users.iter().find(|u| u.id == id).ok_or(ApiError::Server {
            status: 404,
            body: "Not found.".to_string(),
        })?;
        Ok(UserDetail {
            id: user.id,
            nickname: user.nickname.clone(),
            tier: user.tier,
            level: user.level,
            ranking_score: user.ranking_score,
            created_at: None,
            stats: None,
        })
    }

    fn items(&self) -> ApiResult<Vec<Item>> {
        self.record("items", "items".to_string())?;
        Ok(self.items.clone())
    }

    fn skills(&self) -> ApiResult<Vec<Skill>> {
        self.record("skills", "skills".to_string())?;
        Ok(self.skills.clone())
    }
}

pub fn tier_summary(count: u64, avg_level: f64) -> TierSummary {
    TierSummary {
        count,
        avg_level,
        avg_ranking_score: None,
    }
}

pub fn user(id: u64, nickname: &str, tier: Tier, ranking_score: i64) -> User {
    User {
        id: UserId(id),
        nickname: nickname.to_string(),
        tier,
        level: 30,
        ranking_score,
        win_rate: 50.0,
        created_at: None,
    }
}

pub fn item(id: u64, name: &str, item_type: ItemType, total_usage: Option<u64>) -> Item {
    Item {
        id: ItemId(id),
        name: name.to_string(),
        item_type,
        description: String::new(),
        price: 100,
        total_usage,
    }
}

pub fn skill(id: u64, name: &str, skill_type: SkillType, total_usage: Option<u64>) -> Skill {
    Skill {
        id: SkillId(id),
        name: name.to_string(),
        skill_type,
        description: String::new(),
        cooldown: if skill_type == SkillType::Passive { 0 } else { 10 },
        total_usage,
    }
}
