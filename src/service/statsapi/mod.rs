//! Typed access to the game statistics REST API.

use std::fmt;

use crate::model::{
    filter::{ItemFilter, SkillFilter},
    ids::UserId,
    item::{Item, TopPlayerItems},
    skill::{Skill, TopPlayerSkills},
    user::{Tier, TierStats, User, UserDetail, UserPage},
};

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod parsing;
pub mod query;

use parsing::ParsingError;

pub type ApiResult<T> = Result<T, ApiError>;

/// One method per logical query of the stats API. Calls block until the response is decoded.
pub trait StatsApi: Send + Sync {
    /// Users sorted by ranking score, best first
    fn top_rankers(&self, limit: u32, tier: Option<Tier>) -> ApiResult<Vec<User>>;

    fn tier_stats(&self) -> ApiResult<TierStats>;

    fn popular_items(&self, filter: &ItemFilter) -> ApiResult<Vec<Item>>;

    fn popular_skills(&self, filter: &SkillFilter) -> ApiResult<Vec<Skill>>;

    fn top_player_items(&self, top_percent: u32) -> ApiResult<TopPlayerItems>;

    fn top_player_skills(&self, top_percent: u32) -> ApiResult<TopPlayerSkills>;

    /// One page of all users, pages start at 1
    fn users(&self, page: u32) -> ApiResult<UserPage>;

    fn user_detail(&self, id: UserId) -> ApiResult<UserDetail>;

    fn items(&self) -> ApiResult<Vec<Item>>;

    fn skills(&self) -> ApiResult<Vec<Skill>>;
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response
    Network(reqwest::Error),
    /// Non-2xx status
    Server { status: u16, body: String },
    /// Body is not JSON or has an unexpected shape
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Network(err) => write!(f, "Network error: {}", err),
            ApiError::Server { status, body } => match body_excerpt(body) {
                None => write!(f, "Server returned error {}", status),
                Some(excerpt) => write!(f, "Server returned error {}: {}", status, excerpt),
            },
            ApiError::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
        }
    }
}

const BODY_EXCERPT_CHARS: usize = 200;

/// First non-blank line of an error body, cut to [`BODY_EXCERPT_CHARS`]
fn body_excerpt(body: &str) -> Option<String> {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty())?;
    let mut excerpt: String = line.chars().take(BODY_EXCERPT_CHARS).collect();
    if excerpt.len() < line.len() || body.trim().len() > line.len() {
        excerpt.push_str(" ...");
    }
    Some(excerpt)
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error)
    }
}

impl From<json::Error> for ApiError {
    fn from(error: json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<ParsingError> for ApiError {
    fn from(error: ParsingError) -> Self {
        Self::Decode(error.to_string())
    }
}
