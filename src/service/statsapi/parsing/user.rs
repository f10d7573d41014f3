use json::JsonValue;

use crate::model::{
    user::{ItemUsage, PlayerStats, SkillUsage, Tier, TierStats, TierSummary, User, UserDetail, UserPage},
    choice::Choice,
};

use super::{item::parse_item, list_entries, parse_choice, parse_counter, parse_timestamp, skill::parse_skill, ParsingError};

pub fn parse_user(json: &JsonValue) -> Result<User, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let id = obj["id"].as_u64().ok_or(ParsingError::InvalidType("id".into()))?;
        let nickname = obj["nickname"]
            .as_str()
            .ok_or(ParsingError::InvalidType("nickname".into()))?;
        let tier = parse_choice::<Tier>(&obj["tier"], "tier")?;
        let level = obj["level"].as_u32().ok_or(ParsingError::InvalidType("level".into()))?;
        let ranking_score = obj["ranking_score"]
            .as_i64()
            .ok_or(ParsingError::InvalidType("ranking_score".into()))?;
        let win_rate = obj["win_rate"]
            .as_f64()
            .ok_or(ParsingError::InvalidType("win_rate".into()))?;
        let created_at = parse_timestamp(&obj["created_at"], "created_at")?;

        return Ok(User {
            id: id.into(),
            nickname: nickname.to_string(),
            tier,
            level,
            ranking_score,
            win_rate,
            created_at,
        });
    }

    Err(ParsingError::InvalidType("user".into()))
}

pub fn parse_users(json: &JsonValue) -> Result<Vec<User>, ParsingError> {
    if let JsonValue::Array(array) = json {
        return array.iter().map(parse_user).collect();
    }

    Err(ParsingError::InvalidType("root".into()))
}

pub fn parse_user_page(json: &JsonValue) -> Result<UserPage, ParsingError> {
    let results = list_entries(json, "root")?
        .iter()
        .map(parse_user)
        .collect::<Result<Vec<_>, _>>()?;

    match json {
        JsonValue::Object(obj) => Ok(UserPage {
            count: obj["count"].as_u64().unwrap_or(results.len() as u64),
            next: obj["next"].as_str().map(|s| s.to_string()),
            previous: obj["previous"].as_str().map(|s| s.to_string()),
            results,
        }),
        _ => Ok(UserPage {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }),
    }
}

pub fn parse_tier_stats(json: &JsonValue) -> Result<TierStats, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let mut entries = Vec::new();

        for (code, entry) in obj.iter() {
            let tier = Tier::from_code(code).ok_or(ParsingError::UnknownVariant("tier".into(), code.into()))?;
            if let JsonValue::Object(entry_obj) = entry {
                let count = entry_obj["count"]
                    .as_u64()
                    .ok_or(ParsingError::InvalidType(format!("{}.count", code)))?;
                let avg_level = entry_obj["avg_level"]
                    .as_f64()
                    .ok_or(ParsingError::InvalidType(format!("{}.avg_level", code)))?;
                let avg_ranking_score = entry_obj["avg_ranking_score"].as_f64();

                entries.push((
                    tier,
                    TierSummary {
                        count,
                        avg_level,
                        avg_ranking_score,
                    },
                ));
            } else {
                return Err(ParsingError::InvalidType(format!("{} entry", code)));
            }
        }

        return Ok(TierStats::new(entries));
    }

    Err(ParsingError::InvalidType("root".into()))
}

pub fn parse_user_detail(json: &JsonValue) -> Result<UserDetail, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let id = obj["id"].as_u64().ok_or(ParsingError::InvalidType("id".into()))?;
        let nickname = obj["nickname"]
            .as_str()
            .ok_or(ParsingError::InvalidType("nickname".into()))?;
        let tier = parse_choice::<Tier>(&obj["tier"], "tier")?;
        let level = obj["level"].as_u32().ok_or(ParsingError::InvalidType("level".into()))?;
        let ranking_score = obj["ranking_score"]
            .as_i64()
            .ok_or(ParsingError::InvalidType("ranking_score".into()))?;
        let created_at = parse_timestamp(&obj["created_at"], "created_at")?;
        let stats = match &obj["stats"] {
            JsonValue::Null => None,
            stats => Some(parse_player_stats(stats)?),
        };

        return Ok(UserDetail {
            id: id.into(),
            nickname: nickname.to_string(),
            tier,
            level,
            ranking_score,
            created_at,
            stats,
        });
    }

    Err(ParsingError::InvalidType("root".into()))
}

fn parse_player_stats(json: &JsonValue) -> Result<PlayerStats, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let total_games = obj["total_games"]
            .as_u64()
            .ok_or(ParsingError::InvalidType("stats.total_games".into()))?;
        let wins = obj["wins"].as_u64().ok_or(ParsingError::InvalidType("stats.wins".into()))?;
        let losses = obj["losses"]
            .as_u64()
            .ok_or(ParsingError::InvalidType("stats.losses".into()))?;
        let win_rate = obj["win_rate"]
            .as_f64()
            .ok_or(ParsingError::InvalidType("stats.win_rate".into()))?;
        let play_time = obj["play_time"]
            .as_u64()
            .ok_or(ParsingError::InvalidType("stats.play_time".into()))?;

        let mut item_usages = Vec::new();
        for usage in obj["item_usages"].members() {
            item_usages.push(ItemUsage {
                item: parse_item(&usage["item"])?,
                usage_count: parse_counter(&usage["usage_count"])
                    .ok_or(ParsingError::InvalidType("item_usages.usage_count".into()))?,
                last_used: parse_timestamp(&usage["last_used"], "item_usages.last_used")?,
            });
        }

        let mut skill_usages = Vec::new();
        for usage in obj["skill_usages"].members() {
            skill_usages.push(SkillUsage {
                skill: parse_skill(&usage["skill"])?,
                usage_count: parse_counter(&usage["usage_count"])
                    .ok_or(ParsingError::InvalidType("skill_usages.usage_count".into()))?,
                last_used: parse_timestamp(&usage["last_used"], "skill_usages.last_used")?,
            });
        }

        return Ok(PlayerStats {
            total_games,
            wins,
            losses,
            win_rate,
            play_time,
            item_usages,
            skill_usages,
        });
    }

    Err(ParsingError::InvalidType("stats".into()))
}
