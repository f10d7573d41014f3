use json::JsonValue;

use crate::model::skill::{Skill, SkillType, TopPlayerSkills};

use super::{list_entries, parse_choice, parse_counter, ParsingError};

pub fn parse_skill(json: &JsonValue) -> Result<Skill, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let id = obj["id"].as_u64().ok_or(ParsingError::InvalidType("id".into()))?;
        let name = obj["name"].as_str().ok_or(ParsingError::InvalidType("name".into()))?;
        let skill_type = parse_choice::<SkillType>(&obj["skill_type"], "skill_type")?;
        let description = obj["description"].as_str().unwrap_or_default();
        let cooldown = obj["cooldown"]
            .as_u32()
            .ok_or(ParsingError::InvalidType("cooldown".into()))?;
        let total_usage = parse_counter(&obj["total_usage"]).or_else(|| parse_counter(&obj["usage_count"]));

        return Ok(Skill {
            id: id.into(),
            name: name.to_string(),
            skill_type,
            description: description.to_string(),
            cooldown,
            total_usage,
        });
    }

    Err(ParsingError::InvalidType("skill".into()))
}

pub fn parse_skills(json: &JsonValue) -> Result<Vec<Skill>, ParsingError> {
    list_entries(json, "root")?.iter().map(parse_skill).collect()
}

pub fn parse_top_player_skills(json: &JsonValue) -> Result<TopPlayerSkills, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let skills = match &obj["skills"] {
            JsonValue::Array(array) => array.iter().map(parse_skill).collect::<Result<Vec<_>, _>>()?,
            _ => return Err(ParsingError::InvalidType("skills".into())),
        };

        return Ok(TopPlayerSkills {
            top_percent: obj["top_percent"].as_u32().unwrap_or_default(),
            top_user_count: obj["top_user_count"].as_u64().unwrap_or_default(),
            skills,
        });
    }

    Err(ParsingError::InvalidType("root".into()))
}
