use json::JsonValue;

use crate::model::item::{Item, ItemType, TopPlayerItems};

use super::{list_entries, parse_choice, parse_counter, ParsingError};

pub fn parse_item(json: &JsonValue) -> Result<Item, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let id = obj["id"].as_u64().ok_or(ParsingError::InvalidType("id".into()))?;
        let name = obj["name"].as_str().ok_or(ParsingError::InvalidType("name".into()))?;
        let item_type = parse_choice::<ItemType>(&obj["item_type"], "item_type")?;
        let description = obj["description"].as_str().unwrap_or_default();
        let price = obj["price"].as_i64().ok_or(ParsingError::InvalidType("price".into()))?;
        // Top player aggregates call the counter `usage_count`
        let total_usage = parse_counter(&obj["total_usage"]).or_else(|| parse_counter(&obj["usage_count"]));

        return Ok(Item {
            id: id.into(),
            name: name.to_string(),
            item_type,
            description: description.to_string(),
            price,
            total_usage,
        });
    }

    Err(ParsingError::InvalidType("item".into()))
}

/// Parses a bare array as well as a paginated list response
pub fn parse_items(json: &JsonValue) -> Result<Vec<Item>, ParsingError> {
    list_entries(json, "root")?.iter().map(parse_item).collect()
}

pub fn parse_top_player_items(json: &JsonValue) -> Result<TopPlayerItems, ParsingError> {
    if let JsonValue::Object(obj) = json {
        let items = match &obj["items"] {
            JsonValue::Array(array) => array.iter().map(parse_item).collect::<Result<Vec<_>, _>>()?,
            _ => return Err(ParsingError::InvalidType("items".into())),
        };

        return Ok(TopPlayerItems {
            top_percent: obj["top_percent"].as_u32().unwrap_or_default(),
            top_user_count: obj["top_user_count"].as_u64().unwrap_or_default(),
            items,
        });
    }

    Err(ParsingError::InvalidType("root".into()))
}
