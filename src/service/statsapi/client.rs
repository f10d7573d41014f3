use std::{fmt, time::Duration};

use json::JsonValue;
use log::{debug, warn};
use reqwest::{
    blocking::Client,
    header::{self, HeaderMap, HeaderValue},
    Url,
};

use crate::model::{
    choice::Choice,
    filter::{ItemFilter, SkillFilter},
    ids::UserId,
    item::{Item, TopPlayerItems},
    skill::{Skill, TopPlayerSkills},
    user::{Tier, TierStats, User, UserDetail, UserPage},
};

use super::{
    parsing::{
        item::{parse_items, parse_top_player_items},
        skill::{parse_skills, parse_top_player_skills},
        user::{parse_tier_stats, parse_user_detail, parse_user_page, parse_users},
    },
    query::QueryString,
    ApiError, ApiResult, StatsApi,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Blocking HTTP implementation of [`StatsApi`]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiClientInitError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiClientInitError::InvalidBaseUrl(base_url.to_string(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiClientInitError::InvalidBaseUrl(
                base_url.to_string(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().timeout(timeout).default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &QueryString) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query.encode())
        }
    }

    fn get_json(&self, path: &str, query: &QueryString) -> ApiResult<JsonValue> {
        let url = self.url(path, query);
        debug!("GET {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!("GET {} returned {}: {}", url, status, body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        json::parse(&text).map_err(|e| {
            warn!("GET {} returned malformed JSON: {}", url, e);
            ApiError::from(e)
        })
    }

    /// Fetches and decodes, logging decode failures with the request path
    fn fetch<T, P>(&self, path: &str, query: QueryString, parse: P) -> ApiResult<T>
    where
        P: FnOnce(&JsonValue) -> Result<T, super::parsing::ParsingError>,
    {
        let json = self.get_json(path, &query)?;
        parse(&json).map_err(|e| {
            warn!("Unexpected response shape from {}: {}", path, e);
            ApiError::from(e)
        })
    }
}

impl StatsApi for ApiClient {
    fn top_rankers(&self, limit: u32, tier: Option<Tier>) -> ApiResult<Vec<User>> {
        let query = QueryString::new()
            .with("limit", limit)
            .with_opt("tier", tier.map(|t| t.code()));
        self.fetch("/users/top_rankers/", query, parse_users)
    }

    fn tier_stats(&self) -> ApiResult<TierStats> {
        self.fetch("/users/tier_stats/", QueryString::new(), parse_tier_stats)
    }

    fn popular_items(&self, filter: &ItemFilter) -> ApiResult<Vec<Item>> {
        let query = QueryString::new()
            .with_opt("type", filter.kind.map(|k| k.code()))
            .with_opt("tier", filter.tier.map(|t| t.code()))
            .with("limit", filter.limit);
        self.fetch("/items/popular_items/", query, parse_items)
    }

    fn popular_skills(&self, filter: &SkillFilter) -> ApiResult<Vec<Skill>> {
        let query = QueryString::new()
            .with_opt("type", filter.kind.map(|k| k.code()))
            .with_opt("tier", filter.tier.map(|t| t.code()))
            .with("limit", filter.limit);
        self.fetch("/skills/popular_skills/", query, parse_skills)
    }

    fn top_player_items(&self, top_percent: u32) -> ApiResult<TopPlayerItems> {
        let query = QueryString::new().with("top_percent", top_percent);
        self.fetch("/stats/top_players_items/", query, parse_top_player_items)
    }

    fn top_player_skills(&self, top_percent: u32) -> ApiResult<TopPlayerSkills> {
        let query = QueryString::new().with("top_percent", top_percent);
        self.fetch("/stats/top_players_skills/", query, parse_top_player_skills)
    }

    fn users(&self, page: u32) -> ApiResult<UserPage> {
        let query = QueryString::new().with("page", page.max(1));
        self.fetch("/users/", query, parse_user_page)
    }

    fn user_detail(&self, id: UserId) -> ApiResult<UserDetail> {
        self.fetch(&format!("/users/{}/", id), QueryString::new(), parse_user_detail)
    }

    fn items(&self) -> ApiResult<Vec<Item>> {
        self.fetch("/items/", QueryString::new(), parse_items)
    }

    fn skills(&self) -> ApiResult<Vec<Skill>> {
        self.fetch("/skills/", QueryString::new(), parse_skills)
    }
}

#[derive(Debug)]
pub enum ApiClientInitError {
    InvalidBaseUrl(String, String),
    HttpClientCreation(reqwest::Error),
}

impl fmt::Display for ApiClientInitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiClientInitError::InvalidBaseUrl(url, reason) => write!(f, "Invalid API base URL '{}': {}", url, reason),
            ApiClientInitError::HttpClientCreation(e) => write!(f, "Failed to create HTTP client: {}", e),
        }
    }
}

impl From<reqwest::Error> for ApiClientInitError {
    fn from(error: reqwest::Error) -> Self {
        Self::HttpClientCreation(error)
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{item::ItemType, skill::SkillType};

    fn client_for(server: &ServerGuard) -> ApiClient {
        ApiClient::new(&format!("{}/api/", server.url()), Duration::from_secs(5)).unwrap()
    }

    fn ranker_json(id: u64, score: i64) -> String {
        format!(
            r#"{{"id": {id}, "nickname": "player{id}", "level": 50, "tier": "DIAMOND", "ranking_score": {score}, "win_rate": 55.5}}"#
        )
    }

    #[test]
    fn top_rankers_keeps_server_order() {
        let mut server = Server::new();
        let body = format!(
            "[{}]",
            [9000, 8000, 7000, 6000, 5000]
                .iter()
                .enumerate()
                .map(|(i, score)| ranker_json(i as u64 + 1, *score))
                .collect::<Vec<_>>()
                .join(",")
        );
        let mock = server
            .mock("GET", "/api/users/top_rankers/")
            .match_query(Matcher::Exact("limit=5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        let rankers = client_for(&server).top_rankers(5, None).unwrap();

        mock.assert();
        let scores: Vec<_> = rankers.iter().map(|u| u.ranking_score).collect();
        assert_eq!(scores, vec![9000, 8000, 7000, 6000, 5000]);
    }

    #[test]
    fn top_rankers_sends_tier_when_given() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/users/top_rankers/")
            .match_query(Matcher::Exact("limit=100&tier=GOLD".into()))
            .with_status(200)
            .with_body("[]")
            .create();

        let rankers = client_for(&server).top_rankers(100, Some(Tier::Gold)).unwrap();

        mock.assert();
        assert!(rankers.is_empty());
    }

    #[test]
    fn popular_items_query_omits_missing_tier() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/items/popular_items/")
            .match_query(Matcher::Exact("type=WEAPON&limit=10".into()))
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "Sword", "item_type": "WEAPON", "description": "", "price": 10, "total_usage": 3}]"#)
            .create();

        let filter = ItemFilter {
            kind: Some(ItemType::Weapon),
            tier: None,
            limit: 10,
        };
        let items = client_for(&server).popular_items(&filter).unwrap();

        mock.assert();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_usage, Some(3));
    }

    #[test]
    fn popular_skills_query_with_all_filters() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/skills/popular_skills/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("type".into(), "ULTIMATE".into()),
                Matcher::UrlEncoded("tier".into(), "MASTER".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create();

        let filter = SkillFilter {
            kind: Some(SkillType::Ultimate),
            tier: Some(Tier::Master),
            limit: 20,
        };
        client_for(&server).popular_skills(&filter).unwrap();

        mock.assert();
    }

    #[test]
    fn top_player_endpoints_send_percentile() {
        let mut server = Server::new();
        let items = server
            .mock("GET", "/api/stats/top_players_items/")
            .match_query(Matcher::Exact("top_percent=10".into()))
            .with_status(200)
            .with_body(r#"{"top_percent": 10, "top_user_count": 4, "items": []}"#)
            .create();
        let skills = server
            .mock("GET", "/api/stats/top_players_skills/")
            .match_query(Matcher::Exact("top_percent=5".into()))
            .with_status(200)
            .with_body(r#"{"top_percent": 5, "top_user_count": 2, "skills": []}"#)
            .create();

        let client = client_for(&server);
        assert_eq!(client.top_player_items(10).unwrap().top_user_count, 4);
        assert_eq!(client.top_player_skills(5).unwrap().top_percent, 5);

        items.assert();
        skills.assert();
    }

    #[test]
    fn server_error_carries_status_and_body() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/users/tier_stats/")
            .with_status(503)
            .with_body("maintenance")
            .create();

        let err = client_for(&server).tier_stats().unwrap_err();
        match err {
            ApiError::Server { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn server_error_message_shows_only_the_start_of_the_body() {
        let mut server = Server::new();
        let page = format!("<!DOCTYPE html>\n<title>OperationalError</title>\n{}", "x".repeat(50_000));
        server
            .mock("GET", "/api/users/tier_stats/")
            .with_status(500)
            .with_body(&page)
            .create();

        let err = client_for(&server).tier_stats().unwrap_err();

        assert!(matches!(&err, ApiError::Server { body, .. } if *body == page));
        assert_eq!(err.to_string(), "Server returned error 500: <!DOCTYPE html> ...");
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/users/tier_stats/")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create();
        server.mock("GET", "/api/items/").with_status(200).with_body(r#"{"oops": 1}"#).create();

        let client = client_for(&server);
        assert!(matches!(client.tier_stats(), Err(ApiError::Decode(_))));
        assert!(matches!(client.items(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn unreachable_server_is_a_network_error() {
        // Port 9 (discard) is closed on test machines
        let client = ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        assert!(matches!(client.tier_stats(), Err(ApiError::Network(_))));
    }

    #[test]
    fn user_endpoints() {
        let mut server = Server::new();
        let page = server
            .mock("GET", "/api/users/")
            .match_query(Matcher::Exact("page=2".into()))
            .with_status(200)
            .with_body(format!(r#"{{"count": 1, "next": null, "previous": null, "results": [{}]}}"#, ranker_json(4, 10)))
            .create();
        let detail = server
            .mock("GET", "/api/users/4/")
            .with_status(200)
            .with_body(r#"{"id": 4, "nickname": "player4", "level": 50, "tier": "DIAMOND", "ranking_score": 10, "stats": null}"#)
            .create();

        let client = client_for(&server);
        assert_eq!(client.users(2).unwrap().results[0].id, UserId(4));
        assert_eq!(client.user_detail(UserId(4)).unwrap().stats, None);

        page.assert();
        detail.assert();
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiClientInitError::InvalidBaseUrl(_, _))
        ));
        assert!(matches!(
            ApiClient::new("ftp://example.com/api", Duration::from_secs(1)),
            Err(ApiClientInitError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let client = ApiClient::new("http://localhost:8000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url("/users/top_rankers/", &QueryString::new().with("limit", 5)),
            "http://localhost:8000/api/users/top_rankers/?limit=5"
        );
    }
}
