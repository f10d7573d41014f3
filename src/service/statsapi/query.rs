//! Query string assembly for the stats endpoints.

use std::fmt::{self, Display};

use crate::model::choice::ALL_LABEL;

/// Ordered list of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter that is always sent
    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends a parameter only if a value is given and it is neither empty nor the `ALL` sentinel
    pub fn with_opt(self, key: &str, value: Option<impl Display>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(v) if !v.is_empty() && v != ALL_LABEL => self.with(key, v),
            _ => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `key=value&key=value` form, without the leading `?`
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Inverse of [`QueryString::encode`]. Empty segments (as in `a=1&&b=2`) are skipped.
    pub fn parse(raw: &str) -> Result<Self, QueryParseError> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut pairs = Vec::new();
        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            let key = urlencoding::decode(key).map_err(|_| QueryParseError::InvalidEncoding(key.to_string()))?;
            let value =
                urlencoding::decode(value).map_err(|_| QueryParseError::InvalidEncoding(value.to_string()))?;
            pairs.push((key.into_owned(), value.into_owned()));
        }
        Ok(Self { pairs })
    }
}

impl Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum QueryParseError {
    InvalidEncoding(String),
}

impl fmt::Display for QueryParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryParseError::InvalidEncoding(segment) => write!(f, "Invalid percent-encoding in: {}", segment),
        }
    }
}
