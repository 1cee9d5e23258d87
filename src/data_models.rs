use std::collections::{HashMap, HashSet};
use std::fmt;

use reqwest::Url;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub const FALLBACK_TITLE: &str = "Untitled";
pub const FALLBACK_DESCRIPTION: &str = "";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
}

impl SiteMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> SiteMetadata {
        SiteMetadata {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Scored URLs in the order the backend emitted them.
///
/// A plain `HashMap` would lose that order, and the order is what breaks
/// ties between equal scores, so the table keeps a vector of pairs and
/// checks key uniqueness itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    entries: Vec<(String, f64)>,
    seen: HashSet<String>,
}

impl ScoreTable {
    pub fn new() -> ScoreTable {
        ScoreTable::default()
    }

    /// Appends a scored URL. Rejects a URL already in the table and scores that are not finite.
    pub fn push(&mut self, url: impl Into<String>, score: f64) -> Result<(), SearchError> {
        let url = url.into();
        if !score.is_finite() {
            return Err(SearchError::malformed(format!(
                "score for {url} is not a finite number"
            )));
        }
        if !self.seen.insert(url.clone()) {
            return Err(SearchError::malformed(format!("duplicate url key {url}")));
        }
        self.entries.push((url, score));
        Ok(())
    }

    pub fn try_from_pairs<I, S>(pairs: I) -> Result<ScoreTable, SearchError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = ScoreTable::new();
        for (url, score) in pairs {
            table.push(url, score)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn score(&self, url: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(url, score)| (url.as_str(), *score))
    }

    pub fn into_pairs(self) -> Vec<(String, f64)> {
        self.entries
    }
}

impl Serialize for ScoreTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (url, score) in &self.entries {
            map.serialize_entry(url, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreTableVisitor;

        impl<'de> Visitor<'de> for ScoreTableVisitor {
            type Value = ScoreTable;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map from url to numeric score")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<ScoreTable, M::Error> {
                let mut table = ScoreTable::new();
                while let Some((url, score)) = map.next_entry::<String, f64>()? {
                    table
                        .push(url, score)
                        .map_err(<M::Error as de::Error>::custom)?;
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(ScoreTableVisitor)
    }
}

/// The envelope returned by the search service for one query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub urls: ScoreTable,
    pub metadata: HashMap<String, SiteMetadata>,
    pub elapsed_ms: f64,
    pub total_results: u64,
}

impl SearchResponse {
    pub fn empty() -> SearchResponse {
        SearchResponse {
            urls: ScoreTable::new(),
            metadata: HashMap::new(),
            elapsed_ms: 0.0,
            total_results: 0,
        }
    }

    /// Checks the envelope-level constraints serde cannot express.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.elapsed_ms.is_finite() || self.elapsed_ms < 0.0 {
            return Err(SearchError::malformed(format!(
                "elapsedMs must be a non-negative number, got {}",
                self.elapsed_ms
            )));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RankedResult {
    /// Host part of the url, or the url itself when it cannot be parsed.
    pub fn domain(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| self.url.clone())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<RankedResult>,
    pub total_results: u64,
    pub elapsed_seconds: f64,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[test]
fn test_score_table_keeps_emission_order() {
    let body = r#"{"z.com": 1, "a.com": 2.5, "m.com": -3}"#;
    let table: ScoreTable = serde_json::from_str(body).unwrap();
    let urls: Vec<&str> = table.iter().map(|(u, _)| u).collect();
    assert_eq!(urls, vec!["z.com", "a.com", "m.com"]);
    assert_eq!(table.score("a.com"), Some(2.5));
    assert_eq!(table.score("m.com"), Some(-3.0));
}

#[test]
fn test_score_table_rejects_duplicates() {
    let body = r#"{"a.com": 1, "a.com": 2}"#;
    let err = serde_json::from_str::<ScoreTable>(body).unwrap_err();
    assert!(err.to_string().contains("duplicate url key a.com"));

    let mut table = ScoreTable::new();
    table.push("a.com", 1.0).unwrap();
    assert!(matches!(
        table.push("a.com", 0.5),
        Err(SearchError::MalformedResponse(_))
    ));
    assert!(matches!(
        table.push("b.com", f64::NAN),
        Err(SearchError::MalformedResponse(_))
    ));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_domain_falls_back_to_raw_url() {
    let mut result = RankedResult {
        id: "0".into(),
        url: "https://news.example.com/a/b?c=d".into(),
        title: FALLBACK_TITLE.into(),
        description: FALLBACK_DESCRIPTION.into(),
        rank: 0,
        timestamp: None,
    };
    assert_eq!(result.domain(), "news.example.com");

    result.url = "a.com".into();
    assert_eq!(result.domain(), "a.com");
}
