use crate::domain::signal::Signal;
use serde::{Deserialize, Serialize};

/// Maximum number of related links kept on one card.
pub const MAX_NEWS_PER_CARD: usize = 3;

pub const DEFAULT_SUMMARY: &str = "요약 정보가 없습니다.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsLink {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfNewsCard {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub signal: Signal,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub news: Vec<NewsLink>,
    /// Only populated by the home feed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sectors: Vec<String>,
}
