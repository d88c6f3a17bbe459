use crate::domain::news::EtfNewsCard;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SECTOR: &str = "기타";
pub const HOME_CARD_NAME: &str = "ETF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeedNewsLink {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeedSectorCard {
    pub sector: String,
    pub etf_count: u32,
    pub hot_news: Vec<HomeFeedNewsLink>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub sector_cards: Vec<HomeFeedSectorCard>,
    pub etf_cards: Vec<EtfNewsCard>,
}
