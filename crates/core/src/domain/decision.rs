use crate::domain::signal::Signal;
use serde::{Deserialize, Serialize};

pub const MAX_KEY_EVENTS: usize = 2;
pub const MAX_RISK_CONDITIONS: usize = 3;

pub const DEFAULT_CONCLUSION: &str = "결론 정보가 없습니다.";
pub const DEFAULT_CAUSAL_SUMMARY: &str = "인과 요약 정보가 없습니다.";
pub const DEFAULT_MARKET_REACTION: &str = "시장 반응 정보 없음";
pub const DEFAULT_EVENT_SOURCE: &str = "출처 미상";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEvent {
    pub event: String,
    pub market_reaction: String,
    pub published_at: String,
    pub source: String,
    pub source_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionCard {
    pub ticker: String,
    pub signal: Signal,
    /// `None` when the wire value was missing or not a finite number.
    pub confidence: Option<f64>,
    pub conclusion: String,
    pub causal_summary: String,
    pub key_events: Vec<DecisionEvent>,
    pub risk_invalidation_conditions: Vec<String>,
}

impl DecisionCard {
    /// Display value: an unparseable confidence reads as zero.
    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }
}
