use serde::{Deserialize, Serialize};

/// Coarse directional classification attached to a ticker or a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    #[default]
    Neutral,
    Bearish,
}

impl Signal {
    /// Loose vocabulary used by the news feed (English synonyms and Korean labels).
    pub fn from_news_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "bullish" | "buy" | "positive" | "상승" => Self::Bullish,
            "bearish" | "sell" | "negative" | "하락" => Self::Bearish,
            _ => Self::Neutral,
        }
    }

    /// Strict vocabulary used by the decision brief and the home feed.
    pub fn from_strict_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "bullish" => Self::Bullish,
            "bearish" => Self::Bearish,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Neutral => "neutral",
            Self::Bearish => "bearish",
        }
    }
}
