use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub const MIN_AGE: u32 = 19;
pub const MAX_AGE: u32 = 100;
pub const MIN_SEED_MONEY: u64 = 100_000;
pub const MIN_GOAL_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskTolerance {
    #[serde(rename = "안정형")]
    Stable,
    #[default]
    #[serde(rename = "중립형")]
    Neutral,
    #[serde(rename = "공격형")]
    Aggressive,
}

impl RiskTolerance {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stable => "안정형",
            Self::Neutral => "중립형",
            Self::Aggressive => "공격형",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "안정형" | "stable" => Some(Self::Stable),
            "중립형" | "neutral" => Some(Self::Neutral),
            "공격형" | "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

/// Investor profile collected by the survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyForm {
    pub age: u32,
    pub seed_money: u64,
    pub risk_tolerance: RiskTolerance,
    pub goal: String,
}

impl SurveyForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(ApiError::invalid_input("age", "나이는 19~100 사이 숫자로 입력해주세요.").into());
        }
        if self.seed_money < MIN_SEED_MONEY {
            return Err(ApiError::invalid_input(
                "seed_money",
                "투자 가능 금액은 최소 100,000원 이상으로 입력해주세요.",
            )
            .into());
        }
        if self.goal.trim().chars().count() < MIN_GOAL_CHARS {
            return Err(ApiError::invalid_input("goal", "투자 목표를 8자 이상으로 입력해주세요.").into());
        }
        Ok(())
    }

    /// Request body for `POST /generate-portfolio`.
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "age": self.age,
            "seed_money": self.seed_money,
            "risk_tolerance": self.risk_tolerance.label(),
            "goal": self.goal.trim(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub ticker: String,
    pub summary: String,
    /// Integer percentage of the portfolio.
    pub ratio: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub market_analysis: String,
    pub summary_comment: String,
    pub items: Vec<PortfolioItem>,
}

/// Rescales ratios so they sum to exactly 100.
///
/// Each ratio is scaled proportionally and rounded; whatever rounding drift remains is
/// added to the first item. A set that already sums to 100 is returned untouched. When
/// every ratio is zero the 100 points are split evenly instead.
pub fn normalize_ratios(mut items: Vec<PortfolioItem>) -> Vec<PortfolioItem> {
    if items.is_empty() {
        return items;
    }

    for item in &mut items {
        item.ratio = item.ratio.max(0);
    }

    let total: i128 = items.iter().map(|item| i128::from(item.ratio)).sum();
    if total == 100 {
        return items;
    }

    if total == 0 {
        let share = 100 / items.len() as i64;
        for item in &mut items {
            item.ratio = share;
        }
    } else {
        for item in &mut items {
            item.ratio = ((item.ratio as f64 / total as f64) * 100.0).round() as i64;
        }
    }

    let drift = 100 - items.iter().map(|item| item.ratio).sum::<i64>();
    items[0].ratio += drift;
    items
}
