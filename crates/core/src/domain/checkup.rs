use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub const MAX_HORIZON_WEEKS: u32 = 24;

/// What the user submits to start a checkup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckupInput {
    pub goal: String,
    pub concern: String,
    pub horizon_weeks: u32,
}

impl CheckupInput {
    pub fn new(goal: &str, concern: &str, horizon_weeks: u32) -> Self {
        Self {
            goal: goal.trim().to_string(),
            concern: concern.trim().to_string(),
            horizon_weeks,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.goal.trim().chars().count() <= 3 {
            return Err(ApiError::invalid_input("goal", "goal must be longer than 3 characters").into());
        }
        if self.concern.trim().chars().count() <= 5 {
            return Err(
                ApiError::invalid_input("concern", "concern must be longer than 5 characters").into(),
            );
        }
        if !(1..=MAX_HORIZON_WEEKS).contains(&self.horizon_weeks) {
            return Err(ApiError::invalid_input("horizon_weeks", "horizon must be 1..=24 weeks").into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Unknown labels read as still processing.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Processing,
        }
    }
}

/// Returned when a checkup is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckupTicket {
    pub job_id: String,
    pub checkup_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub status: JobStatus,
    pub checkup_id: Option<String>,
}

/// Addresses a checkup either directly or through the job that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckupRef {
    pub job_id: Option<String>,
    pub checkup_id: Option<String>,
}

impl CheckupRef {
    pub fn job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            checkup_id: None,
        }
    }

    pub fn checkup(checkup_id: impl Into<String>) -> Self {
        Self {
            job_id: None,
            checkup_id: Some(checkup_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonResult {
    pub score: u32,
    pub risk: RiskLevel,
    pub summary: String,
    pub strengths: Vec<String>,
    pub blind_spots: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Balanced,
    Optimistic,
    Conservative,
}

impl Tone {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "balanced" => Some(Self::Balanced),
            "optimistic" => Some(Self::Optimistic),
            "conservative" => Some(Self::Conservative),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Optimistic => "optimistic",
            Self::Conservative => "conservative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomposeInput {
    pub tone: Tone,
    pub focus: String,
    pub job_id: Option<String>,
    pub checkup_id: Option<String>,
}

impl RecomposeInput {
    pub fn target(&self) -> CheckupRef {
        CheckupRef {
            job_id: self.job_id.clone(),
            checkup_id: self.checkup_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomposeResult {
    pub reframed_summary: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingResult {
    pub headline: String,
    pub talking_points: Vec<String>,
    pub caveat: String,
}
