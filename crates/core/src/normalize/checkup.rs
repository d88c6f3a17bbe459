use crate::domain::checkup::{
    BriefingResult, CheckupTicket, JobStatus, JobStatusReport, ReasonResult, RecomposeResult,
    RiskLevel,
};
use crate::normalize::{coerce_number, first_array, first_present, optional_string, string_list, string_or, Row};
use serde_json::Value;

// Inputs here are expected to be camel-cased already; the checkup client does that once
// per response.

/// Some endpoints wrap the resource in `result`/`data`; unwrap one level when they do.
fn resource(payload: &Value) -> Option<&Row> {
    let obj = payload.as_object()?;
    for key in ["result", "data"] {
        if let Some(inner) = obj.get(key).and_then(Value::as_object) {
            return Some(inner);
        }
    }
    Some(obj)
}

pub fn ticket(payload: &Value) -> Option<CheckupTicket> {
    let obj = payload.as_object()?;
    Some(CheckupTicket {
        job_id: optional_string(obj, &["jobId"])?.trim().to_string(),
        checkup_id: optional_string(obj, &["checkupId"]).map(|s| s.trim().to_string()),
    })
}

/// Anything unreadable is reported as still processing.
pub fn job_status(payload: &Value) -> JobStatusReport {
    let Some(obj) = payload.as_object() else {
        return JobStatusReport {
            status: JobStatus::Processing,
            checkup_id: None,
        };
    };
    JobStatusReport {
        status: JobStatus::parse(&string_or(obj, &["status"], "")),
        checkup_id: optional_string(obj, &["checkupId"]).map(|s| s.trim().to_string()),
    }
}

pub fn reason_result(payload: &Value) -> ReasonResult {
    let empty = Row::new();
    let obj = resource(payload).unwrap_or(&empty);
    ReasonResult {
        score: coerce_number(first_present(obj, &["score"]))
            .map(|n| n.clamp(0.0, 100.0).round() as u32)
            .unwrap_or(0),
        risk: RiskLevel::parse(&string_or(obj, &["risk"], "")),
        summary: string_or(obj, &["summary"], ""),
        strengths: string_list(first_array(obj, &["strengths"]), usize::MAX),
        blind_spots: string_list(first_array(obj, &["blindSpots"]), usize::MAX),
        recommendation: string_or(obj, &["recommendation"], ""),
    }
}

pub fn recompose_result(payload: &Value) -> RecomposeResult {
    let empty = Row::new();
    let obj = resource(payload).unwrap_or(&empty);
    RecomposeResult {
        reframed_summary: string_or(obj, &["reframedSummary"], ""),
        next_steps: string_list(first_array(obj, &["nextSteps"]), usize::MAX),
    }
}

pub fn briefing_result(payload: &Value) -> BriefingResult {
    let empty = Row::new();
    let obj = resource(payload).unwrap_or(&empty);
    BriefingResult {
        headline: string_or(obj, &["headline"], ""),
        talking_points: string_list(first_array(obj, &["talkingPoints"]), usize::MAX),
        caveat: string_or(obj, &["caveat"], ""),
    }
}
