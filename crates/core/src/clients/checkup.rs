use crate::clients::ReasonApi;
use crate::domain::checkup::{
    BriefingResult, CheckupInput, CheckupRef, CheckupTicket, JobStatusReport, ReasonResult,
    RecomposeInput, RecomposeResult,
};
use crate::error::ApiError;
use crate::normalize::case::camelize_keys;
use crate::normalize::checkup as shape;
use crate::store::KeyValueStore;
use crate::transport::{ApiRequest, Transport};
use anyhow::Context;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::Arc;

const INPUT_KEY_PREFIX: &str = "checkup:";
const LINK_KEY_PREFIX: &str = "checkup:link:";

pub fn input_key(job_id: &str) -> String {
    format!("{INPUT_KEY_PREFIX}{job_id}")
}

pub fn link_key(job_id: &str) -> String {
    format!("{LINK_KEY_PREFIX}{job_id}")
}

/// An id as a single escaped path segment.
fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id.trim())
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|id| !id.is_empty())
}

/// Checkup lifecycle over `/api/v1`.
///
/// Jobs and checkups are separate resources. The job -> checkup link is learned from
/// status responses and kept in the injected store, because results, recompositions and
/// briefings address the checkup.
pub struct HttpReasonApi {
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
}

impl HttpReasonApi {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { transport, store }
    }

    async fn send(&self, request: ApiRequest) -> anyhow::Result<Value> {
        Ok(camelize_keys(self.transport.send(request).await?))
    }

    fn remember_link(&self, job_id: &str, checkup_id: &str) -> anyhow::Result<()> {
        let key = link_key(job_id);
        if self.store.get(&key)?.as_deref() != Some(checkup_id) {
            self.store.set(&key, checkup_id)?;
            tracing::debug!(job_id, checkup_id, "linked job to checkup");
        }
        Ok(())
    }

    /// The checkup a request addresses: the explicit id, else the cached link for the job,
    /// else whatever a fresh status query reports.
    pub async fn resolve_checkup_id(&self, target: &CheckupRef) -> anyhow::Result<String> {
        if let Some(checkup_id) = non_empty(target.checkup_id.as_deref()) {
            return Ok(checkup_id.to_string());
        }

        let Some(job_id) = non_empty(target.job_id.as_deref()) else {
            return Err(ApiError::MissingCorrelation { job_id: None }.into());
        };

        if let Some(checkup_id) = self.store.get(&link_key(job_id))? {
            tracing::debug!(job_id, %checkup_id, "checkup link cache hit");
            return Ok(checkup_id);
        }

        tracing::debug!(job_id, "checkup link cache miss; querying job status");
        let report = self.get_job_status(job_id).await?;
        report.checkup_id.ok_or_else(|| {
            ApiError::MissingCorrelation {
                job_id: Some(job_id.to_string()),
            }
            .into()
        })
    }
}

#[async_trait::async_trait]
impl ReasonApi for HttpReasonApi {
    async fn submit_checkup(&self, input: &CheckupInput) -> anyhow::Result<CheckupTicket> {
        input.validate()?;

        let body = json!({
            "goal": input.goal.trim(),
            "concern": input.concern.trim(),
            "horizon_weeks": input.horizon_weeks,
        });
        let raw = self
            .send(ApiRequest::post("체크업 생성", "/api/v1/checkups", body))
            .await?;
        let ticket = shape::ticket(&raw).context("checkup response did not include a job_id")?;

        let snapshot = serde_json::to_string(input)?;
        self.store.set(&input_key(&ticket.job_id), &snapshot)?;
        if let Some(checkup_id) = &ticket.checkup_id {
            self.remember_link(&ticket.job_id, checkup_id)?;
        }

        tracing::info!(job_id = %ticket.job_id, checkup_id = ?ticket.checkup_id, "submitted checkup");
        Ok(ticket)
    }

    async fn get_job_status(&self, job_id: &str) -> anyhow::Result<JobStatusReport> {
        let raw = self
            .send(ApiRequest::get(
                "작업 상태 조회",
                format!("/api/v1/jobs/{}", segment(job_id)),
            ))
            .await?;
        let report = shape::job_status(&raw);
        if let Some(checkup_id) = &report.checkup_id {
            self.remember_link(job_id.trim(), checkup_id)?;
        }
        Ok(report)
    }

    async fn get_result(&self, target: &CheckupRef) -> anyhow::Result<ReasonResult> {
        let checkup_id = self.resolve_checkup_id(target).await?;
        let raw = self
            .send(ApiRequest::get(
                "체크업 결과 조회",
                format!("/api/v1/checkups/{}", segment(&checkup_id)),
            ))
            .await?;
        Ok(shape::reason_result(&raw))
    }

    async fn recompose(&self, input: &RecomposeInput) -> anyhow::Result<RecomposeResult> {
        let checkup_id = self.resolve_checkup_id(&input.target()).await?;
        let body = json!({
            "tone": input.tone.as_str(),
            "focus": input.focus.trim(),
        });
        let raw = self
            .send(ApiRequest::post(
                "재구성 생성",
                format!("/api/v1/checkups/{}/recompose", segment(&checkup_id)),
                body,
            ))
            .await?;
        Ok(shape::recompose_result(&raw))
    }

    async fn get_briefing(&self, target: &CheckupRef) -> anyhow::Result<BriefingResult> {
        let checkup_id = self.resolve_checkup_id(target).await?;
        let raw = self
            .send(ApiRequest::post(
                "브리핑 생성",
                format!("/api/v1/checkups/{}/briefings", segment(&checkup_id)),
                json!({}),
            ))
            .await?;
        Ok(shape::briefing_result(&raw))
    }
}
