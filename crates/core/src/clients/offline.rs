use crate::clients::checkup::input_key;
use crate::clients::ReasonApi;
use crate::domain::checkup::{
    BriefingResult, CheckupInput, CheckupRef, CheckupTicket, JobStatus, JobStatusReport,
    ReasonResult, RecomposeInput, RecomposeResult, RiskLevel, Tone,
};
use crate::error::ApiError;
use crate::store::KeyValueStore;
use crate::time::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const META_KEY_PREFIX: &str = "checkup:meta:";

const SUBMIT_LATENCY: Duration = Duration::from_millis(250);
const STATUS_LATENCY: Duration = Duration::from_millis(120);
const RESULT_LATENCY: Duration = Duration::from_millis(180);
const RECOMPOSE_LATENCY: Duration = Duration::from_millis(600);

const SLOW_JOB_DELAY_MS: u64 = 12_000;
const SLOW_JOB_MARKER: &str = "지연";
const FAILING_JOB_MARKER: &str = "실패";

const RESULT_FAILED_MESSAGE: &str = "결과 생성에 실패했습니다.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobMeta {
    ready_at: DateTime<Utc>,
    status: JobStatus,
}

fn meta_key(job_id: &str) -> String {
    format!("{META_KEY_PREFIX}{job_id}")
}

fn fallback_input() -> CheckupInput {
    CheckupInput {
        goal: "MVP 출시".to_string(),
        concern: "불확실한 리스크".to_string(),
        horizon_weeks: 4,
    }
}

/// Readiness delay derived from the input, so repeated runs behave the same.
fn readiness_delay(input: &CheckupInput) -> Duration {
    if input.concern.contains(SLOW_JOB_MARKER) {
        return Duration::from_millis(SLOW_JOB_DELAY_MS);
    }
    let chars = (input.goal.chars().count() + input.concern.chars().count()) as u64;
    Duration::from_millis(500 + chars % 900)
}

pub fn make_result(input: &CheckupInput) -> ReasonResult {
    let concern_len = input.concern.chars().count();
    let risk = if concern_len > 80 {
        RiskLevel::High
    } else if concern_len > 35 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    ReasonResult {
        score: (60 + (input.goal.chars().count() % 30) as u32).min(95),
        risk,
        summary: format!(
            "목표 \"{}\" 기준으로 {}주 내 개선 여지가 있으며, 초기 마찰 구간 관리가 핵심입니다.",
            input.goal, input.horizon_weeks
        ),
        strengths: vec![
            "목표가 명확함".to_string(),
            "기간이 구체적임".to_string(),
            "실행 윈도우가 정의됨".to_string(),
        ],
        blind_spots: vec![
            "주간 실행 일관성 가정이 큼".to_string(),
            "대체 시나리오가 부족함".to_string(),
            "외부 변수 리스크 정량화 미흡".to_string(),
        ],
        recommendation: "2주 단위 마이크로 파일럿을 운영하고, 선행지표 1개를 매일 추적한 뒤 확장/수정 결정을 하세요."
            .to_string(),
    }
}

pub fn make_briefing(result: &ReasonResult) -> BriefingResult {
    let mut talking_points = vec![result.summary.clone()];
    if let Some(strength) = result.strengths.first() {
        talking_points.push(format!("핵심 강점: {strength}"));
    }
    if let Some(blind_spot) = result.blind_spots.first() {
        talking_points.push(format!("주의 포인트: {blind_spot}"));
    }
    talking_points.push(result.recommendation.clone());

    BriefingResult {
        headline: format!(
            "Reason 시그널: 리스크 {} · 신뢰점수 {}/100",
            result.risk.as_str().to_uppercase(),
            result.score
        ),
        talking_points,
        caveat: "현재는 MVP 더미 결과입니다. 이후 실제 모델 응답으로 교체됩니다.".to_string(),
    }
}

pub fn make_recompose(input: &RecomposeInput) -> RecomposeResult {
    let tone_hint = match input.tone {
        Tone::Optimistic => "상방 가능성을 중심으로 실험 확장 관점에서 재구성",
        Tone::Conservative => "하방 방어를 우선하는 단계적 전개 관점에서 재구성",
        Tone::Balanced => "상방/하방 균형 관점에서 재구성",
    };

    RecomposeResult {
        reframed_summary: format!("{tone_hint}. 포커스: {}", input.focus),
        next_steps: vec![
            "의사결정 책임자와 마감 시점을 명확화".to_string(),
            "48시간 내 무조건 실행 가능한 무회귀 액션 1개 확정".to_string(),
            "중단 기준(킬 스위치) 지표 1개 지정".to_string(),
        ],
    }
}

/// In-process stand-in for the checkup backend with deterministic, templated content.
///
/// The checkup id of a job is the job id itself.
pub struct OfflineReasonApi {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl OfflineReasonApi {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn load_meta(&self, job_id: &str) -> anyhow::Result<Option<JobMeta>> {
        let Some(raw) = self.store.get(&meta_key(job_id))? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    fn load_input(&self, job_id: &str) -> anyhow::Result<CheckupInput> {
        let raw = self.store.get(&input_key(job_id))?;
        Ok(raw
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(fallback_input))
    }

    fn status_now(&self, job_id: &str) -> anyhow::Result<JobStatus> {
        let status = match self.load_meta(job_id)? {
            None => JobStatus::Failed,
            Some(meta) if meta.status == JobStatus::Failed => JobStatus::Failed,
            Some(meta) if self.clock.now() >= meta.ready_at => JobStatus::Completed,
            Some(_) => JobStatus::Processing,
        };
        Ok(status)
    }

    fn job_of(target: &CheckupRef) -> anyhow::Result<String> {
        target
            .checkup_id
            .as_deref()
            .or(target.job_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::MissingCorrelation { job_id: None }.into())
    }
}

#[async_trait::async_trait]
impl ReasonApi for OfflineReasonApi {
    async fn submit_checkup(&self, input: &CheckupInput) -> anyhow::Result<CheckupTicket> {
        input.validate()?;
        self.clock.sleep(SUBMIT_LATENCY).await;

        let job_id = uuid::Uuid::new_v4().to_string();
        let delay = chrono::Duration::from_std(readiness_delay(input))?;
        let meta = JobMeta {
            ready_at: self.clock.now() + delay,
            status: if input.concern.contains(FAILING_JOB_MARKER) {
                JobStatus::Failed
            } else {
                JobStatus::Processing
            },
        };

        self.store.set(&input_key(&job_id), &serde_json::to_string(input)?)?;
        self.store.set(&meta_key(&job_id), &serde_json::to_string(&meta)?)?;
        tracing::info!(%job_id, ready_at = %meta.ready_at, "offline checkup submitted");

        Ok(CheckupTicket {
            job_id,
            checkup_id: None,
        })
    }

    async fn get_job_status(&self, job_id: &str) -> anyhow::Result<JobStatusReport> {
        self.clock.sleep(STATUS_LATENCY).await;
        let status = self.status_now(job_id)?;
        Ok(JobStatusReport {
            status,
            checkup_id: (status == JobStatus::Completed).then(|| job_id.to_string()),
        })
    }

    async fn get_result(&self, target: &CheckupRef) -> anyhow::Result<ReasonResult> {
        self.clock.sleep(RESULT_LATENCY).await;
        let job_id = Self::job_of(target)?;
        if self.status_now(&job_id)? == JobStatus::Failed {
            anyhow::bail!(RESULT_FAILED_MESSAGE);
        }
        Ok(make_result(&self.load_input(&job_id)?))
    }

    async fn recompose(&self, input: &RecomposeInput) -> anyhow::Result<RecomposeResult> {
        self.clock.sleep(RECOMPOSE_LATENCY).await;
        Ok(make_recompose(input))
    }

    async fn get_briefing(&self, target: &CheckupRef) -> anyhow::Result<BriefingResult> {
        let result = self.get_result(target).await?;
        Ok(make_briefing(&result))
    }
}
