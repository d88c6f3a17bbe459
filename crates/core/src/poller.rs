//! Job status polling for the processing screen.
//!
//! One immediate status query, then periodic queries until the job completes, fails or
//! the wall-clock window runs out. Time comes from an injected [`Clock`], so tests drive
//! the loop with a virtual clock.

use crate::clients::ReasonApi;
use crate::config::Settings;
use crate::domain::checkup::{JobStatus, JobStatusReport};
use crate::time::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Processing,
    /// The job finished; the UI navigates to the result.
    Completed { checkup_id: Option<String> },
    Failed,
    /// No verdict inside the window. Recoverable through [`JobPoller::recheck`].
    TimedOut,
}

impl PollState {
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            timeout: Duration::from_millis(7000),
        }
    }
}

impl PollConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: settings.poll_interval,
            timeout: settings.poll_timeout,
        }
    }
}

/// Route of the result screen for a completed job.
pub fn result_path(job_id: &str, checkup_id: Option<&str>) -> String {
    match checkup_id {
        Some(checkup_id) => format!("/result?jobId={job_id}&checkupId={checkup_id}"),
        None => format!("/result?jobId={job_id}"),
    }
}

/// Shared flag that stops a poller from applying anything further.
#[derive(Debug, Clone, Default)]
pub struct DisposeHandle(Arc<AtomicBool>);

impl DisposeHandle {
    pub fn dispose(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Machine {
    state: PollState,
    checking: bool,
    known_checkup_id: Option<String>,
    /// Bumped on every Completed or Failed transition.
    settled: u64,
}

impl Machine {
    /// Applies one status observation issued at `issued_at`. Returns the new state only
    /// when it changed.
    ///
    /// Completion is absorbing. A reply to a query issued before another terminal
    /// observation arrived is stale and ignored.
    fn observe(
        &mut self,
        issued_at: u64,
        observation: anyhow::Result<JobStatusReport>,
    ) -> Option<PollState> {
        if matches!(self.state, PollState::Completed { .. }) {
            return None;
        }
        if issued_at != self.settled {
            tracing::debug!("ignoring stale job status");
            return None;
        }

        let next = match observation {
            Ok(report) => match report.status {
                JobStatus::Completed => PollState::Completed {
                    checkup_id: report.checkup_id.or_else(|| self.known_checkup_id.clone()),
                },
                JobStatus::Failed => PollState::Failed,
                JobStatus::Processing => return None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "job status query failed");
                PollState::Failed
            }
        };

        if next == self.state {
            return None;
        }
        self.settled += 1;
        self.state = next.clone();
        Some(next)
    }

    fn time_out(&mut self) -> Option<PollState> {
        if !self.state.is_processing() {
            return None;
        }
        self.state = PollState::TimedOut;
        Some(PollState::TimedOut)
    }
}

struct Observation {
    issued_at: u64,
    result: anyhow::Result<JobStatusReport>,
}

pub struct JobPoller {
    api: Arc<dyn ReasonApi>,
    clock: Arc<dyn Clock>,
    config: PollConfig,
    job_id: String,
    machine: Mutex<Machine>,
    disposed: DisposeHandle,
}

impl JobPoller {
    /// `known_checkup_id` is used when the completed status does not name a checkup.
    pub fn new(
        api: Arc<dyn ReasonApi>,
        clock: Arc<dyn Clock>,
        config: PollConfig,
        job_id: impl Into<String>,
        known_checkup_id: Option<String>,
    ) -> Self {
        Self {
            api,
            clock,
            config,
            job_id: job_id.into(),
            machine: Mutex::new(Machine {
                state: PollState::Processing,
                checking: false,
                known_checkup_id,
                settled: 0,
            }),
            disposed: DisposeHandle::default(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> PollState {
        self.machine().state.clone()
    }

    pub fn dispose_handle(&self) -> DisposeHandle {
        self.disposed.clone()
    }

    pub fn dispose(&self) {
        self.disposed.dispose();
    }

    fn machine(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `None` once disposed: the response is discarded unseen.
    async fn query(&self) -> Option<Observation> {
        let issued_at = self.machine().settled;
        let result = self.api.get_job_status(&self.job_id).await;
        if self.disposed.is_disposed() {
            tracing::debug!(job_id = %self.job_id, "discarding status for disposed poller");
            return None;
        }
        Some(Observation { issued_at, result })
    }

    fn apply(&self, observation: Observation) -> Option<PollState> {
        let transition = self
            .machine()
            .observe(observation.issued_at, observation.result);
        if let Some(state) = &transition {
            tracing::info!(job_id = %self.job_id, ?state, "job poller transition");
        }
        transition
    }

    fn time_out(&self) -> Option<PollState> {
        let transition = self.machine().time_out();
        if transition.is_some() {
            tracing::info!(
                job_id = %self.job_id,
                timeout_ms = self.config.timeout.as_millis() as u64,
                "job poller timed out"
            );
        }
        transition
    }

    /// Polls until the job settles.
    ///
    /// Returns the transition this call made. `None` means nothing is left for the caller
    /// to act on: the poller was disposed, or a concurrent [`recheck`](Self::recheck)
    /// already settled the job.
    pub async fn run(&self) -> Option<PollState> {
        if self.disposed.is_disposed() {
            return None;
        }

        let first = self.query().await?;
        if let Some(transition) = self.apply(first) {
            return Some(transition);
        }
        if !self.state().is_processing() {
            return None;
        }

        let interval = self.config.interval.max(MIN_INTERVAL);
        let started = self.clock.now();
        let elapsed = || (self.clock.now() - started).to_std().unwrap_or_default();

        loop {
            let so_far = elapsed();
            if so_far >= self.config.timeout {
                if self.disposed.is_disposed() {
                    return None;
                }
                return self.time_out();
            }

            self.clock.sleep(interval.min(self.config.timeout - so_far)).await;
            if self.disposed.is_disposed() || !self.state().is_processing() {
                return None;
            }
            if elapsed() >= self.config.timeout {
                continue;
            }

            let observation = self.query().await?;
            if let Some(transition) = self.apply(observation) {
                return Some(transition);
            }
            if !self.state().is_processing() {
                return None;
            }
        }
    }

    /// One manual status query, mapped like a background tick.
    ///
    /// Returns `None` while another re-check is in flight, after disposal, after the job
    /// already completed, or when the status did not change.
    pub async fn recheck(&self) -> Option<PollState> {
        if self.disposed.is_disposed() {
            return None;
        }
        {
            let mut machine = self.machine();
            if machine.checking || matches!(machine.state, PollState::Completed { .. }) {
                return None;
            }
            machine.checking = true;
        }

        let observation = self.query().await;
        self.machine().checking = false;
        self.apply(observation?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkup::{
        BriefingResult, CheckupInput, CheckupRef, CheckupTicket, ReasonResult, RecomposeInput,
        RecomposeResult,
    };
    use crate::time::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// Status script for one job; `Processing` once the script runs dry.
    #[derive(Default)]
    struct ScriptedApi {
        script: Mutex<VecDeque<anyhow::Result<JobStatusReport>>>,
        calls: AtomicUsize,
        dispose_on_call: Mutex<Option<(usize, DisposeHandle)>>,
        held: Mutex<Vec<usize>>,
    }

    impl ScriptedApi {
        fn new(statuses: Vec<anyhow::Result<JobStatusReport>>) -> Self {
            Self {
                script: Mutex::new(statuses.into()),
                ..Default::default()
            }
        }

        fn push(&self, status: anyhow::Result<JobStatusReport>) {
            self.script.lock().unwrap().push_back(status);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Keeps the reply to call `call` (1-based) pending until released.
        fn hold(&self, call: usize) {
            self.held.lock().unwrap().push(call);
        }

        fn release(&self, call: usize) {
            self.held.lock().unwrap().retain(|held| *held != call);
        }
    }

    fn report(status: JobStatus, checkup_id: Option<&str>) -> anyhow::Result<JobStatusReport> {
        Ok(JobStatusReport {
            status,
            checkup_id: checkup_id.map(str::to_string),
        })
    }

    fn processing() -> anyhow::Result<JobStatusReport> {
        report(JobStatus::Processing, None)
    }

    #[async_trait::async_trait]
    impl ReasonApi for ScriptedApi {
        async fn submit_checkup(&self, _: &CheckupInput) -> anyhow::Result<CheckupTicket> {
            anyhow::bail!("not scripted")
        }

        async fn get_job_status(&self, _job_id: &str) -> anyhow::Result<JobStatusReport> {
            tokio::task::yield_now().await;
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((at, handle)) = self.dispose_on_call.lock().unwrap().as_ref() {
                if *at == call {
                    handle.dispose();
                }
            }
            let reply = self.script.lock().unwrap().pop_front().unwrap_or_else(processing);
            loop {
                let waiting = self.held.lock().unwrap().contains(&call);
                if !waiting {
                    break;
                }
                tokio::task::yield_now().await;
            }
            reply
        }

        async fn get_result(&self, _: &CheckupRef) -> anyhow::Result<ReasonResult> {
            anyhow::bail!("not scripted")
        }

        async fn recompose(&self, _: &RecomposeInput) -> anyhow::Result<RecomposeResult> {
            anyhow::bail!("not scripted")
        }

        async fn get_briefing(&self, _: &CheckupRef) -> anyhow::Result<BriefingResult> {
            anyhow::bail!("not scripted")
        }
    }

    fn start_poller(api: &Arc<ScriptedApi>, known: Option<&str>) -> (JobPoller, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()));
        let poller = JobPoller::new(
            api.clone(),
            clock.clone(),
            PollConfig::default(),
            "job-1",
            known.map(str::to_string),
        );
        (poller, clock)
    }

    #[tokio::test]
    async fn immediate_completion_skips_the_interval() {
        let api = Arc::new(ScriptedApi::new(vec![report(JobStatus::Completed, Some("chk-1"))]));
        let (poller, clock) = start_poller(&api, None);

        let outcome = poller.run().await;
        assert_eq!(outcome, Some(PollState::Completed { checkup_id: Some("chk-1".to_string()) }));
        assert_eq!(api.calls(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn completes_once_and_stops_polling() {
        let api = Arc::new(ScriptedApi::new(vec![
            processing(),
            processing(),
            report(JobStatus::Completed, None),
            report(JobStatus::Failed, None),
        ]));
        let (poller, clock) = start_poller(&api, Some("chk-known"));

        let outcome = poller.run().await;
        assert_eq!(
            outcome,
            Some(PollState::Completed { checkup_id: Some("chk-known".to_string()) })
        );
        assert_eq!(api.calls(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(300); 2]);

        // Stale observations after completion are ignored.
        assert_eq!(poller.recheck().await, None);
        assert_eq!(api.calls(), 3);
        assert!(matches!(poller.state(), PollState::Completed { .. }));
    }

    #[tokio::test]
    async fn times_out_then_recovers_on_recheck() {
        let api = Arc::new(ScriptedApi::new(Vec::new()));
        let (poller, clock) = start_poller(&api, None);

        assert_eq!(poller.run().await, Some(PollState::TimedOut));
        // One immediate query plus one per 300ms tick strictly inside the 7s window.
        assert_eq!(api.calls(), 24);
        assert_eq!(clock.sleeps().last(), Some(&Duration::from_millis(100)));
        assert_eq!(clock.sleeps().iter().sum::<Duration>(), Duration::from_millis(7000));

        // Still processing: no transition, stays timed out.
        assert_eq!(poller.recheck().await, None);
        assert_eq!(poller.state(), PollState::TimedOut);

        api.push(report(JobStatus::Completed, Some("chk-late")));
        assert_eq!(
            poller.recheck().await,
            Some(PollState::Completed { checkup_id: Some("chk-late".to_string()) })
        );
    }

    #[tokio::test]
    async fn failed_status_and_errors_both_fail() {
        let api = Arc::new(ScriptedApi::new(vec![processing(), report(JobStatus::Failed, None)]));
        let (poller, _) = start_poller(&api, None);
        assert_eq!(poller.run().await, Some(PollState::Failed));
        assert_eq!(api.calls(), 2);

        let api = Arc::new(ScriptedApi::new(vec![processing(), Err(anyhow::anyhow!("HTTP 500"))]));
        let (poller, _) = start_poller(&api, None);
        assert_eq!(poller.run().await, Some(PollState::Failed));

        // A failed job can still be re-checked.
        api.push(report(JobStatus::Completed, None));
        assert_eq!(poller.recheck().await, Some(PollState::Completed { checkup_id: None }));
    }

    #[tokio::test]
    async fn disposal_discards_in_flight_response() {
        let api = Arc::new(ScriptedApi::new(vec![
            processing(),
            processing(),
            report(JobStatus::Completed, Some("chk-1")),
        ]));
        let (poller, _) = start_poller(&api, None);
        *api.dispose_on_call.lock().unwrap() = Some((3, poller.dispose_handle()));

        assert_eq!(poller.run().await, None);
        assert_eq!(poller.state(), PollState::Processing);
        assert_eq!(api.calls(), 3);

        assert_eq!(poller.recheck().await, None);
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn disposed_poller_never_queries() {
        let api = Arc::new(ScriptedApi::new(Vec::new()));
        let (poller, _) = start_poller(&api, None);
        poller.dispose();
        assert_eq!(poller.run().await, None);
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn overlapping_checks_navigate_once() {
        let api = Arc::new(ScriptedApi::new(vec![
            report(JobStatus::Completed, Some("chk-1")),
            report(JobStatus::Completed, Some("chk-1")),
        ]));
        let (poller, _) = start_poller(&api, None);

        let (background, manual) = tokio::join!(poller.run(), poller.recheck());
        let navigations = [&background, &manual]
            .iter()
            .filter(|outcome| matches!(outcome, Some(PollState::Completed { .. })))
            .count();
        assert_eq!(navigations, 1);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn late_background_reply_cannot_override_first_terminal_state() {
        let api = Arc::new(ScriptedApi::new(vec![
            report(JobStatus::Completed, Some("chk-1")),
            report(JobStatus::Failed, None),
        ]));
        // The background query goes out first but its reply lands last.
        api.hold(1);
        let (poller, _) = start_poller(&api, None);

        let release_background = async {
            while poller.state().is_processing() {
                tokio::task::yield_now().await;
            }
            api.release(1);
        };
        let (background, manual, ()) =
            tokio::join!(poller.run(), poller.recheck(), release_background);

        assert_eq!(manual, Some(PollState::Failed));
        assert_eq!(background, None);
        assert_eq!(poller.state(), PollState::Failed);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn only_one_manual_recheck_in_flight() {
        let api = Arc::new(ScriptedApi::new(vec![report(JobStatus::Failed, None)]));
        let (poller, _) = start_poller(&api, None);
        assert_eq!(poller.run().await, Some(PollState::Failed));

        api.push(report(JobStatus::Completed, None));
        let (a, b) = tokio::join!(poller.recheck(), poller.recheck());
        let mut outcomes = vec![a, b];
        outcomes.sort_by_key(Option::is_none);
        assert_eq!(outcomes, vec![Some(PollState::Completed { checkup_id: None }), None]);
        assert_eq!(api.calls(), 2);
    }

    #[test]
    fn result_path_includes_checkup_when_known() {
        assert_eq!(result_path("j1", Some("c1")), "/result?jobId=j1&checkupId=c1");
        assert_eq!(result_path("j1", None), "/result?jobId=j1");
    }
}
