//! One client per backend resource family, each composing a [`Transport`] with the
//! matching normalizer.
//!
//! [`Transport`]: crate::transport::Transport

pub mod checkup;
pub mod decision;
pub mod home_feed;
pub mod news;
pub mod offline;
pub mod portfolio;

use crate::domain::checkup::{
    BriefingResult, CheckupInput, CheckupRef, CheckupTicket, JobStatusReport, ReasonResult,
    RecomposeInput, RecomposeResult,
};

pub use checkup::HttpReasonApi;
pub use decision::DecisionClient;
pub use home_feed::HomeFeedClient;
pub use news::NewsClient;
pub use offline::OfflineReasonApi;
pub use portfolio::PortfolioClient;

/// The checkup lifecycle: submit, poll the job, then read and rework the checkup.
#[async_trait::async_trait]
pub trait ReasonApi: Send + Sync {
    async fn submit_checkup(&self, input: &CheckupInput) -> anyhow::Result<CheckupTicket>;

    async fn get_job_status(&self, job_id: &str) -> anyhow::Result<JobStatusReport>;

    async fn get_result(&self, target: &CheckupRef) -> anyhow::Result<ReasonResult>;

    async fn recompose(&self, input: &RecomposeInput) -> anyhow::Result<RecomposeResult>;

    async fn get_briefing(&self, target: &CheckupRef) -> anyhow::Result<BriefingResult>;
}

/// Uppercased, trimmed, de-duplicated tickers joined by commas, first occurrence wins.
pub fn ticker_param<S: AsRef<str>>(tickers: &[S]) -> Option<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let ticker = ticker.as_ref().trim().to_uppercase();
        if !ticker.is_empty() && !seen.contains(&ticker) {
            seen.push(ticker);
        }
    }
    (!seen.is_empty()).then(|| seen.join(","))
}
