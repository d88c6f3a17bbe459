use crate::clients::ticker_param;
use crate::domain::decision::DecisionCard;
use crate::normalize::decision::normalize_decision_brief;
use crate::transport::{ApiRequest, Transport};
use std::sync::Arc;

const RESOURCE: &str = "ETF 의사결정 브리프 조회";
pub const DEFAULT_LIMIT_PER_TICKER: u32 = 4;

pub struct DecisionClient {
    transport: Arc<dyn Transport>,
    limit_per_ticker: u32,
}

impl DecisionClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            limit_per_ticker: DEFAULT_LIMIT_PER_TICKER,
        }
    }

    pub fn with_limit_per_ticker(mut self, limit: u32) -> Self {
        self.limit_per_ticker = limit;
        self
    }

    /// `GET /etf-decision-brief`. No request is made for an empty ticker list.
    pub async fn fetch_decision_brief<S: AsRef<str> + Sync>(
        &self,
        tickers: &[S],
    ) -> anyhow::Result<Vec<DecisionCard>> {
        let Some(tickers) = ticker_param(tickers) else {
            return Ok(Vec::new());
        };

        let request = ApiRequest::get(RESOURCE, "/etf-decision-brief")
            .query("tickers", &tickers)
            .query("limit_per_ticker", self.limit_per_ticker);

        let raw = self.transport.send(request).await?;
        let cards = normalize_decision_brief(&raw);
        tracing::info!(%tickers, count = cards.len(), "fetched decision brief");
        Ok(cards)
    }
}
