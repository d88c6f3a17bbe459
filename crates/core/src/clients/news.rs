use crate::clients::ticker_param;
use crate::domain::news::EtfNewsCard;
use crate::normalize::news::normalize_news_feed;
use crate::transport::{ApiRequest, Transport};
use std::sync::Arc;

const RESOURCE: &str = "ETF 뉴스 조회";

pub struct NewsClient {
    transport: Arc<dyn Transport>,
}

impl NewsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// `GET /etf-news`. An empty ticker list asks for the default feed.
    pub async fn fetch_etf_news<S: AsRef<str> + Sync>(
        &self,
        tickers: &[S],
        limit: Option<u32>,
    ) -> anyhow::Result<Vec<EtfNewsCard>> {
        let mut request = ApiRequest::get(RESOURCE, "/etf-news");
        if let Some(tickers) = ticker_param(tickers) {
            request = request.query("tickers", tickers);
        }
        if let Some(limit) = limit {
            request = request.query("limit", limit);
        }

        let raw = self.transport.send(request).await?;
        let cards = normalize_news_feed(&raw);
        tracing::info!(count = cards.len(), "fetched etf news");
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::transport::testing::FakeTransport;
    use serde_json::json;

    #[tokio::test]
    async fn builds_query_and_normalizes() {
        let transport = Arc::new(FakeTransport::new().respond(json!({
            "items": [{"ticker": "qqq", "signal": "buy", "news": []}]
        })));
        let client = NewsClient::new(transport.clone());

        let cards = client.fetch_etf_news(&["qqq", "spy"], Some(4)).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].ticker, "QQQ");

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/etf-news");
        assert_eq!(requests[0].query_param("tickers"), Some("QQQ,SPY"));
        assert_eq!(requests[0].query_param("limit"), Some("4"));
    }

    #[tokio::test]
    async fn empty_tickers_omit_the_parameter() {
        let transport = Arc::new(FakeTransport::new().respond(json!([])));
        let client = NewsClient::new(transport.clone());
        assert!(client.fetch_etf_news::<&str>(&[], None).await.unwrap().is_empty());
        assert!(transport.requests()[0].query.is_empty());
    }

    #[tokio::test]
    async fn failures_are_not_normalized() {
        let transport = Arc::new(FakeTransport::new().fail(503, "maintenance"));
        let client = NewsClient::new(transport);
        let err = client.fetch_etf_news(&["qqq"], None).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>().and_then(ApiError::status), Some(503));
        assert_eq!(err.to_string(), "ETF 뉴스 조회 실패 (503): maintenance");
    }
}
