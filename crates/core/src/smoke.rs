//! Minimal live contract check against a running backend.

use crate::transport::{ApiRequest, Transport};
use anyhow::{ensure, Context};
use serde_json::Value;

const SMOKE_TICKERS: &str = "QQQ,SPY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmokeReport {
    pub news_items: usize,
    pub decision_results: usize,
}

fn is_string(v: &Value, key: &str) -> bool {
    v.get(key).map(Value::is_string).unwrap_or(false)
}

pub fn check_news_shape(data: &Value) -> anyhow::Result<usize> {
    let items = data
        .get("items")
        .and_then(Value::as_array)
        .context("/etf-news response must include items[]")?;
    let Some(first) = items.first() else {
        return Ok(0);
    };

    ensure!(is_string(first, "summary"), "news item.summary must be string");
    ensure!(is_string(first, "signal"), "news item.signal must be string");
    ensure!(is_string(first, "source_link"), "news item.source_link must be string");
    Ok(items.len())
}

pub fn check_decision_shape(data: &Value) -> anyhow::Result<usize> {
    let results = data
        .get("results")
        .and_then(Value::as_array)
        .context("/etf-decision-brief response must include results[]")?;
    let Some(first) = results.first() else {
        return Ok(0);
    };

    ensure!(is_string(first, "ticker"), "decision result.ticker must be string");
    ensure!(is_string(first, "signal"), "decision result.signal must be string");
    ensure!(is_string(first, "conclusion"), "decision result.conclusion must be string");
    ensure!(
        first.get("key_events").map(Value::is_array).unwrap_or(false),
        "decision result.key_events must be array"
    );
    Ok(results.len())
}

/// Hits `/etf-news` and `/etf-decision-brief` and checks their raw wire shape.
pub async fn run_integration_checks(transport: &dyn Transport) -> anyhow::Result<SmokeReport> {
    let news = transport
        .send(
            ApiRequest::get("ETF 뉴스 조회", "/etf-news")
                .query("tickers", SMOKE_TICKERS)
                .query("limit", 4),
        )
        .await?;
    let news_items = check_news_shape(&news)?;
    tracing::info!(items = news_items, "/etf-news ok");

    let decision = transport
        .send(
            ApiRequest::get("ETF 의사결정 브리프 조회", "/etf-decision-brief")
                .query("tickers", SMOKE_TICKERS)
                .query("limit_per_ticker", 2),
        )
        .await?;
    let decision_results = check_decision_shape(&decision)?;
    tracing::info!(results = decision_results, "/etf-decision-brief ok");

    Ok(SmokeReport {
        news_items,
        decision_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;
    use serde_json::json;

    #[test]
    fn news_shape_rules() {
        assert_eq!(check_news_shape(&json!({"items": []})).unwrap(), 0);
        let good = json!({"items": [{"summary": "s", "signal": "bullish", "source_link": "u"}]});
        assert_eq!(check_news_shape(&good).unwrap(), 1);

        let err = check_news_shape(&json!({"items": [{"summary": "s", "signal": "x"}]})).unwrap_err();
        assert_eq!(err.to_string(), "news item.source_link must be string");
        assert!(check_news_shape(&json!([])).is_err());
    }

    #[test]
    fn decision_shape_rules() {
        let good = json!({"results": [{"ticker": "QQQ", "signal": "neutral", "conclusion": "c", "key_events": []}]});
        assert_eq!(check_decision_shape(&good).unwrap(), 1);
        let bad = json!({"results": [{"ticker": "QQQ", "signal": "neutral", "conclusion": "c"}]});
        assert!(check_decision_shape(&bad).is_err());
    }

    #[tokio::test]
    async fn runs_both_checks_in_order() {
        let transport = FakeTransport::new()
            .respond(json!({"items": []}))
            .respond(json!({"results": []}));
        let report = run_integration_checks(&transport).await.unwrap();
        assert_eq!(report, SmokeReport { news_items: 0, decision_results: 0 });

        let requests = transport.requests();
        assert_eq!(requests[0].query_param("limit"), Some("4"));
        assert_eq!(requests[1].query_param("limit_per_ticker"), Some("2"));
    }

    #[tokio::test]
    async fn stops_on_first_failure() {
        let transport = FakeTransport::new().fail(500, "boom");
        assert!(run_integration_checks(&transport).await.is_err());
        assert_eq!(transport.requests().len(), 1);
    }
}
