use crate::domain::portfolio::{normalize_ratios, PortfolioItem, PortfolioResponse};
use crate::normalize::case::camelize_keys;
use crate::normalize::{coerce_number, collect_valid, first_array, first_present, string_or, ticker, Row};
use serde_json::Value;

/// Normalizes a `/generate-portfolio` response and rebalances its ratios to 100.
pub fn normalize_portfolio(payload: &Value) -> PortfolioResponse {
    let payload = camelize_keys(payload.clone());
    let empty = Row::new();
    let obj = payload.as_object().unwrap_or(&empty);

    let items = collect_valid(first_array(obj, &["items"]), usize::MAX, "portfolio item", portfolio_item);

    PortfolioResponse {
        market_analysis: string_or(obj, &["marketAnalysis"], ""),
        summary_comment: string_or(obj, &["summaryComment"], ""),
        items: normalize_ratios(items),
    }
}

fn portfolio_item(row: &Row) -> Option<PortfolioItem> {
    Some(PortfolioItem {
        ticker: ticker(row, &["ticker"])?,
        summary: string_or(row, &["summary"], ""),
        ratio: coerce_number(first_present(row, &["ratio"]))
            .map(|n| n.round() as i64)
            .unwrap_or(0),
        reason: string_or(row, &["reason"], ""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_and_rebalances() {
        let payload = json!({
            "market_analysis": "금리 동결 기대감",
            "summary_comment": "균형 잡힌 구성",
            "items": [
                {"ticker": "voo", "summary": "S&P 500", "ratio": 30, "reason": "core"},
                {"ticker": "schd", "summary": "Dividend", "ratio": "30", "reason": "income"},
                {"ticker": "tlt", "summary": "Long bonds", "ratio": 30.0, "reason": "hedge"},
                {"summary": "no ticker", "ratio": 10}
            ]
        });

        let out = normalize_portfolio(&payload);
        assert_eq!(out.market_analysis, "금리 동결 기대감");
        assert_eq!(out.summary_comment, "균형 잡힌 구성");
        let tickers: Vec<_> = out.items.iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["VOO", "SCHD", "TLT"]);
        let ratios: Vec<_> = out.items.iter().map(|i| i.ratio).collect();
        assert_eq!(ratios, vec![34, 33, 33]);
    }

    #[test]
    fn balanced_response_is_left_alone() {
        let payload = json!({"items": [
            {"ticker": "QQQ", "ratio": 60},
            {"ticker": "BND", "ratio": 40}
        ]});
        let once = normalize_portfolio(&payload);
        let ratios: Vec<_> = once.items.iter().map(|i| i.ratio).collect();
        assert_eq!(ratios, vec![60, 40]);
        assert_eq!(once.market_analysis, "");
    }

    #[test]
    fn oversized_ratios_still_sum_to_100() {
        let payload = json!({"items": [
            {"ticker": "AAA", "ratio": 1e19},
            {"ticker": "BBB", "ratio": 1e19}
        ]});
        let out = normalize_portfolio(&payload);
        let ratios: Vec<_> = out.items.iter().map(|i| i.ratio).collect();
        assert_eq!(ratios, vec![50, 50]);
    }
}
