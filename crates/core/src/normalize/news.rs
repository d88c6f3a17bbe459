use crate::domain::news::{EtfNewsCard, NewsLink, DEFAULT_SUMMARY, MAX_NEWS_PER_CARD};
use crate::domain::signal::Signal;
use crate::normalize::case::camelize_keys;
use crate::normalize::{
    collect_valid, collection_rows, first_array, optional_string, string_or, ticker, trimmed, Row,
};
use serde_json::Value;

/// Normalizes an `/etf-news` payload in any of its historical shapes.
pub fn normalize_news_feed(payload: &Value) -> Vec<EtfNewsCard> {
    let payload = camelize_keys(payload.clone());
    collect_valid(collection_rows(&payload), usize::MAX, "etf news card", news_card)
}

/// Expects camel-cased keys.
pub fn news_card(row: &Row) -> Option<EtfNewsCard> {
    let ticker = ticker(row, &["ticker", "symbol"])?;
    let news = collect_valid(
        first_array(row, &["news", "relatedNews", "links"]),
        MAX_NEWS_PER_CARD,
        "news link",
        news_link,
    );

    Some(EtfNewsCard {
        ticker,
        name: optional_string(row, &["name"]),
        signal: Signal::from_news_label(&string_or(row, &["signal", "badge", "sentiment"], "")),
        summary: string_or(row, &["summary", "commentary"], DEFAULT_SUMMARY),
        updated_at: optional_string(row, &["updatedAt"]),
        news,
        sectors: Vec::new(),
    })
}

/// A link survives only with both a title and a url.
pub fn news_link(row: &Row) -> Option<NewsLink> {
    let title = trimmed(row, &["title", "headline"]);
    let url = trimmed(row, &["url", "link"]);
    if title.is_empty() || url.is_empty() {
        return None;
    }
    Some(NewsLink {
        title,
        url,
        source: optional_string(row, &["source"]),
    })
}
