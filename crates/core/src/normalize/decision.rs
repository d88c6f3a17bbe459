use crate::domain::decision::{
    DecisionCard, DecisionEvent, DEFAULT_CAUSAL_SUMMARY, DEFAULT_CONCLUSION,
    DEFAULT_EVENT_SOURCE, DEFAULT_MARKET_REACTION, MAX_KEY_EVENTS, MAX_RISK_CONDITIONS,
};
use crate::domain::signal::Signal;
use crate::normalize::case::camelize_keys;
use crate::normalize::{
    coerce_number, collect_valid, collection_rows, first_array, first_present, string_list,
    string_or, ticker, trimmed, Row,
};
use serde_json::Value;

/// Normalizes an `/etf-decision-brief` payload.
pub fn normalize_decision_brief(payload: &Value) -> Vec<DecisionCard> {
    let payload = camelize_keys(payload.clone());
    collect_valid(collection_rows(&payload), usize::MAX, "decision card", decision_card)
}

pub fn decision_card(row: &Row) -> Option<DecisionCard> {
    let ticker = ticker(row, &["ticker"])?;

    Some(DecisionCard {
        ticker,
        signal: Signal::from_strict_label(&string_or(row, &["signal"], "")),
        confidence: coerce_number(first_present(row, &["confidence"])),
        conclusion: string_or(row, &["conclusion"], DEFAULT_CONCLUSION),
        causal_summary: string_or(row, &["causalSummary"], DEFAULT_CAUSAL_SUMMARY),
        key_events: collect_valid(
            first_array(row, &["keyEvents"]),
            MAX_KEY_EVENTS,
            "decision event",
            decision_event,
        ),
        risk_invalidation_conditions: string_list(
            first_array(row, &["riskInvalidationConditions"]),
            MAX_RISK_CONDITIONS,
        ),
    })
}

pub fn decision_event(row: &Row) -> Option<DecisionEvent> {
    let event = trimmed(row, &["event"]);
    let source_link = trimmed(row, &["sourceLink"]);
    if event.is_empty() || source_link.is_empty() {
        return None;
    }

    Some(DecisionEvent {
        event,
        market_reaction: string_or(row, &["marketReaction"], DEFAULT_MARKET_REACTION),
        published_at: string_or(row, &["publishedAt"], ""),
        source: string_or(row, &["source"], DEFAULT_EVENT_SOURCE),
        source_link,
    })
}
