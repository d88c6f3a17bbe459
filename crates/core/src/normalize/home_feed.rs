use crate::domain::home_feed::{
    HomeFeed, HomeFeedNewsLink, HomeFeedSectorCard, DEFAULT_SECTOR, HOME_CARD_NAME,
};
use crate::domain::news::{EtfNewsCard, NewsLink, DEFAULT_SUMMARY, MAX_NEWS_PER_CARD};
use crate::domain::signal::Signal;
use crate::normalize::case::camelize_keys;
use crate::normalize::{
    coerce_number, collect_valid, first_array, first_present, optional_string, string_list,
    string_or, ticker, trimmed, Row,
};
use serde_json::Value;

pub fn normalize_home_feed(payload: &Value) -> HomeFeed {
    let payload = camelize_keys(payload.clone());
    let Some(obj) = payload.as_object() else {
        return HomeFeed::default();
    };

    HomeFeed {
        generated_at: optional_string(obj, &["generatedAt"]),
        locale: optional_string(obj, &["locale"]),
        sector_cards: collect_valid(
            first_array(obj, &["sectorCards"]),
            usize::MAX,
            "home sector card",
            sector_card,
        ),
        etf_cards: collect_valid(
            first_array(obj, &["etfCards"]),
            usize::MAX,
            "home etf card",
            etf_card,
        ),
    }
}

fn sector_card(row: &Row) -> Option<HomeFeedSectorCard> {
    let etf_count = coerce_number(first_present(row, &["etfCount"]))
        .map(|n| n.max(0.0).round() as u32)
        .unwrap_or(0);

    Some(HomeFeedSectorCard {
        sector: string_or(row, &["sector"], DEFAULT_SECTOR),
        etf_count,
        hot_news: collect_valid(first_array(row, &["hotNews"]), usize::MAX, "hot news", hot_news),
    })
}

fn etf_card(row: &Row) -> Option<EtfNewsCard> {
    let ticker = ticker(row, &["ticker"])?;
    let news = collect_valid(first_array(row, &["news"]), MAX_NEWS_PER_CARD, "home news", |row| {
        hot_news(row).map(|link| NewsLink {
            title: link.title,
            url: link.url,
            source: link.source,
        })
    });

    Some(EtfNewsCard {
        ticker,
        name: Some(HOME_CARD_NAME.to_string()),
        signal: Signal::from_strict_label(&string_or(row, &["signal"], "")),
        summary: string_or(row, &["summary"], DEFAULT_SUMMARY),
        updated_at: optional_string(row, &["updatedAt"]),
        news,
        sectors: string_list(first_array(row, &["sectors"]), usize::MAX),
    })
}

fn hot_news(row: &Row) -> Option<HomeFeedNewsLink> {
    let title = trimmed(row, &["title"]);
    let url = trimmed(row, &["url"]);
    if title.is_empty() || url.is_empty() {
        return None;
    }
    Some(HomeFeedNewsLink {
        title,
        url,
        source: optional_string(row, &["source"]),
        ticker: optional_string(row, &["ticker"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_sectors_and_cards() {
        let payload = json!({
            "generated_at": "2026-02-02T07:00:00+09:00",
            "locale": "ko-KR",
            "sector_cards": [
                {
                    "sector": "Information Technology",
                    "etf_count": "4",
                    "hot_news": [
                        {"title": "Chips up", "url": "https://example.com/1", "ticker": "SOXX"},
                        {"title": "no url"}
                    ]
                },
                {"etf_count": "many"},
                null
            ],
            "etf_cards": [
                {
                    "ticker": "xlk",
                    "signal": "positive",
                    "sectors": ["Information Technology", ""],
                    "news": [
                        {"title": "a", "url": "u1"},
                        {"title": "b", "url": "u2"},
                        {"title": "c", "url": "u3"},
                        {"title": "d", "url": "u4"}
                    ]
                },
                {"summary": "no ticker"}
            ]
        });

        let feed = normalize_home_feed(&payload);
        assert_eq!(feed.generated_at.as_deref(), Some("2026-02-02T07:00:00+09:00"));
        assert_eq!(feed.locale.as_deref(), Some("ko-KR"));

        assert_eq!(feed.sector_cards.len(), 2);
        assert_eq!(feed.sector_cards[0].etf_count, 4);
        assert_eq!(feed.sector_cards[0].hot_news.len(), 1);
        assert_eq!(feed.sector_cards[0].hot_news[0].ticker.as_deref(), Some("SOXX"));
        assert_eq!(feed.sector_cards[1].sector, DEFAULT_SECTOR);
        assert_eq!(feed.sector_cards[1].etf_count, 0);

        assert_eq!(feed.etf_cards.len(), 1);
        let card = &feed.etf_cards[0];
        assert_eq!(card.ticker, "XLK");
        assert_eq!(card.name.as_deref(), Some(HOME_CARD_NAME));
        assert_eq!(card.signal, Signal::Neutral);
        assert_eq!(card.summary, DEFAULT_SUMMARY);
        assert_eq!(card.sectors, vec!["Information Technology"]);
        assert_eq!(card.news.len(), MAX_NEWS_PER_CARD);
    }

    #[test]
    fn non_object_payload_is_an_empty_feed() {
        assert_eq!(normalize_home_feed(&json!([1, 2])), HomeFeed::default());
    }
}
