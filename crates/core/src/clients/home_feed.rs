use crate::domain::home_feed::HomeFeed;
use crate::normalize::home_feed::normalize_home_feed;
use crate::transport::{ApiRequest, Transport};
use std::sync::Arc;

const RESOURCE: &str = "홈 피드 조회";

pub struct HomeFeedClient {
    transport: Arc<dyn Transport>,
}

impl HomeFeedClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn fetch_home_feed(&self) -> anyhow::Result<HomeFeed> {
        let raw = self
            .transport
            .send(ApiRequest::get(RESOURCE, "/home-feed"))
            .await?;
        let feed = normalize_home_feed(&raw);
        tracing::info!(
            sectors = feed.sector_cards.len(),
            etfs = feed.etf_cards.len(),
            "fetched home feed"
        );
        Ok(feed)
    }
}
