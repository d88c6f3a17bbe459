use crate::domain::portfolio::{PortfolioResponse, SurveyForm};
use crate::normalize::portfolio::normalize_portfolio;
use crate::transport::{ApiRequest, Transport};
use std::sync::Arc;

const RESOURCE: &str = "포트폴리오 생성";

pub struct PortfolioClient {
    transport: Arc<dyn Transport>,
}

impl PortfolioClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// `POST /generate-portfolio`. Each call asks the backend for a fresh portfolio.
    pub async fn generate_portfolio(&self, form: &SurveyForm) -> anyhow::Result<PortfolioResponse> {
        form.validate()?;

        let request = ApiRequest::post(RESOURCE, "/generate-portfolio", form.to_request_body());
        let raw = self.transport.send(request).await?;
        let portfolio = normalize_portfolio(&raw);
        tracing::info!(
            items = portfolio.items.len(),
            risk_tolerance = form.risk_tolerance.label(),
            "generated portfolio"
        );
        Ok(portfolio)
    }
}
