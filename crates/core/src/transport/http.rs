use crate::config::Settings;
use crate::error::ApiError;
use crate::transport::{ApiRequest, Method, Transport};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use serde_json::Value;
use std::time::Duration;

const EMPTY_BODY_PLACEHOLDER: &str = "응답 본문 없음";

/// reqwest-backed transport against the configured API origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.api_timeout_secs))
            .build()
            .context("failed to build api http client")?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(method: Method) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // Every call must reach the origin.
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        if method == Method::Post {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> anyhow::Result<Value> {
        let url = self.url(&request.path);
        tracing::debug!(method = ?request.method, %url, resource = request.resource, "api request");

        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        let mut builder = builder.headers(Self::headers(request.method));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let res = builder
            .send()
            .await
            .with_context(|| format!("{} request failed", request.resource))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read {} response body", request.resource))?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            tracing::warn!(
                %url,
                status = status.as_u16(),
                resource = request.resource,
                %message,
                "api returned non-success status"
            );
            return Err(ApiError::Http {
                resource: request.resource,
                status: status.as_u16(),
                message,
            }
            .into());
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("{} response is not valid JSON: {text}", request.resource))
    }
}

/// Best-effort human message from an error body.
///
/// Looks at `error`, then `message`, then `detail` of a JSON object; otherwise the raw
/// text; otherwise a placeholder.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        let detail = ["error", "message", "detail"]
            .iter()
            .find_map(|key| obj.get(*key).filter(|v| !v.is_null()));
        if let Some(Value::String(detail)) = detail {
            if !detail.trim().is_empty() {
                return detail.clone();
            }
        }
    }

    if body.is_empty() {
        EMPTY_BODY_PLACEHOLDER.to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_conventional_fields() {
        assert_eq!(extract_error_message(r#"{"error":"bad ticker"}"#), "bad ticker");
        assert_eq!(
            extract_error_message(r#"{"message":"rate limited","detail":"x"}"#),
            "rate limited"
        );
        assert_eq!(extract_error_message(r#"{"detail":"Not Found"}"#), "Not Found");
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
        let structured = r#"{"detail":[{"loc":["query","tickers"]}]}"#;
        assert_eq!(extract_error_message(structured), structured);
        assert_eq!(extract_error_message(r#"{"error":"  "}"#), r#"{"error":"  "}"#);
        assert_eq!(extract_error_message(""), EMPTY_BODY_PLACEHOLDER);
    }

    #[test]
    fn joins_base_url_and_path() {
        let transport = HttpTransport {
            http: reqwest::Client::new(),
            base_url: "http://localhost:8000/".to_string(),
        };
        assert_eq!(transport.url("etf-news"), "http://localhost:8000/etf-news");
        assert_eq!(transport.url("/home-feed"), "http://localhost:8000/home-feed");
    }

    #[test]
    fn writes_declare_json_body() {
        let get = HttpTransport::headers(Method::Get);
        assert_eq!(get.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(get.get(CACHE_CONTROL).unwrap(), "no-store");
        assert!(get.get(CONTENT_TYPE).is_none());

        let post = HttpTransport::headers(Method::Post);
        assert_eq!(post.get(CONTENT_TYPE).unwrap(), "application/json");
    }
}
