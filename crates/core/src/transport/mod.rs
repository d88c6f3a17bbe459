pub mod http;

use serde_json::Value;

pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outbound call, relative to the configured API origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Human-readable name of the operation, used in error messages.
    pub resource: &'static str,
}

impl ApiRequest {
    pub fn get(resource: &'static str, path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            resource,
        }
    }

    pub fn post(resource: &'static str, path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            resource,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Performs a request and yields the parsed JSON body of a 2xx response.
///
/// Non-2xx responses must fail with [`crate::error::ApiError::Http`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> anyhow::Result<Value>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::ApiError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses in order and records every request.
    #[derive(Default)]
    pub struct FakeTransport {
        responses: Mutex<VecDeque<Result<Value, (u16, String)>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, body: Value) -> Self {
            self.responses.lock().unwrap().push_back(Ok(body));
            self
        }

        pub fn fail(self, status: u16, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err((status, message.to_string())));
            self
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: ApiRequest) -> anyhow::Result<Value> {
            let resource = request.resource;
            self.requests.lock().unwrap().push(request);
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(body)) => Ok(body),
                Some(Err((status, message))) => Err(ApiError::Http {
                    resource,
                    status,
                    message,
                }
                .into()),
                None => anyhow::bail!("no scripted response for {resource}"),
            }
        }
    }
}
