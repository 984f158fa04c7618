//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{ApiResponse, Headers, HttpMethod, Transport};
use crate::error::AqtResult;

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: serde_json::Value,
    pub headers: Headers,
}

/// Answers requests from a fixed script and records every request.
///
/// Once the script is exhausted every request is answered with a queued
/// job record.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = (u16, &'static str)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| ApiResponse::new(status, body))
                    .collect(),
            ),
            requests: Mutex::default(),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: &serde_json::Value,
        headers: &Headers,
    ) -> AqtResult<ApiResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.clone(),
            headers: headers.clone(),
        });
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ApiResponse::new(200, r#"{"status": "queued"}"#)))
    }
}
