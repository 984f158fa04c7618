//! AQT gateway transport and wire types.
//!
//! The gateway exposes a single endpoint per target. Both the circuit
//! submission and the status query are JSON bodies sent with the same
//! HTTP method to the same URL; the response is a job record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use marmot_hal::JobId;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{AqtError, AqtResult};

/// Status codes the gateway answers with on success.
pub const VALID_STATUS_CODES: [u16; 3] = [200, 201, 202];

/// Value of the `SDK` header sent with every request.
pub const SDK_NAME: &str = "marmot";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// HTTP header map, ordered for stable logging and comparison.
pub type Headers = BTreeMap<String, String>;

/// HTTP methods accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// `PUT`, the gateway default.
    #[default]
    Put,
    /// `POST`.
    Post,
}

impl FromStr for HttpMethod {
    type Err = AqtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(AqtError::InvalidHttpMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Put => Method::PUT,
            HttpMethod::Post => Method::POST,
        }
    }
}

/// Raw gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl ApiResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status code is in [`VALID_STATUS_CODES`].
    pub fn has_valid_status(&self) -> bool {
        VALID_STATUS_CODES.contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> AqtResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Fail with [`AqtError::ApiError`] unless the status code is accepted.
pub fn verify_valid_status(response: &ApiResponse) -> AqtResult<()> {
    if response.has_valid_status() {
        Ok(())
    } else {
        Err(AqtError::ApiError {
            status: response.status,
            message: response.body.clone(),
        })
    }
}

/// Join a base URL and a path the way a browser resolves a relative link
/// against `"{base}/"`.
///
/// Absolute URLs replace the base; paths starting with `/` replace the
/// base path but keep its origin.
pub fn join_path(base: &str, path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }
    let base = format!("{base}/");
    match path.strip_prefix('/') {
        Some(rest) => {
            let origin_end = base
                .find("://")
                .and_then(|scheme| base[scheme + 3..].find('/').map(|i| scheme + 3 + i))
                .unwrap_or(base.len() - 1);
            format!("{}/{rest}", &base[..origin_end])
        }
        None => format!("{base}{path}"),
    }
}

/// Headers sent with every request.
pub fn request_headers(api_key: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert(API_KEY_HEADER.to_string(), api_key.to_string());
    headers.insert("SDK".to_string(), SDK_NAME.to_string());
    headers
}

/// Sends one request to the gateway.
///
/// Implementations must not retry; the job runner owns the retry policy.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `body` as JSON with `method` to `url`.
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: &serde_json::Value,
        headers: &Headers,
    ) -> AqtResult<ApiResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> AqtResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(AqtError::Http)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body, headers))]
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: &serde_json::Value,
        headers: &Headers,
    ) -> AqtResult<ApiResponse> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.into(), url).json(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Gateway answered {} ({} bytes)", status, body.len());
        Ok(ApiResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Request / response serde types
// ---------------------------------------------------------------------------

/// Body of a circuit submission.
#[derive(Debug, Serialize)]
pub struct JobSubmission<'a> {
    /// API key.
    pub access_token: &'a str,
    /// Number of device wires.
    pub no_qubits: usize,
    /// Number of shots.
    pub repetitions: u32,
    /// Serialized instruction array.
    pub data: &'a str,
}

/// Body of a status query.
#[derive(Debug, Serialize)]
pub struct JobQuery<'a> {
    /// Job identifier, echoed verbatim.
    pub id: &'a JobId,
    /// API key.
    pub access_token: &'a str,
}

/// Job record returned by both submission and status query.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    /// Job identifier; only required on the submission response.
    #[serde(default)]
    pub id: Option<JobId>,
    /// Job status: `queued | ongoing | finished | error | cancelled`.
    pub status: String,
    /// One integer outcome per shot, present once finished.
    #[serde(default)]
    pub samples: Option<Vec<u64>>,
    /// Error message set by the gateway when execution failed.
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
}
