//! Job lifecycle types.
//!
//! The remote job state machine:
//!
//! ```text
//!   submit() ──→ Queued ──→ Running ──→ Finished
//!                  │           │           │
//!                  │           │           └──→ (error payload) ──→ failed
//!                  └───────────┴──→ Error / Cancelled
//! ```
//!
//! A job is created by submission and only ever updated from polling
//! responses. It is terminal once the remote side reports `finished` or
//! populates an error message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque job identifier as issued by the remote API.
///
/// Providers hand out strings or integers; the value is echoed back
/// verbatim in status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub serde_json::Value);

impl JobId {
    /// Create a job ID from any JSON-representable value.
    pub fn new(id: impl Into<serde_json::Value>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => write!(f, "{s}"),
            other => write!(f, "{other}"),
        }
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(serde_json::Value::String(s.to_string()))
    }
}

/// Status of a remote job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is waiting in queue.
    Queued,
    /// Job is currently running.
    Running,
    /// Job finished; results (or an error payload) are attached.
    Finished,
    /// Job failed on the remote side.
    Error,
    /// Job was cancelled.
    Cancelled,
    /// Status string this crate does not know; treated as pending.
    Unknown(String),
}

impl JobStatus {
    /// Parse a provider status string (case-insensitive).
    pub fn parse(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "queued" | "pending" | "initializing" => JobStatus::Queued,
            "running" | "ongoing" => JobStatus::Running,
            "finished" | "completed" | "done" => JobStatus::Finished,
            "error" | "failed" => JobStatus::Error,
            "cancelled" | "canceled" => JobStatus::Cancelled,
            _ => JobStatus::Unknown(status.to_string()),
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Error | JobStatus::Cancelled
        )
    }

    /// Check if the job is still pending.
    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// A remote job with the data gathered while polling it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// The job identifier.
    pub id: JobId,
    /// Latest reported status.
    pub status: JobStatus,
    /// Number of shots requested.
    pub shots: u32,
    /// Raw samples, one integer per shot, once finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,
    /// Error message reported by the remote side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of status queries issued after submission.
    pub polls: u32,
    /// Time the job was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Time the job reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Backend the job was submitted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Job {
    /// Create a freshly submitted job.
    pub fn new(id: JobId, shots: u32) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            shots,
            samples: None,
            error: None,
            polls: 0,
            created_at: Some(Utc::now()),
            finished_at: None,
            backend: None,
        }
    }

    /// Set the backend name.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Apply one polling response.
    pub fn update(
        &mut self,
        status: JobStatus,
        samples: Option<Vec<u64>>,
        error: Option<String>,
    ) {
        self.status = status;
        if samples.is_some() {
            self.samples = samples;
        }
        // An empty error string carries no information.
        if let Some(msg) = error.filter(|m| !m.is_empty()) {
            self.error = Some(msg);
        }
        if self.is_terminal() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal() || self.error.is_some()
    }
}
