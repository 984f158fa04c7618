//! Job submission and polling.
//!
//! ```text
//!   submit ──→ verify status ──→ parse job ──┐
//!                                            ▼
//!                 ┌── sleep ◀── query ◀── not terminal?
//!                 └─────────────────────────▶┘
//!                                            │ terminal
//!                                            ▼
//!                          ERROR set? ──→ JobFailed
//!                          otherwise  ──→ samples
//! ```
//!
//! The runner never resubmits a circuit. Only the status query repeats, and
//! only while the job is not terminal.

use std::sync::Arc;

use marmot_hal::{Clock, Job, JobStatus, PollPolicy};
use tracing::{debug, info, instrument, warn};

use crate::api::{
    ApiResponse, Headers, HttpMethod, JobQuery, JobResponse, JobSubmission, Transport,
    verify_valid_status,
};
use crate::error::{AqtError, AqtResult};

/// Submits circuits and waits for their results.
#[derive(Clone)]
pub struct JobRunner {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
    method: HttpMethod,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("policy", &self.policy)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    /// Create a runner using `PUT` requests.
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>, policy: PollPolicy) -> Self {
        Self {
            transport,
            clock,
            policy,
            method: HttpMethod::default(),
        }
    }

    /// Use `method` for submission and status queries.
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Current poll policy.
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Replace the poll policy.
    pub fn set_policy(&mut self, policy: PollPolicy) {
        self.policy = policy;
    }

    /// HTTP method in use.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    async fn send(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &Headers,
    ) -> AqtResult<JobResponse> {
        let response: ApiResponse = self.transport.send(self.method, url, body, headers).await?;
        verify_valid_status(&response)?;
        response.json()
    }

    /// Submit `submission` to `url` and poll until the job is terminal.
    ///
    /// Returns the finished job with its samples populated.
    #[instrument(skip(self, headers, submission), fields(shots = submission.repetitions))]
    pub async fn execute(
        &self,
        url: &str,
        headers: &Headers,
        submission: &JobSubmission<'_>,
    ) -> AqtResult<Job> {
        let body = serde_json::to_value(submission)?;
        let initial = self.send(url, &body, headers).await?;
        let Some(id) = initial.id else {
            return Err(AqtError::MissingJobId(initial.status));
        };
        info!("Submitted AQT job {}", id);

        let mut job = Job::new(id, submission.repetitions).with_backend(url);
        job.update(
            JobStatus::parse(&initial.status),
            initial.samples,
            initial.error,
        );

        let query = serde_json::to_value(JobQuery {
            id: &job.id,
            access_token: submission.access_token,
        })?;
        let started = self.clock.now();

        while !job.is_terminal() {
            let elapsed = self.clock.now().saturating_duration_since(started);
            if !self.policy.allows(job.polls, elapsed) {
                warn!(
                    "Giving up on AQT job {} after {} polls ({:?})",
                    job.id, job.polls, elapsed
                );
                return Err(AqtError::Timeout(job.id.to_string()));
            }

            let update = self.send(url, &query, headers).await?;
            job.polls += 1;
            job.update(JobStatus::parse(&update.status), update.samples, update.error);
            debug!("AQT job {} is {} (poll {})", job.id, job.status, job.polls);

            self.clock.sleep(self.policy.retry_delay()).await;
        }

        if let Some(message) = &job.error {
            return Err(AqtError::JobFailed(message.clone()));
        }
        match job.status.clone() {
            JobStatus::Finished if job.samples.is_some() => {
                info!("AQT job {} finished after {} polls", job.id, job.polls);
                Ok(job)
            }
            JobStatus::Finished => Err(AqtError::MissingSamples(job.id.to_string())),
            status => Err(AqtError::JobFailed(format!(
                "job {} reported status {status}",
                job.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use marmot_hal::ManualClock;

    use crate::api::request_headers;
    use crate::test_support::ScriptedTransport;

    fn submission() -> JobSubmission<'static> {
        JobSubmission {
            access_token: "ABC123",
            no_qubits: 2,
            repetitions: 4,
            data: "[]",
        }
    }

    fn runner(transport: Arc<ScriptedTransport>, clock: Arc<ManualClock>) -> JobRunner {
        let policy = PollPolicy::from_secs_f64(0.5).unwrap();
        JobRunner::new(transport, clock, policy)
    }

    #[tokio::test]
    async fn test_polls_until_finished() {
        let transport = ScriptedTransport::new([
            (200, r#"{"id": 7, "status": "queued"}"#),
            (200, r#"{"id": 7, "status": "ongoing"}"#),
            (200, r#"{"id": 7, "status": "finished", "samples": [1, 2, 3, 0]}"#),
        ]);
        let clock = Arc::new(ManualClock::new());
        let job = runner(transport.clone(), clock.clone())
            .execute("https://host/sim", &request_headers("ABC123"), &submission())
            .await
            .unwrap();

        assert_eq!(job.samples, Some(vec![1, 2, 3, 0]));
        assert_eq!(job.polls, 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(500); 2]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].body["data"], "[]");
        assert_eq!(requests[0].body["repetitions"], 4);
        assert_eq!(
            requests[1].body,
            serde_json::json!({"id": 7, "access_token": "ABC123"})
        );
        assert!(requests.iter().all(|r| r.method == HttpMethod::Put));
    }

    #[tokio::test]
    async fn test_immediately_finished_job_is_not_polled() {
        let transport = ScriptedTransport::new([(
            201,
            r#"{"id": "a", "status": "finished", "samples": [0]}"#,
        )]);
        let clock = Arc::new(ManualClock::new());
        let job = runner(transport.clone(), clock.clone())
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap();
        assert_eq!(job.polls, 0);
        assert!(clock.sleeps().is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_finished_with_error_fails() {
        let transport = ScriptedTransport::new([
            (200, r#"{"id": 1, "status": "queued"}"#),
            (200, r#"{"id": 1, "status": "finished", "samples": [0], "ERROR": "Error happened."}"#),
        ]);
        let err = runner(transport, Arc::new(ManualClock::new()))
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Something went wrong with the request, got the error message: Error happened."
        );
    }

    #[tokio::test]
    async fn test_error_status_without_message_fails() {
        let transport = ScriptedTransport::new([
            (200, r#"{"id": 1, "status": "queued"}"#),
            (200, r#"{"id": 1, "status": "error"}"#),
        ]);
        let err = runner(transport, Arc::new(ManualClock::new()))
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, AqtError::JobFailed(ref msg) if msg.contains("error")));
    }

    #[tokio::test]
    async fn test_invalid_submission_status() {
        let transport = ScriptedTransport::new([(404, "not found")]);
        let err = runner(transport.clone(), Arc::new(ManualClock::new()))
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, AqtError::ApiError { status: 404, .. }));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_max_attempts_timeout() {
        let transport = ScriptedTransport::new([(200, r#"{"id": 3, "status": "queued"}"#)]);
        let clock = Arc::new(ManualClock::new());
        let mut runner = runner(transport.clone(), clock.clone());
        runner.set_policy(runner.policy().with_max_attempts(5));

        let err = runner
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, AqtError::Timeout(ref id) if id == "3"));
        assert_eq!(transport.requests().len(), 6);
        assert_eq!(clock.sleeps().len(), 5);
    }

    #[tokio::test]
    async fn test_deadline_timeout() {
        let transport = ScriptedTransport::new([(200, r#"{"id": 3, "status": "queued"}"#)]);
        let clock = Arc::new(ManualClock::new());
        let mut runner = runner(transport, clock.clone());
        runner.set_policy(
            PollPolicy::from_secs_f64(1.0)
                .unwrap()
                .with_deadline(Duration::from_secs(3)),
        );

        let err = runner
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, AqtError::Timeout(_)));
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_post_method() {
        let transport = ScriptedTransport::new([(
            202,
            r#"{"id": 1, "status": "finished", "samples": []}"#,
        )]);
        runner(transport.clone(), Arc::new(ManualClock::new()))
            .with_method(HttpMethod::Post)
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap();
        assert_eq!(transport.requests()[0].method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn test_missing_job_id() {
        let transport = ScriptedTransport::new([(200, r#"{"status": "queued"}"#)]);
        let err = runner(transport, Arc::new(ManualClock::new()))
            .execute("u", &Headers::new(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, AqtError::MissingJobId(ref status) if status == "queued"));
    }
}
