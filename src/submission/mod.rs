//! Hands a finished form to the lead endpoint.
//!
//! The honeypot is checked before anything is sent. Every failure, spam trap
//! included, is reported to the visitor with the same fallback message so the
//! cause never leaks.

mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SubmissionError;

pub use http::HttpTransport;

/// UI-facing state of the submit control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error(String),
}

impl SubmissionStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }
}

/// Body returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Proof of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub reference: Uuid,
}

/// Outbound leg of a submission.
pub trait SubmissionTransport {
    fn send(
        &self,
        endpoint: &str,
        reference: Uuid,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<SubmissionResponse, SubmissionError>> + Send;
}

/// Notified after a submission succeeds. Implementations must not block.
pub trait SubmissionObserver: Send + Sync {
    fn submitted(&self, form: &str, reference: Uuid);
}

/// Default observer: a structured tracing event that log shippers can pick up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SubmissionObserver for TracingObserver {
    fn submitted(&self, form: &str, reference: Uuid) {
        tracing::info!(target: "quote_core::events", form, %reference, "lead_submitted");
    }
}

pub struct SubmissionHandler<T> {
    transport: T,
    endpoint: String,
    fallback_phone: String,
    observer: Box<dyn SubmissionObserver>,
}

impl<T: SubmissionTransport> SubmissionHandler<T> {
    pub fn new(transport: T, endpoint: impl Into<String>, fallback_phone: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            fallback_phone: fallback_phone.into(),
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl SubmissionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Message shown for every kind of failure.
    pub fn fallback_message(&self) -> String {
        format!(
            "We couldn't submit your request. Please call us at {}.",
            self.fallback_phone
        )
    }

    /// Sends `payload` unless the honeypot was filled. No retries.
    pub async fn submit<P: Serialize>(
        &self,
        form: &str,
        honeypot: Option<&str>,
        payload: &P,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if honeypot.is_some_and(|value| !value.trim().is_empty()) {
            tracing::warn!(form, "honeypot field filled; dropping submission");
            return Err(SubmissionError::SpamDetected);
        }

        let body = serde_json::to_value(payload)?;
        let reference = Uuid::new_v4();
        tracing::debug!(form, %reference, endpoint = %self.endpoint, "sending submission");

        let response = self.transport.send(&self.endpoint, reference, &body).await?;
        if !response.success {
            return Err(SubmissionError::Rejected(response.error));
        }

        tracing::info!(form, %reference, "submission accepted");
        self.observer.submitted(form, reference);
        Ok(SubmissionReceipt { reference })
    }
}
