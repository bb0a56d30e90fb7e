use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::errors::SubmissionError;
use crate::submission::{SubmissionResponse, SubmissionTransport};

const SUBMISSION_ID_HEADER: &str = "X-Submission-Id";

/// JSON-over-HTTP transport backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, SubmissionError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("quote_core/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl SubmissionTransport for HttpTransport {
    fn send(
        &self,
        endpoint: &str,
        reference: Uuid,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<SubmissionResponse, SubmissionError>> + Send {
        let request = self
            .client
            .post(endpoint)
            .header(SUBMISSION_ID_HEADER, reference.to_string())
            .json(body);

        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), %detail, "endpoint returned an error status");
                return Err(SubmissionError::Status {
                    status: status.as_u16(),
                });
            }

            let text = response.text().await?;
            serde_json::from_str::<SubmissionResponse>(&text)
                .map_err(|err| SubmissionError::MalformedResponse(err.to_string()))
        }
    }
}
