//! Submits completed forms to the camp REST API.

use camp_core::{Receipt, Submission, SubmissionSink};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach the API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the API rejected the form: {0}")]
    Rejected(String),
    #[error("the API answered {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    order_id: Option<u64>,
    #[serde(default)]
    payment_url: Option<String>,
}

/// A [`SubmissionSink`] that posts the record to `/api/forms/{form}/submit`.
#[derive(Debug, Clone)]
pub struct ApiSink {
    client: reqwest::Client,
    base_url: String,
}

impl ApiSink {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn submit_url(&self, submission: &Submission) -> String {
        format!("{}/api/forms/{}/submit", self.base_url, submission.form)
    }
}

impl SubmissionSink for ApiSink {
    type Error = ApiError;

    async fn submit(&self, submission: &Submission) -> Result<Receipt, ApiError> {
        let response = self
            .client
            .post(self.submit_url(submission))
            .json(&submission.record)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 400 {
            let body: Value = response.json().await?;
            let detail = body
                .get("errors")
                .or_else(|| body.get("error"))
                .map(Value::to_string)
                .unwrap_or_default();
            return Err(ApiError::Rejected(detail));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SubmitBody = response.json().await?;
        Ok(match (body.order_id, body.payment_url) {
            (Some(order_id), Some(payment_url)) => Receipt::Order {
                order_id,
                payment_url,
            },
            _ => Receipt::Appended,
        })
    }
}
