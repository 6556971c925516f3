use crate::error::{SinkError, SinkResult};
use reqwest::{Client, Response};
use std::time::Duration;

const USER_AGENT: &str = concat!("camp-sinks/", env!("CARGO_PKG_VERSION"));

pub(crate) fn client() -> SinkResult<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SinkError::Client(e.to_string()))
}

/// Turns a non-2xx response into [`SinkError::Http`] carrying the body text.
pub(crate) async fn ensure_success(response: Response) -> SinkResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read response body".to_string());
    Err(SinkError::Http {
        status: Some(status.as_u16()),
        message,
    })
}

pub(crate) fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
