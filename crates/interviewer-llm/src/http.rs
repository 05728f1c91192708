use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, trace};

use crate::GenerationError;

/// Utility for sending generation requests over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Non-success statuses are surfaced as [`GenerationError::Status`] with the
    /// response body attached.
    pub async fn post_json<B, R>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
    ) -> Result<R, GenerationError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let start = Instant::now();
        debug!(url, "Sending generation request");

        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(transport_error)?;
        trace!(body = %text, "Generation response");

        debug!(
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Generation request completed"
        );

        serde_json::from_str(&text).map_err(|e| {
            GenerationError::Schema(format!("unexpected response envelope: {}", e))
        })
    }
}

/// Request URLs can carry credentials; keep them out of error text
fn transport_error(err: reqwest::Error) -> GenerationError {
    GenerationError::Transport(err.without_url())
}
