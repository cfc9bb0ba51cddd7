//! # Request Executor
//!
//! Sends the single HTTP request a completed dialogue describes and condenses
//! whatever happened into one [`Outcome`]. Any answer from the server is a
//! normal outcome whatever its status; only transport problems count as
//! failures. The response body is streamed and cut at a fixed cap.

use crate::application::session::{HttpMethod, Session};
use crate::domain::types::Outcome;
use bytes::BytesMut;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Hard ceiling on one request, connect through body.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Characters of response body quoted back into the chat.
pub const RESULT_BODY_CAP: usize = 3500;

/// Bytes pulled off the wire before the read stops looking for more
/// characters. The widest UTF-8 character is four bytes.
const RESULT_BODY_BYTE_BUDGET: usize = 4 * RESULT_BODY_CAP;

#[derive(Error, Debug)]
enum RequestFailure {
    #[error("the request timed out")]
    Timeout,
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("transport failed: {0}")]
    Transport(String),
}

pub struct RequestExecutor {
    http_client: Client,
}

impl RequestExecutor {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    fn with_timeout(timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { http_client }
    }

    /// Run the request the session describes and report what happened.
    pub async fn execute(&self, session: &Session) -> Outcome {
        match self.run(session).await {
            Ok(outcome) => outcome,
            Err(failure) => Outcome::Failed {
                reason: failure.to_string(),
            },
        }
    }

    async fn run(&self, session: &Session) -> Result<Outcome, RequestFailure> {
        // The engine only starts an execution once these are captured.
        let (Some(url), Some(method)) = (session.url.as_deref(), session.method) else {
            return Ok(Outcome::Failed {
                reason: "the request was never fully described".to_string(),
            });
        };

        let mut request = match method {
            HttpMethod::Get => self.http_client.get(url),
            HttpMethod::Post => self.http_client.post(url),
        };
        if let Some(token) = &session.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = &session.body {
            request = request.json(body);
        }

        tracing::info!("Executing {} {}", method.as_str(), url);
        let response = request.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let (body, truncated) = read_capped_body(response).await?;

        Ok(Outcome::Response {
            status,
            body,
            truncated,
        })
    }
}

fn classify(error: reqwest::Error) -> RequestFailure {
    if error.is_timeout() {
        RequestFailure::Timeout
    } else if error.is_connect() {
        RequestFailure::Connect(error.to_string())
    } else {
        RequestFailure::Transport(error.to_string())
    }
}

/// Read at most [`RESULT_BODY_CAP`] characters of body, reporting whether
/// anything was left behind.
async fn read_capped_body(response: reqwest::Response) -> Result<(String, bool), RequestFailure> {
    let mut raw = BytesMut::new();
    let mut bytes_left_behind = false;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(classify)?;
        raw.extend_from_slice(&chunk);
        if raw.len() >= RESULT_BODY_BYTE_BUDGET {
            // A body ending exactly on the budget is complete, not
            // truncated; only a further byte proves a cut.
            bytes_left_behind = stream_has_more(&mut stream).await?;
            break;
        }
    }

    let text = String::from_utf8_lossy(&raw);
    let mut chars = text.chars();
    let body: String = chars.by_ref().take(RESULT_BODY_CAP).collect();
    let truncated = bytes_left_behind || chars.next().is_some();
    Ok((body, truncated))
}

/// True when the stream still carries at least one byte. Empty chunks are
/// skipped, not counted.
async fn stream_has_more<S>(stream: &mut S) -> Result<bool, RequestFailure>
where
    S: futures::Stream<Item = reqwest::Result<bytes::Bytes>> + Unpin,
{
    while let Some(chunk) = stream.next().await {
        if !chunk.map_err(classify)?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}
