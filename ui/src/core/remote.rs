//! HTTP clients for the two remote collaborators: language detection and
//! explanation generation.
//!
//! Both clients catch every network-layer fault at this boundary and hand
//! the orchestrator a defined outcome. Detection degrades silently to the
//! default code; explanation surfaces a typed error the orchestrator maps
//! to a user-facing message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::ServiceConfig;
use crate::core::{catalog, detect, timing};

/// Inputs shorter than this go to the remote detector; longer texts are
/// resolved locally by script ranges (short text is ambiguous, long text is
/// cheap to classify without a round-trip).
pub const SHORT_TEXT_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service answered with status {0}")]
    Status(u16),
    #[error("malformed response payload: {0}")]
    Decode(String),
    #[error("no answer within {0} ms")]
    Timeout(u64),
}

/// Value object assembled by the orchestrator immediately before dispatch.
/// Carries the *display name* of the resolved language, not its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationRequest {
    pub word: String,
    pub age: u8,
    pub language: String,
}

#[derive(Debug, Serialize)]
struct DetectBody<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectReply {
    detected_language: String,
}

#[derive(Debug, Serialize)]
struct ExplainBody<'a> {
    word: &'a str,
    age: u8,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExplainReply {
    explanation: String,
}

/// Client for `POST {base}/api/detect-language`.
#[derive(Debug, Clone)]
pub struct DetectionClient {
    config: ServiceConfig,
    http: reqwest::Client,
}

impl DetectionClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Best-effort language code for `text`. Never fails outward: blank
    /// input and every internal error resolve to the default code.
    pub async fn detect(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return catalog::DEFAULT.to_string();
        }

        if text.chars().count() >= SHORT_TEXT_LIMIT {
            return detect::detect(text).to_string();
        }

        match self.request(text).await {
            // The sentinel is never a valid *detection* outcome.
            Ok(code) if catalog::is_known(&code) && code != catalog::AUTO => code,
            Ok(_) => catalog::DEFAULT.to_string(),
            Err(_err) => {
                #[cfg(debug_assertions)]
                eprintln!("[remote] detection degraded to default: {_err}");
                catalog::DEFAULT.to_string()
            }
        }
    }

    async fn request(&self, text: &str) -> Result<String, RemoteError> {
        let response = self
            .http
            .post(format!("{}/api/detect-language", self.config.base_url))
            .json(&DetectBody { text })
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        let reply: DetectReply = response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))?;
        Ok(reply.detected_language)
    }
}

/// Client for `POST {base}/api/explain`. Single attempt per invocation; any
/// retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct ExplanationClient {
    config: ServiceConfig,
    http: reqwest::Client,
}

impl ExplanationClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Fetch an explanation. The whole round-trip (send + decode) is raced
    /// against the configured bound so a hung service cannot wedge the
    /// orchestrator in its explaining state.
    pub async fn explain(&self, request: &ExplanationRequest) -> Result<String, RemoteError> {
        let limit = self.config.explain_timeout_ms;
        bounded(self.request(request), limit)
            .await
            .unwrap_or(Err(RemoteError::Timeout(limit)))
    }

    async fn request(&self, request: &ExplanationRequest) -> Result<String, RemoteError> {
        let response = self
            .http
            .post(format!("{}/api/explain", self.config.base_url))
            .json(&ExplainBody {
                word: &request.word,
                age: request.age,
                language: &request.language,
            })
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        let reply: ExplainReply = response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))?;
        Ok(reply.explanation)
    }
}

/// Resolve `future`, or `None` once `limit_ms` elapses first.
async fn bounded<F>(future: F, limit_ms: u64) -> Option<F::Output>
where
    F: std::future::Future,
{
    use futures_util::future::{select, Either};

    let future = std::pin::pin!(future);
    let deadline = std::pin::pin!(timing::sleep_ms(limit_ms));

    match select(future, deadline).await {
        Either::Left((value, _)) => Some(value),
        Either::Right(((), _)) => None,
    }
}
