pub mod responses;
pub mod search;

use anyhow::Result;
use async_trait::async_trait;
use phlam_schema::{CompletionRequest, SearchHit};

pub use responses::OpenAiResponses;
pub use search::{format_hits, GoogleSearch};

/// A stateless completion call. Implementations own their HTTP client,
/// timeout, and retry policy.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Free-text web search returning source-ranked (title, snippet) pairs.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// HTTP status classification shared by the providers. Retryable means
/// exactly one more attempt within the same call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    ServerError,
    Timeout,
    AuthError,
    InvalidRequest,
    Unknown,
}

impl ProviderErrorKind {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthError,
            400..=499 => Self::InvalidRequest,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServerError | Self::Timeout)
    }
}

/// Fixed-reply backend for tests of downstream decision logic.
pub struct StubBackend {
    pub reply: String,
}

impl StubBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_classification() {
        assert_eq!(
            ProviderErrorKind::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            ProviderErrorKind::ServerError
        );
        assert_eq!(
            ProviderErrorKind::from_status(reqwest::StatusCode::BAD_GATEWAY),
            ProviderErrorKind::ServerError
        );
        assert_eq!(
            ProviderErrorKind::from_status(reqwest::StatusCode::UNAUTHORIZED),
            ProviderErrorKind::AuthError
        );
        assert_eq!(
            ProviderErrorKind::from_status(reqwest::StatusCode::UNPROCESSABLE_ENTITY),
            ProviderErrorKind::InvalidRequest
        );
        assert!(ProviderErrorKind::ServerError.is_retryable());
        assert!(ProviderErrorKind::Timeout.is_retryable());
        assert!(!ProviderErrorKind::InvalidRequest.is_retryable());
        assert!(!ProviderErrorKind::AuthError.is_retryable());
    }

    #[tokio::test]
    async fn stub_backend_returns_fixed_reply() {
        let backend = StubBackend::new("no_search");
        let reply = backend
            .complete(CompletionRequest::short("m", "q", 5))
            .await
            .unwrap();
        assert_eq!(reply, "no_search");
    }
}
