use anyhow::{anyhow, Result};
use async_trait::async_trait;
use phlam_schema::CompletionRequest;
use serde::{Deserialize, Serialize};

use crate::{CompletionBackend, ProviderErrorKind};

/// Marker carried by errors where the call succeeded but no text segment
/// could be extracted from the payload. Callers use it to surface a fallback
/// string distinct from the transport-failure one.
pub const NO_OUTPUT_TEXT: &str = "no output_text segment";

/// OpenAI Responses API client. One retry on timeout/5xx, none on 4xx.
#[derive(Debug, Clone)]
pub struct OpenAiResponses {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl OpenAiResponses {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn to_api_request(request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            input: request.input.clone(),
            max_output_tokens: request.max_output_tokens,
            reasoning: ApiReasoning {
                effort: request.effort.clone(),
            },
            text: ApiTextOpts {
                verbosity: request.verbosity.clone(),
            },
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiResponses {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let url = format!("{}/v1/responses", self.api_base);
        let payload = Self::to_api_request(&request);

        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 0..2 {
            let resp = match self
                .client
                .post(&url)
                .header("authorization", format!("Bearer {}", self.api_key))
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    tracing::warn!("openai responses timeout (attempt {})", attempt + 1);
                    last_err = Some(anyhow!("openai responses timeout [retryable]"));
                    continue;
                }
                Err(e) => return Err(anyhow!("openai responses transport error: {e}")),
            };

            let status = resp.status();
            if status.is_success() {
                let body: ApiResponse = resp.json().await?;
                return extract_output_text(&body)
                    .ok_or_else(|| anyhow!("openai responses: {NO_OUTPUT_TEXT}"));
            }

            let kind = ProviderErrorKind::from_status(status);
            let body = resp.text().await.unwrap_or_default();
            if kind.is_retryable() {
                tracing::warn!("openai responses {status} (attempt {}), retrying", attempt + 1);
                last_err = Some(anyhow!("openai responses error ({status}) [retryable]"));
                continue;
            }
            // 4xx is terminal; the body is the only diagnostic we get.
            tracing::error!("openai responses {status}: {body}");
            return Err(anyhow!("openai responses error ({status}): {body}"));
        }

        Err(last_err.unwrap_or_else(|| anyhow!("openai responses: retries exhausted")))
    }
}

/// First `message` output item, first `output_text` content entry.
fn extract_output_text(body: &ApiResponse) -> Option<String> {
    body.output
        .iter()
        .filter(|item| item.item_type == "message")
        .flat_map(|item| item.content.iter())
        .find(|c| c.content_type == "output_text")
        .and_then(|c| c.text.clone())
}

#[derive(Debug, Clone, Serialize)]
struct ApiRequest {
    model: String,
    input: String,
    max_output_tokens: u32,
    reasoning: ApiReasoning,
    text: ApiTextOpts,
}

#[derive(Debug, Clone, Serialize)]
struct ApiReasoning {
    effort: String,
}

#[derive(Debug, Clone, Serialize)]
struct ApiTextOpts {
    verbosity: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    output: Vec<ApiOutputItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiOutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<ApiContentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiContentEntry {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}
