//! End-to-end reply generation for one incoming message: context,
//! augmentation, completion, cleanup. `generate` never fails outward;
//! every failure path degrades to a fixed Thai notice so the channel
//! layer always has something to send.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;

use phlam_memory::{MemoryStore, DEFAULT_TIMEZONE};
use phlam_provider::{format_hits, responses::NO_OUTPUT_TEXT, CompletionBackend, WebSearch};
use phlam_schema::CompletionRequest;

use crate::gate::SearchGate;
use crate::normalize::normalize;
use crate::prompt;
use crate::queries::is_greeting;

/// Sent when the completion succeeded at transport level but carried no
/// readable output text.
pub const EXTRACTION_FALLBACK: &str = "⚠️ ไม่สามารถอ่านผลลัพธ์จาก GPT ได้";

/// Sent when the completion call itself failed.
pub const GENERIC_FALLBACK: &str = "⚠️ เกิดข้อผิดพลาดที่ไม่คาดคิด";

const ANSWER_MAX_TOKENS: u32 = 512;

const CITY_MARKERS: [(&str, &str); 4] = [
    ("กรุงเทพ", "กรุงเทพฯ"),
    ("เชียงใหม่", "เชียงใหม่"),
    ("ภูเก็ต", "ภูเก็ต"),
    ("ขอนแก่น", "ขอนแก่น"),
];

/// Current-conditions lookup used to augment weather questions.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn report(&self, city: &str) -> Result<String>;
}

pub struct Orchestrator {
    backend: Arc<dyn CompletionBackend>,
    gate: SearchGate,
    search: Arc<dyn WebSearch>,
    weather: Option<Arc<dyn WeatherSource>>,
    memory: MemoryStore,
    model: String,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        gate: SearchGate,
        search: Arc<dyn WebSearch>,
        memory: MemoryStore,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            gate,
            search,
            weather: None,
            memory,
            model: model.into(),
        }
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherSource>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Produces the reply for one user message. Augmentation steps are
    /// best-effort; only the final completion call decides between a
    /// real answer and a fallback notice.
    pub async fn generate(&self, user_id: i64, text: &str) -> String {
        let zone_name = match self.memory.timezone(user_id).await {
            Ok(zone) => zone,
            Err(err) => {
                tracing::warn!(user_id, "timezone lookup failed, using default: {err}");
                DEFAULT_TIMEZONE.to_string()
            }
        };
        let zone: Tz = zone_name.parse().unwrap_or(chrono_tz::Asia::Bangkok);
        let system = prompt::system_prompt(&zone_name, Utc::now().with_timezone(&zone));

        let mut question = text.trim().to_string();
        if !is_greeting(&question) {
            let previous = best_effort(
                "previous question lookup",
                self.memory.previous_question(user_id),
            )
            .await
            .flatten();
            if let Some(previous) = previous {
                question = prompt::with_previous_question(&question, &previous);
            }
        }

        if self.gate.needs_search(&question).await {
            tracing::info!("augmenting with web search");
            if let Some(hits) = best_effort("web search", self.search.search(&question)).await {
                if !hits.is_empty() {
                    question = format!(
                        "ข้อมูลจากการค้นหาเว็บ:\n{}\n\nคำถาม: {question}",
                        format_hits(&hits)
                    );
                }
            }
        }

        // Plain "อากาศ" questions never get here (the topic router answers
        // them); the marker arrives via the prior-question prepend or a
        // search block.
        if let Some(weather) = &self.weather {
            if question.contains("อากาศ") {
                let city = detect_city(&question);
                tracing::info!(city, "augmenting with weather report");
                if let Some(info) = best_effort("weather report", weather.report(city)).await {
                    question =
                        format!("🌦️ ข้อมูลสภาพอากาศใน {city}: {info}\n\nคำถาม: {question}");
                }
            }
        }

        let input = prompt::build_input(&system, &question);
        let request = CompletionRequest::short(&self.model, input, ANSWER_MAX_TOKENS);
        match self.backend.complete(request).await {
            Ok(answer) => normalize(&answer),
            Err(err) if err.to_string().contains(NO_OUTPUT_TEXT) => {
                tracing::error!(user_id, "completion had no readable output: {err}");
                EXTRACTION_FALLBACK.to_string()
            }
            Err(err) => {
                tracing::error!(user_id, "completion failed: {err}");
                GENERIC_FALLBACK.to_string()
            }
        }
    }
}

/// Runs a fallible augmentation step; a failure is logged and turned
/// into `None` so the reply flow continues without it.
async fn best_effort<T>(stage: &str, fut: impl Future<Output = Result<T>>) -> Option<T> {
    match fut.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("{stage} failed, continuing without it: {err}");
            None
        }
    }
}

fn detect_city(text: &str) -> &'static str {
    CITY_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, city)| *city)
        .unwrap_or("กรุงเทพฯ")
}
