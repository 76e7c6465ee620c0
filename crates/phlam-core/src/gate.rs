use std::sync::Arc;

use phlam_provider::CompletionBackend;
use phlam_schema::CompletionRequest;

/// Markers for an explicit fresh-information request. Checked before any
/// backend call; matching one settles the decision for free.
const FORCE_KEYWORDS: [&str; 8] = [
    "หา:",
    "ค้นหา:",
    "ขอข้อมูล",
    "มีข้อมูลใหม่",
    "ข้อมูลล่าสุด",
    "update",
    "เพิ่มเติม",
    "อัปเดต",
];

const NEED_SEARCH: &str = "need_search";

/// Decides whether a question needs live web augmentation. Force keywords
/// short-circuit; otherwise a single short completion call judges it.
/// A failed or unparseable judgement falls open to "no search".
pub struct SearchGate {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl SearchGate {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn is_force_search(text: &str) -> bool {
        let text = text.to_lowercase();
        FORCE_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    }

    pub async fn needs_search(&self, question: &str) -> bool {
        if Self::is_force_search(question) {
            tracing::info!("force-search keyword present, skipping judgement call");
            return true;
        }

        let prompt = decision_prompt(question);
        match self
            .backend
            .complete(CompletionRequest::short(&self.model, prompt, 5))
            .await
        {
            Ok(token) => {
                let decision = token.trim().to_lowercase() == NEED_SEARCH;
                tracing::info!(decision, token = token.trim(), "search judgement");
                decision
            }
            Err(err) => {
                tracing::error!("search judgement failed, assuming no search: {err}");
                false
            }
        }
    }
}

fn decision_prompt(question: &str) -> String {
    format!(
        "ตัดสินใจ:\n\
         - \"no_search\" ถ้าคำถามตอบได้จากความรู้ทั่วไป\n\
         - \"need_search\" ถ้าคำถามเกี่ยวกับข่าว เหตุการณ์ปัจจุบัน ราคาสินค้า อากาศ หวย ฯลฯ\n\
         \n\
         คำถาม: {question}\n\
         \n\
         ตอบสั้น ๆ ว่า:"
    )
}
