pub mod config;

pub use config::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed question/answer exchange for a user. Ordering is implicit
/// in storage; `at` records when the turn finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_id: i64,
    pub question: String,
    pub response: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(user_id: i64, question: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_id,
            question: question.into(),
            response: response.into(),
            at: Utc::now(),
        }
    }
}

/// Quick-answer topics, in router priority order. Each maps to exactly one
/// feature fetcher; classification never composes two.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Oil,
    Gold,
    Lotto,
    Exchange,
    Weather,
    GlobalNews,
    News,
    Tarot,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oil => "oil",
            Self::Gold => "gold",
            Self::Lotto => "lotto",
            Self::Exchange => "exchange",
            Self::Weather => "weather",
            Self::GlobalNews => "global_news",
            Self::News => "news",
            Self::Tarot => "tarot",
        }
    }
}

/// Follow-up menu selections after the tarot prompt. Matched as exact
/// Thai literals, not patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TarotTopic {
    Love,
    Career,
    Finance,
    Health,
}

impl TarotTopic {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "ความรัก" => Some(Self::Love),
            "การงาน" => Some(Self::Career),
            "การเงิน" => Some(Self::Finance),
            "สุขภาพ" => Some(Self::Health),
            _ => None,
        }
    }

    pub fn thai_name(&self) -> &'static str {
        match self {
            Self::Love => "ความรัก",
            Self::Career => "การงาน",
            Self::Finance => "การเงิน",
            Self::Health => "สุขภาพ",
        }
    }
}

/// One ranked web-search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

/// A single stateless completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub input: String,
    pub max_output_tokens: u32,
    /// Reasoning effort hint ("minimal" for everything in this bot).
    pub effort: String,
    /// Output verbosity hint.
    pub verbosity: String,
}

impl CompletionRequest {
    pub fn short(model: impl Into<String>, input: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            max_output_tokens,
            effort: "minimal".to_string(),
            verbosity: "low".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tarot_topic_parses_exact_literals() {
        assert_eq!(TarotTopic::parse("ความรัก"), Some(TarotTopic::Love));
        assert_eq!(TarotTopic::parse(" การงาน "), Some(TarotTopic::Career));
        assert_eq!(TarotTopic::parse("การเงิน"), Some(TarotTopic::Finance));
        assert_eq!(TarotTopic::parse("สุขภาพ"), Some(TarotTopic::Health));
    }

    #[test]
    fn tarot_topic_rejects_non_literals() {
        assert_eq!(TarotTopic::parse("ความรักของฉัน"), None);
        assert_eq!(TarotTopic::parse("love"), None);
        assert_eq!(TarotTopic::parse(""), None);
    }

    #[test]
    fn topic_serializes_snake_case() {
        let json = serde_json::to_string(&Topic::GlobalNews).unwrap();
        assert_eq!(json, "\"global_news\"");
    }

    #[test]
    fn completion_request_short_defaults() {
        let req = CompletionRequest::short("gpt-5-nano", "q", 5);
        assert_eq!(req.effort, "minimal");
        assert_eq!(req.verbosity, "low");
        assert_eq!(req.max_output_tokens, 5);
    }
}
