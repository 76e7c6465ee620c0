use anyhow::{anyhow, Result};
use async_trait::async_trait;
use phlam_schema::SearchHit;
use serde::Deserialize;

use crate::WebSearch;

const RESULT_COUNT: u32 = 3;

/// Google Custom Search client. Results keep API ranking order.
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    client: reqwest::Client,
    api_key: String,
    cse_id: String,
    api_base: String,
}

impl GoogleSearch {
    pub fn new(
        api_key: impl Into<String>,
        cse_id: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            cse_id: cse_id.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WebSearch for GoogleSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = format!("{}/customsearch/v1", self.api_base);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", &RESULT_COUNT.to_string()),
                ("safe", "off"),
                ("hl", "th"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("google cse error ({status}): {body}"));
        }

        let body: CseResponse = resp.json().await?;
        Ok(collect_hits(body))
    }
}

fn collect_hits(body: CseResponse) -> Vec<SearchHit> {
    body.items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.unwrap_or_default().trim().to_string();
            let snippet = item.snippet.unwrap_or_default().trim().to_string();
            (!title.is_empty() && !snippet.is_empty()).then_some(SearchHit { title, snippet })
        })
        .collect()
}

/// Renders hits for prompt injection, one "title: snippet" line each.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("{}: {}", hit.title, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_hits_joins_lines() {
        let hits = vec![
            SearchHit {
                title: "ราคาทอง".into(),
                snippet: "ทองขึ้น 50 บาท".into(),
            },
            SearchHit {
                title: "Gold".into(),
                snippet: "up today".into(),
            },
        ];
        assert_eq!(
            format_hits(&hits),
            "ราคาทอง: ทองขึ้น 50 บาท\nGold: up today"
        );
    }

    #[test]
    fn format_hits_empty_is_empty() {
        assert_eq!(format_hits(&[]), "");
    }

    #[test]
    fn cse_response_skips_incomplete_items() {
        let body: CseResponse = serde_json::from_value(serde_json::json!({
            "items": [
                {"title": "มีครบ", "snippet": "ใช้ได้"},
                {"title": "", "snippet": "ไม่มีหัวข้อ"},
                {"title": "ไม่มีเนื้อหา"},
                {}
            ]
        }))
        .unwrap();
        let hits = collect_hits(body);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "มีครบ");
    }

    #[test]
    fn cse_response_without_items_field() {
        let body: CseResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(body.items.is_empty());
    }
}
