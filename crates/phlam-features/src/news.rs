//! Daily Thai and global news digests, rendered from web search hits.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use phlam_provider::WebSearch;
use phlam_schema::SearchHit;

const DAILY_QUERY: &str = "ข่าววันนี้ ประเทศไทย ล่าสุด";
const GLOBAL_QUERY: &str = "world news today top stories";

pub struct NewsFeed {
    search: Arc<dyn WebSearch>,
}

impl NewsFeed {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }

    pub async fn daily(&self) -> Result<String> {
        let hits = self.search.search(DAILY_QUERY).await?;
        render_digest("📰 ข่าวเด่นวันนี้", &hits)
    }

    pub async fn global(&self) -> Result<String> {
        let hits = self.search.search(GLOBAL_QUERY).await?;
        render_digest("🌍 ข่าวรอบโลกวันนี้", &hits)
    }
}

fn render_digest(header: &str, hits: &[SearchHit]) -> Result<String> {
    if hits.is_empty() {
        return Err(anyhow!("news search returned no usable hits"));
    }
    let mut lines = vec![header.to_string()];
    for hit in hits {
        lines.push(format!("• {}: {}", hit.title, hit.snippet));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSearch {
        queries: Mutex<Vec<String>>,
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl WebSearch for RecordingSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.hits.clone())
        }
    }

    fn hit(title: &str, snippet: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[tokio::test]
    async fn daily_digest_uses_thai_query_and_bullets() {
        let search = Arc::new(RecordingSearch {
            queries: Mutex::new(Vec::new()),
            hits: vec![hit("หัวข้อข่าว", "รายละเอียดสั้น ๆ")],
        });
        let feed = NewsFeed::new(search.clone());

        let text = feed.daily().await.unwrap();
        assert!(text.starts_with("📰 ข่าวเด่นวันนี้"));
        assert!(text.contains("• หัวข้อข่าว: รายละเอียดสั้น ๆ"));
        assert_eq!(search.queries.lock().unwrap().as_slice(), [DAILY_QUERY]);
    }

    #[tokio::test]
    async fn global_digest_uses_global_query() {
        let search = Arc::new(RecordingSearch {
            queries: Mutex::new(Vec::new()),
            hits: vec![hit("Headline", "Summary")],
        });
        let feed = NewsFeed::new(search.clone());

        let text = feed.global().await.unwrap();
        assert!(text.starts_with("🌍 ข่าวรอบโลกวันนี้"));
        assert_eq!(search.queries.lock().unwrap().as_slice(), [GLOBAL_QUERY]);
    }

    #[tokio::test]
    async fn empty_hits_become_an_error() {
        let search = Arc::new(RecordingSearch {
            queries: Mutex::new(Vec::new()),
            hits: Vec::new(),
        });
        let feed = NewsFeed::new(search);
        assert!(feed.daily().await.is_err());
    }
}
