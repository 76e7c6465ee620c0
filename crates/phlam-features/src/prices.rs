//! Thai gold and retail oil price lookups.

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Client for the Thai gold/oil price JSON feeds. Both answers come
/// from the same host, so one client serves both topics.
#[derive(Debug, Clone)]
pub struct PriceClient {
    client: reqwest::Client,
    api_base: String,
}

impl PriceClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn gold_today(&self) -> Result<String> {
        let url = format!("{}/thai-gold-api/latest", self.api_base);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("gold price feed error ({status})"));
        }
        let body: GoldResponse = resp.json().await?;
        Ok(render_gold(&body.response))
    }

    pub async fn oil_today(&self) -> Result<String> {
        let url = format!("{}/thai-oil-api/latest", self.api_base);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("oil price feed error ({status})"));
        }
        let body: OilResponse = resp.json().await?;
        Ok(render_oil(&body.response))
    }
}

fn render_gold(gold: &GoldPrices) -> String {
    format!(
        "🪙 ราคาทองวันนี้ ({})\n\
         • ทองรูปพรรณ: รับซื้อ {} บาท / ขายออก {} บาท\n\
         • ทองแท่ง: รับซื้อ {} บาท / ขายออก {} บาท",
        gold.date,
        gold.price.gold.buy,
        gold.price.gold.sell,
        gold.price.gold_bar.buy,
        gold.price.gold_bar.sell,
    )
}

fn render_oil(oil: &OilPrices) -> String {
    let mut lines = vec![format!("⛽ ราคาน้ำมันวันนี้ ({})", oil.date)];
    for key in ["gasohol_95", "gasohol_91", "diesel"] {
        if let Some(fuel) = oil.ptt.get(key) {
            lines.push(format!("• {}: {} บาท/ลิตร", fuel.name, fuel.price));
        }
    }
    lines.join("\n")
}

#[derive(Debug, Deserialize)]
struct GoldResponse {
    response: GoldPrices,
}

#[derive(Debug, Deserialize)]
struct GoldPrices {
    date: String,
    price: GoldPriceTable,
}

#[derive(Debug, Deserialize)]
struct GoldPriceTable {
    gold: BuySell,
    gold_bar: BuySell,
}

#[derive(Debug, Deserialize)]
struct BuySell {
    buy: String,
    sell: String,
}

#[derive(Debug, Deserialize)]
struct OilResponse {
    response: OilPrices,
}

#[derive(Debug, Deserialize)]
struct OilPrices {
    date: String,
    #[serde(default)]
    ptt: std::collections::HashMap<String, Fuel>,
}

#[derive(Debug, Deserialize)]
struct Fuel {
    name: String,
    price: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn gold_today_renders_both_prices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thai-gold-api/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "response": {
                    "date": "30 สิงหาคม 2569",
                    "price": {
                        "gold": { "buy": "40,100", "sell": "40,200" },
                        "gold_bar": { "buy": "40,000", "sell": "40,100" }
                    }
                }
            })))
            .mount(&server)
            .await;

        let text = PriceClient::new(server.uri()).gold_today().await.unwrap();
        assert!(text.contains("ราคาทองวันนี้ (30 สิงหาคม 2569)"));
        assert!(text.contains("ทองรูปพรรณ: รับซื้อ 40,100 บาท / ขายออก 40,200 บาท"));
        assert!(text.contains("ทองแท่ง: รับซื้อ 40,000 บาท"));
    }

    #[tokio::test]
    async fn oil_today_lists_known_fuels_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thai-oil-api/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {
                    "date": "30/08/2569",
                    "ptt": {
                        "diesel": { "name": "ดีเซล", "price": "32.94" },
                        "gasohol_95": { "name": "แก๊สโซฮอล์ 95", "price": "35.45" },
                        "gasohol_91": { "name": "แก๊สโซฮอล์ 91", "price": "35.08" }
                    }
                }
            })))
            .mount(&server)
            .await;

        let text = PriceClient::new(server.uri()).oil_today().await.unwrap();
        let g95 = text.find("แก๊สโซฮอล์ 95: 35.45 บาท/ลิตร").unwrap();
        let diesel = text.find("ดีเซล: 32.94 บาท/ลิตร").unwrap();
        assert!(g95 < diesel);
    }

    #[tokio::test]
    async fn feed_error_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thai-gold-api/latest"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = PriceClient::new(server.uri()).gold_today().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
