//! Daily THB exchange rates.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Currencies shown in the quick answer, in display order.
const SHOWN: [(&str, &str); 4] = [
    ("USD", "ดอลลาร์สหรัฐ"),
    ("EUR", "ยูโร"),
    ("JPY", "เยน (100)"),
    ("CNY", "หยวน"),
];

#[derive(Debug, Clone)]
pub struct ExchangeClient {
    client: reqwest::Client,
    api_base: String,
}

impl ExchangeClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn today(&self) -> Result<String> {
        let url = format!("{}/v6/latest/THB", self.api_base);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("exchange rate feed error ({status})"));
        }
        let body: RatesResponse = resp.json().await?;
        render_rates(&body.rates)
    }
}

/// The feed quotes 1 THB in each currency; the answer shows the inverse
/// (1 unit of foreign currency in THB), with JPY quoted per 100.
fn render_rates(rates: &HashMap<String, f64>) -> Result<String> {
    let mut lines = vec!["💱 อัตราแลกเปลี่ยนวันนี้ (เงินบาท)".to_string()];
    for (code, thai_name) in SHOWN {
        let rate = rates
            .get(code)
            .copied()
            .filter(|rate| *rate > 0.0)
            .ok_or_else(|| anyhow!("exchange rate feed missing {code}"))?;
        let mut thb = 1.0 / rate;
        if code == "JPY" {
            thb *= 100.0;
        }
        lines.push(format!("• {thai_name} ({code}): {thb:.2} บาท"));
    }
    Ok(lines.join("\n"))
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}
