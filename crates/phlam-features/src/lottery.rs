//! Thai government lottery results.

use anyhow::{anyhow, Result};
use serde::Deserialize;

const FIRST_PRIZE: &str = "prizeFirst";
const FRONT_THREE: &str = "runningNumberFrontThree";
const BACK_THREE: &str = "runningNumberBackThree";
const BACK_TWO: &str = "runningNumberBackTwo";

#[derive(Debug, Clone)]
pub struct LotteryClient {
    client: reqwest::Client,
    api_base: String,
}

impl LotteryClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn latest_draw(&self) -> Result<String> {
        let url = format!("{}/latest", self.api_base);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("lottery feed error ({status})"));
        }
        let body: LotteryResponse = resp.json().await?;
        render_draw(&body.response)
    }
}

fn render_draw(draw: &Draw) -> Result<String> {
    let first = draw
        .prizes
        .iter()
        .find(|prize| prize.id == FIRST_PRIZE)
        .ok_or_else(|| anyhow!("lottery feed missing first prize"))?;

    let running = |id: &str| {
        draw.running_numbers
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.number.join(", "))
            .unwrap_or_else(|| "-".to_string())
    };

    Ok(format!(
        "🎉 ผลสลากกินแบ่งรัฐบาล งวดวันที่ {}\n\
         • รางวัลที่ 1: {}\n\
         • เลขหน้า 3 ตัว: {}\n\
         • เลขท้าย 3 ตัว: {}\n\
         • เลขท้าย 2 ตัว: {}",
        draw.date,
        first.number.join(", "),
        running(FRONT_THREE),
        running(BACK_THREE),
        running(BACK_TWO),
    ))
}

#[derive(Debug, Deserialize)]
struct LotteryResponse {
    response: Draw,
}

#[derive(Debug, Deserialize)]
struct Draw {
    date: String,
    #[serde(default)]
    prizes: Vec<NumberSet>,
    #[serde(default, rename = "runningNumbers")]
    running_numbers: Vec<NumberSet>,
}

#[derive(Debug, Deserialize)]
struct NumberSet {
    id: String,
    #[serde(default)]
    number: Vec<String>,
}
