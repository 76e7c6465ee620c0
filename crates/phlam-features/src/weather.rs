//! Current weather by Thai city, from the Open-Meteo forecast endpoint.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use phlam_core::WeatherSource;
use serde::Deserialize;

/// Cities the bot recognizes, with fixed coordinates. Geocoding a free-
/// form Thai city name is not worth a second network call for this set.
const CITIES: [(&str, f64, f64); 4] = [
    ("กรุงเทพฯ", 13.7563, 100.5018),
    ("เชียงใหม่", 18.7883, 98.9853),
    ("ภูเก็ต", 7.8804, 98.3923),
    ("ขอนแก่น", 16.4322, 102.8236),
];

pub const DEFAULT_CITY: &str = "กรุงเทพฯ";

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    api_base: String,
}

impl WeatherClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn current(&self, city: &str) -> Result<String> {
        let (name, lat, lon) = CITIES
            .iter()
            .find(|(name, _, _)| *name == city)
            .copied()
            .unwrap_or(CITIES[0]);

        let url = format!("{}/v1/forecast", self.api_base);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string().as_str()),
                ("longitude", lon.to_string().as_str()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m",
                ),
                ("timezone", "Asia/Bangkok"),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("weather feed error ({status})"));
        }
        let body: ForecastResponse = resp.json().await?;
        Ok(render_current(name, &body.current))
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn report(&self, city: &str) -> Result<String> {
        self.current(city).await
    }
}

fn render_current(city: &str, current: &Current) -> String {
    format!(
        "สภาพอากาศ{} ตอนนี้: {} อุณหภูมิ {:.1}°C ความชื้น {}% ลม {:.1} กม./ชม.",
        city,
        describe_code(current.weather_code),
        current.temperature_2m,
        current.relative_humidity_2m,
        current.wind_speed_10m,
    )
}

/// WMO weather interpretation codes, collapsed to the buckets worth
/// telling a chat user about.
fn describe_code(code: u8) -> &'static str {
    match code {
        0 => "ท้องฟ้าแจ่มใส",
        1..=2 => "มีเมฆบางส่วน",
        3 => "เมฆมาก",
        45 | 48 => "มีหมอก",
        51..=57 => "ฝนปรอย ๆ",
        61..=67 | 80..=82 => "ฝนตก",
        95..=99 => "พายุฝนฟ้าคะนอง",
        _ => "สภาพอากาศแปรปรวน",
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    relative_humidity_2m: u8,
    weather_code: u8,
    wind_speed_10m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body(code: u8) -> serde_json::Value {
        serde_json::json!({
            "current": {
                "temperature_2m": 31.4,
                "relative_humidity_2m": 62,
                "weather_code": code,
                "wind_speed_10m": 9.7
            }
        })
    }

    #[tokio::test]
    async fn known_city_uses_its_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "18.7883"))
            .and(query_param("longitude", "98.9853"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(0)))
            .mount(&server)
            .await;

        let text = WeatherClient::new(server.uri()).current("เชียงใหม่").await.unwrap();
        assert!(text.contains("สภาพอากาศเชียงใหม่ ตอนนี้"));
        assert!(text.contains("ท้องฟ้าแจ่มใส"));
        assert!(text.contains("อุณหภูมิ 31.4°C"));
        assert!(text.contains("ความชื้น 62%"));
    }

    #[tokio::test]
    async fn unknown_city_falls_back_to_bangkok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "13.7563"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(95)))
            .mount(&server)
            .await;

        let text = WeatherClient::new(server.uri()).current("เมืองที่ไม่รู้จัก").await.unwrap();
        assert!(text.contains("กรุงเทพฯ"));
        assert!(text.contains("พายุฝนฟ้าคะนอง"));
    }

    #[test]
    fn weather_codes_map_to_thai_buckets() {
        assert_eq!(describe_code(2), "มีเมฆบางส่วน");
        assert_eq!(describe_code(63), "ฝนตก");
        assert_eq!(describe_code(81), "ฝนตก");
        assert_eq!(describe_code(200), "สภาพอากาศแปรปรวน");
    }
}
