//! Quick-answer lookups behind the topic fast path: lottery, gold, oil,
//! exchange rates, weather, news digests, and tarot readings. Each
//! topic maps to exactly one fetcher producing ready-to-send Thai text.

pub mod exchange;
pub mod lottery;
pub mod news;
pub mod prices;
pub mod tarot;
pub mod weather;

use std::sync::Arc;

use anyhow::Result;
use phlam_provider::WebSearch;
use phlam_schema::{TarotTopic, Topic};

pub use exchange::ExchangeClient;
pub use lottery::LotteryClient;
pub use news::NewsFeed;
pub use prices::PriceClient;
pub use tarot::{read_topic, TAROT_MENU};
pub use weather::{WeatherClient, DEFAULT_CITY};

/// One fetcher per topic. The channel layer calls at most one per turn
/// and never composes two answers.
pub struct FeatureSet {
    prices: PriceClient,
    lottery: LotteryClient,
    exchange: ExchangeClient,
    news: NewsFeed,
    weather: WeatherClient,
}

impl FeatureSet {
    pub fn new(
        prices: PriceClient,
        lottery: LotteryClient,
        exchange: ExchangeClient,
        search: Arc<dyn WebSearch>,
        weather: WeatherClient,
    ) -> Self {
        Self {
            prices,
            lottery,
            exchange,
            news: NewsFeed::new(search),
            weather,
        }
    }

    pub async fn answer(&self, topic: Topic) -> Result<String> {
        match topic {
            Topic::Oil => self.prices.oil_today().await,
            Topic::Gold => self.prices.gold_today().await,
            Topic::Lotto => self.lottery.latest_draw().await,
            Topic::Exchange => self.exchange.today().await,
            Topic::Weather => self.weather.current(DEFAULT_CITY).await,
            Topic::News => self.news.daily().await,
            Topic::GlobalNews => self.news.global().await,
            Topic::Tarot => Ok(TAROT_MENU.to_string()),
        }
    }

    /// Follow-up to the tarot menu: a reading for the chosen subject.
    pub fn tarot_reading(&self, topic: TarotTopic) -> String {
        tarot::read_topic(topic)
    }
}
