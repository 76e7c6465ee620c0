pub mod chunk;
pub mod gate;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod queries;
pub mod topics;

pub use chunk::{split_message, MESSAGE_LIMIT};
pub use gate::SearchGate;
pub use normalize::normalize;
pub use orchestrator::{Orchestrator, WeatherSource};
pub use prompt::{build_input, with_previous_question};
pub use queries::{is_about_bot, is_greeting, is_question};
pub use topics::TopicMatcher;
