pub mod discord;

pub use discord::DiscordBot;
