//! Discord front-end: event filtering, fast-path dispatch, and the
//! chunked smart reply.

use std::sync::Arc;

use phlam_core::chunk::{split_message, MESSAGE_LIMIT};
use phlam_core::normalize::{bracket_links, strip_stray_asterisks};
use phlam_core::{Orchestrator, TopicMatcher};
use phlam_features::FeatureSet;
use phlam_memory::MemoryStore;
use phlam_schema::{ConversationTurn, TarotTopic, Topic};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Http, Message, Ready};
use serenity::async_trait;

/// Sent when a turn fails at the routing level.
pub const ROUTING_FALLBACK: &str = "⚠️ พี่หลามงงเลย ตอบไม่ได้จริง ๆ จ้า";

const TYPING_KEEPALIVE: std::time::Duration = std::time::Duration::from_secs(8);

pub struct DiscordBot {
    token: String,
    state: Arc<BotState>,
}

struct BotState {
    channel_id: u64,
    matcher: TopicMatcher,
    features: FeatureSet,
    orchestrator: Orchestrator,
    memory: MemoryStore,
}

impl DiscordBot {
    pub fn new(
        token: String,
        channel_id: u64,
        features: FeatureSet,
        orchestrator: Orchestrator,
        memory: MemoryStore,
    ) -> Self {
        Self {
            token,
            state: Arc::new(BotState {
                channel_id,
                matcher: TopicMatcher::new(),
                features,
                orchestrator,
                memory,
            }),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = Handler { state: self.state };
        let mut client = Client::builder(self.token, intents)
            .event_handler(handler)
            .await?;
        client.start().await?;
        Ok(())
    }
}

struct Handler {
    state: Arc<BotState>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("discord bot connected: {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if !should_handle(
            msg.author.bot,
            msg.channel_id.get(),
            self.state.channel_id,
            &msg.content,
        ) {
            return;
        }

        let state = self.state.clone();
        tokio::spawn(async move {
            handle_message(state, ctx, msg).await;
        });
    }
}

/// Accepts only human messages in the configured channel that are not
/// prefixed commands.
fn should_handle(author_is_bot: bool, channel_id: u64, configured: u64, content: &str) -> bool {
    !author_is_bot
        && channel_id == configured
        && !content.starts_with('!')
        && !content.trim().is_empty()
}

enum Route {
    Quick(Topic),
    TarotChoice(TarotTopic),
    Completion,
}

fn route(matcher: &TopicMatcher, text: &str) -> Route {
    if let Some(topic) = matcher.classify(text) {
        return Route::Quick(topic);
    }
    if let Some(choice) = TarotTopic::parse(&text.trim().to_lowercase()) {
        return Route::TarotChoice(choice);
    }
    Route::Completion
}

async fn handle_message(state: Arc<BotState>, ctx: Context, msg: Message) {
    let text = msg.content.trim().to_string();

    match route(&state.matcher, &text) {
        Route::Quick(topic) => {
            let reply = match state.features.answer(topic).await {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::error!(topic = topic.as_str(), "quick answer failed: {err}");
                    ROUTING_FALLBACK.to_string()
                }
            };
            if let Err(err) = msg.channel_id.say(&ctx.http, reply).await {
                tracing::error!("failed to send quick answer: {err}");
            }
        }
        Route::TarotChoice(choice) => {
            let reading = state.features.tarot_reading(choice);
            if let Err(err) = msg.channel_id.say(&ctx.http, reading).await {
                tracing::error!("failed to send tarot reading: {err}");
            }
        }
        Route::Completion => {
            let _ = msg.channel_id.broadcast_typing(&ctx.http).await;
            let typing_handle = tokio::spawn({
                let http = ctx.http.clone();
                let channel_id = msg.channel_id;
                async move {
                    loop {
                        tokio::time::sleep(TYPING_KEEPALIVE).await;
                        if channel_id.broadcast_typing(&http).await.is_err() {
                            break;
                        }
                    }
                }
            });

            let user_id = msg.author.id.get() as i64;
            let reply = state.orchestrator.generate(user_id, &text).await;
            typing_handle.abort();

            smart_reply(&ctx.http, &msg, &reply).await;

            // memory write stays off the reply path
            let memory = state.memory.clone();
            tokio::spawn(async move {
                let turn = ConversationTurn::new(user_id, text, reply);
                if let Err(err) = memory.append_turn(turn).await {
                    tracing::warn!(user_id, "failed to store turn: {err}");
                }
            });
        }
    }
}

/// Final markdown-safety pass on the exact text that goes out: bracket
/// bare URLs and drop stray asterisks.
fn prepare_outbound(content: &str) -> String {
    strip_stray_asterisks(&bracket_links(content))
}

/// Replies inline when the text fits in one Discord message, falling
/// back once to a plain channel send if the reply is rejected;
/// oversized replies go out as ordered chunks.
async fn smart_reply(http: &Http, msg: &Message, content: &str) {
    let content = prepare_outbound(content);

    if content.chars().count() <= MESSAGE_LIMIT {
        if msg.reply(http, content.as_str()).await.is_err() {
            if let Err(err) = msg.channel_id.say(http, content.as_str()).await {
                tracing::error!("failed to send reply: {err}");
            }
        }
        return;
    }

    for chunk in split_message(&content, MESSAGE_LIMIT) {
        if let Err(err) = msg.channel_id.say(http, chunk).await {
            tracing::error!("failed to send reply chunk: {err}");
            break;
        }
    }
}
