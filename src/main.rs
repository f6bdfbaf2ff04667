use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;

use jotter::backend::BackendClient;
use jotter::bot::{callback_handler, message_handler};
use jotter::config::Config;
use jotter::dialogue::DialogState;
use jotter::draft::DraftStore;
use jotter::engine::DialogEngine;
use jotter::localization::init_localization;
use jotter::session::{RedisSessionCache, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting notes bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    init_localization()?;

    let backend = BackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    info!("Connecting to session cache at {}", config.redis_url);
    let sessions: Arc<dyn SessionStore> = Arc::new(RedisSessionCache::new(&config.redis_url).await?);

    let drafts = Arc::new(DraftStore::new());
    let engine = Arc::new(DialogEngine::new(
        backend,
        sessions,
        drafts,
        config.session_ttl_secs,
    ));

    let bot = Bot::new(config.bot_token.clone());

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<DialogState>, DialogState>()
                .endpoint(message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<DialogState>, DialogState>()
                .endpoint(callback_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<DialogState>::new(), engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
