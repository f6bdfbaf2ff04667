//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::{DialogEvent, DialogState, NotesDialogue};
use crate::engine::{ConvContext, DialogEngine};
use crate::localization::t_lang;

use super::ui_builder::{create_confirm_keyboard, create_main_menu_keyboard};

/// Run one event through the engine, send the reply with the keyboard of
/// the resulting state, and persist the transition.
pub(super) async fn dispatch_event(
    bot: &Bot,
    ctx: ConvContext,
    state: DialogState,
    event: DialogEvent,
    dialogue: &NotesDialogue,
    engine: Arc<DialogEngine>,
) -> Result<()> {
    let reply = engine.handle(&ctx, state.clone(), event).await;

    let effective_state = reply.next.clone().unwrap_or(state);
    let language_code = ctx.language_code.as_deref();

    let request = bot.send_message(ChatId(ctx.conversation_id), reply.text.clone());
    match effective_state {
        DialogState::Main => {
            request
                .reply_markup(create_main_menu_keyboard(language_code))
                .await?;
        }
        DialogState::Complete => {
            request
                .reply_markup(create_confirm_keyboard(language_code))
                .await?;
        }
        _ => {
            request.await?;
        }
    }

    if let Some(next) = reply.next {
        dialogue.update(next).await?;
    }

    Ok(())
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    text: &str,
    dialogue: NotesDialogue,
    engine: Arc<DialogEngine>,
) -> Result<()> {
    // Channel posts and service messages carry no sender
    let user = match msg.from.as_ref() {
        Some(user) => user,
        None => return Ok(()),
    };

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    let ctx = ConvContext::new(
        msg.chat.id.0,
        user.id.0,
        user.username
            .clone()
            .unwrap_or_else(|| user.first_name.clone()),
        user.language_code.clone(),
    );

    let text = text.trim();
    let event = if text == "/start" || text.starts_with("/start@") {
        DialogEvent::Start
    } else {
        DialogEvent::Text(text.to_string())
    };

    let state = dialogue.get().await?.unwrap_or_default();
    dispatch_event(bot, ctx, state, event, &dialogue, engine).await
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_ref())
        .map(|s| s.as_str());

    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");

    bot.send_message(msg.chat.id, t_lang("unknown-input", language_code))
        .await?;
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: NotesDialogue,
    engine: Arc<DialogEngine>,
) -> Result<()> {
    if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, text, dialogue, engine).await?;
    } else {
        handle_unsupported_message(&bot, &msg).await?;
    }

    Ok(())
}
