//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::{DialogEvent, NotesDialogue};
use crate::engine::{ConvContext, DialogEngine};

use super::message_handler::dispatch_event;
use super::ui_builder::{
    CALLBACK_CANCEL, CALLBACK_CONFIRM, CALLBACK_CREATE_NOTE, CALLBACK_MY_NOTES,
};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    dialogue: NotesDialogue,
    engine: Arc<DialogEngine>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    let event = match q.data.as_deref() {
        Some(CALLBACK_CREATE_NOTE) => Some(DialogEvent::CreateNote),
        Some(CALLBACK_MY_NOTES) => Some(DialogEvent::MyNotes),
        Some(CALLBACK_CONFIRM) => Some(DialogEvent::Confirm),
        Some(CALLBACK_CANCEL) => Some(DialogEvent::Cancel),
        _ => None,
    };

    if let (Some(event), Some(msg)) = (event, &q.message) {
        let ctx = ConvContext::new(
            msg.chat().id.0,
            q.from.id.0,
            q.from
                .username
                .clone()
                .unwrap_or_else(|| q.from.first_name.clone()),
            q.from.language_code.clone(),
        );

        let state = dialogue.get().await?.unwrap_or_default();
        dispatch_event(&bot, ctx, state, event, &dialogue, engine).await?;
    }

    bot.answer_callback_query(q.id).await?;

    Ok(())
}
