//! The dialog state machine.
//!
//! One `(state, event)` dispatch drives the whole conversation: each handled
//! event validates input, talks to the backend (consulting the session cache
//! for bearer tokens), mutates the draft or the cache, and yields exactly
//! one reply with an optional state transition. Collaborators are injected
//! at construction; the engine holds no transport state and no globals.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backend::{ApiOutcome, BackendClient, NoteCreate};
use crate::bot::ui_builder::{format_notes_list, format_search_results};
use crate::dialogue::{DialogEvent, DialogState, Reply};
use crate::draft::DraftStore;
use crate::localization::{t_args_lang, t_lang};
use crate::session::{Credential, SessionStore};
use crate::validators::{
    validate_content, validate_password, validate_tags, validate_title,
};

/// Per-event conversation context, extracted from the transport layer
#[derive(Clone, Debug)]
pub struct ConvContext {
    /// Chat the event arrived in; keys the draft store
    pub conversation_id: i64,
    /// Telegram user id; keys the session cache
    pub user_id: u64,
    pub username: String,
    pub language_code: Option<String>,
}

impl ConvContext {
    pub fn new(
        conversation_id: i64,
        user_id: u64,
        username: impl Into<String>,
        language_code: Option<String>,
    ) -> Self {
        Self {
            conversation_id,
            user_id,
            username: username.into(),
            language_code,
        }
    }

    fn lang(&self) -> Option<&str> {
        self.language_code.as_deref()
    }
}

/// The session-aware dialog engine
pub struct DialogEngine {
    backend: BackendClient,
    sessions: Arc<dyn SessionStore>,
    drafts: Arc<DraftStore>,
    session_ttl_secs: u64,
}

impl DialogEngine {
    pub fn new(
        backend: BackendClient,
        sessions: Arc<dyn SessionStore>,
        drafts: Arc<DraftStore>,
        session_ttl_secs: u64,
    ) -> Self {
        Self {
            backend,
            sessions,
            drafts,
            session_ttl_secs,
        }
    }

    /// Handle one inbound event in the given state.
    ///
    /// Never fails: every backend or store problem resolves to a reply and
    /// a (possibly unchanged) state.
    pub async fn handle(&self, ctx: &ConvContext, state: DialogState, event: DialogEvent) -> Reply {
        match (state, event) {
            (_, DialogEvent::Start) => self.handle_start(ctx).await,
            (DialogState::Registration, DialogEvent::Text(password)) => {
                self.handle_registration(ctx, &password).await
            }
            (DialogState::Login, DialogEvent::Text(password)) => {
                self.handle_login(ctx, &password).await
            }
            (DialogState::Main, DialogEvent::CreateNote) => {
                info!(user = %ctx.username, "entering note creation");
                Reply::to(t_lang("fill-title", ctx.lang()), DialogState::Title)
            }
            (DialogState::Main, DialogEvent::MyNotes) => self.handle_my_notes(ctx).await,
            (DialogState::Main, DialogEvent::Text(tag)) => self.handle_tag_search(ctx, &tag).await,
            (DialogState::Title, DialogEvent::Text(title)) => self.handle_title(ctx, &title),
            (DialogState::Content, DialogEvent::Text(content)) => {
                self.handle_content(ctx, &content)
            }
            (DialogState::Tags, DialogEvent::Text(tags)) => self.handle_tags(ctx, &tags),
            (DialogState::Complete, DialogEvent::Confirm) => self.handle_confirm(ctx).await,
            (DialogState::Complete, DialogEvent::Cancel) => self.handle_cancel(ctx),
            (state, event) => {
                debug!(user = %ctx.username, ?state, ?event, "input not understood in this state");
                Reply::stay(t_lang("unknown-input", ctx.lang()))
            }
        }
    }

    /// /start: a cached credential marks the identity as known and routes
    /// the conversation to Login; otherwise Registration.
    async fn handle_start(&self, ctx: &ConvContext) -> Reply {
        info!(user = %ctx.username, "start command");

        let known = match self.sessions.get(ctx.user_id).await {
            Ok(credential) => credential.is_some(),
            Err(e) => {
                warn!(user = %ctx.username, error = %e, "session lookup failed on start");
                false
            }
        };

        if known {
            Reply::to(
                t_args_lang("login-prompt", &[("username", &ctx.username)], ctx.lang()),
                DialogState::Login,
            )
        } else {
            Reply::to(
                t_args_lang(
                    "registration-prompt",
                    &[("username", &ctx.username)],
                    ctx.lang(),
                ),
                DialogState::Registration,
            )
        }
    }

    async fn handle_registration(&self, ctx: &ConvContext, password: &str) -> Reply {
        let password = match validate_password(password) {
            Ok(password) => password,
            Err(reason) => {
                debug!(user = %ctx.username, reason, "password rejected by validator");
                return Reply::stay(t_lang(password_error_key(reason), ctx.lang()));
            }
        };

        match self.backend.register(&ctx.username, &password).await {
            Ok(ApiOutcome::Success(profile)) => {
                info!(user = %ctx.username, backend_id = profile.id, "registration complete");
                Reply::to(t_lang("registration-complete", ctx.lang()), DialogState::Login)
            }
            Ok(ApiOutcome::Rejected(status)) => {
                info!(user = %ctx.username, status, "registration rejected, already known");
                Reply::to(t_lang("already-registered", ctx.lang()), DialogState::Login)
            }
            Err(e) => {
                error!(user = %ctx.username, error = %e, "registration call failed");
                Reply::stay(t_lang("server-error", ctx.lang()))
            }
        }
    }

    async fn handle_login(&self, ctx: &ConvContext, password: &str) -> Reply {
        match self.backend.authenticate(&ctx.username, password).await {
            Ok(ApiOutcome::Success(token)) => {
                let credential = Credential::new(ctx.user_id, token, self.session_ttl_secs);
                if let Err(e) = self.sessions.put(&credential, self.session_ttl_secs).await {
                    // The dialog still proceeds; the next token lookup
                    // lands the user back in Login.
                    error!(user = %ctx.username, error = %e, "failed to cache session credential");
                }
                info!(user = %ctx.username, "login complete");
                Reply::to(t_lang("main-menu", ctx.lang()), DialogState::Main)
            }
            Ok(ApiOutcome::Rejected(status)) => {
                info!(user = %ctx.username, status, "login rejected");
                Reply::stay(t_lang("wrong-password", ctx.lang()))
            }
            Err(e) => {
                error!(user = %ctx.username, error = %e, "authenticate call failed");
                Reply::stay(t_lang("server-error", ctx.lang()))
            }
        }
    }

    async fn handle_my_notes(&self, ctx: &ConvContext) -> Reply {
        let token = match self.cached_token(ctx).await {
            Some(token) => token,
            None => return Reply::to(t_lang("auth-error", ctx.lang()), DialogState::Login),
        };

        match self.backend.list_notes(&token).await {
            Ok(ApiOutcome::Success(notes)) => {
                info!(user = %ctx.username, count = notes.len(), "listed notes");
                Reply::stay(format_notes_list(&notes, ctx.lang()))
            }
            Ok(rejected) if rejected.is_auth_failure() => self.auth_rejected(ctx).await,
            Ok(ApiOutcome::Rejected(status)) => {
                warn!(user = %ctx.username, status, "list_notes rejected");
                Reply::stay(t_lang("backend-error", ctx.lang()))
            }
            Err(e) => {
                error!(user = %ctx.username, error = %e, "list_notes call failed");
                Reply::stay(t_lang("server-error", ctx.lang()))
            }
        }
    }

    async fn handle_tag_search(&self, ctx: &ConvContext, tag: &str) -> Reply {
        let tag = tag.trim();

        let token = match self.cached_token(ctx).await {
            Some(token) => token,
            None => return Reply::to(t_lang("auth-error", ctx.lang()), DialogState::Login),
        };

        match self.backend.search_notes_by_tag(tag, &token).await {
            Ok(ApiOutcome::Success(notes)) => {
                info!(user = %ctx.username, tag, count = notes.len(), "tag search complete");
                Reply::stay(format_search_results(tag, &notes, ctx.lang()))
            }
            Ok(rejected) if rejected.is_auth_failure() => self.auth_rejected(ctx).await,
            Ok(ApiOutcome::Rejected(status)) => {
                warn!(user = %ctx.username, status, "tag search rejected");
                Reply::stay(t_lang("backend-error", ctx.lang()))
            }
            Err(e) => {
                error!(user = %ctx.username, error = %e, "tag search call failed");
                Reply::stay(t_lang("server-error", ctx.lang()))
            }
        }
    }

    fn handle_title(&self, ctx: &ConvContext, title: &str) -> Reply {
        match validate_title(title) {
            Ok(title) => {
                self.drafts.set_title(ctx.conversation_id, title);
                Reply::to(t_lang("fill-content", ctx.lang()), DialogState::Content)
            }
            Err("empty") => Reply::stay(t_lang("title-empty", ctx.lang())),
            Err(_) => Reply::stay(t_lang("title-too-long", ctx.lang())),
        }
    }

    fn handle_content(&self, ctx: &ConvContext, content: &str) -> Reply {
        match validate_content(content) {
            Ok(content) => {
                self.drafts.set_content(ctx.conversation_id, content);
                Reply::to(t_lang("fill-tags", ctx.lang()), DialogState::Tags)
            }
            Err("empty") => Reply::stay(t_lang("content-empty", ctx.lang())),
            Err(_) => Reply::stay(t_lang("content-too-long", ctx.lang())),
        }
    }

    fn handle_tags(&self, ctx: &ConvContext, tags: &str) -> Reply {
        match validate_tags(tags) {
            Ok(tags) => {
                self.drafts.set_tags(ctx.conversation_id, tags);
                let draft = self.drafts.get_all(ctx.conversation_id);
                info!(user = %ctx.username, ?draft, "draft ready for confirmation");
                let summary = t_args_lang(
                    "complete-note",
                    &[
                        ("title", draft.title.as_deref().unwrap_or("")),
                        ("content", draft.content.as_deref().unwrap_or("")),
                        ("tags", draft.tags.as_deref().unwrap_or("")),
                    ],
                    ctx.lang(),
                );
                Reply::to(summary, DialogState::Complete)
            }
            Err(_) => Reply::stay(t_lang("too-many-tags", ctx.lang())),
        }
    }

    async fn handle_confirm(&self, ctx: &ConvContext) -> Reply {
        let draft = self.drafts.get_all(ctx.conversation_id);
        let note = match NoteCreate::from_draft(&draft) {
            Some(note) => note,
            None => {
                // State ordering should make this unreachable
                error!(user = %ctx.username, "confirm with incomplete draft");
                self.drafts.clear(ctx.conversation_id);
                return Reply::to(t_lang("unknown-input", ctx.lang()), DialogState::Main);
            }
        };

        let token = match self.cached_token(ctx).await {
            Some(token) => token,
            None => {
                self.drafts.clear(ctx.conversation_id);
                return Reply::to(t_lang("auth-error", ctx.lang()), DialogState::Login);
            }
        };

        match self.backend.create_note(&note, &token).await {
            Ok(ApiOutcome::Success(saved)) => {
                info!(user = %ctx.username, note_id = saved.id, "note created");
                self.drafts.clear(ctx.conversation_id);
                Reply::to(t_lang("note-created", ctx.lang()), DialogState::Main)
            }
            Ok(rejected) if rejected.is_auth_failure() => {
                self.drafts.clear(ctx.conversation_id);
                self.auth_rejected(ctx).await
            }
            Ok(ApiOutcome::Rejected(status)) => {
                // Draft survives so the user can retry or cancel
                warn!(user = %ctx.username, status, "create_note rejected");
                Reply::stay(t_lang("backend-error", ctx.lang()))
            }
            Err(e) => {
                error!(user = %ctx.username, error = %e, "create_note call failed");
                Reply::stay(t_lang("server-error", ctx.lang()))
            }
        }
    }

    fn handle_cancel(&self, ctx: &ConvContext) -> Reply {
        info!(user = %ctx.username, "draft cancelled");
        self.drafts.clear(ctx.conversation_id);
        Reply::to(t_lang("note-cancelled", ctx.lang()), DialogState::Main)
    }

    /// Token from the cache, or `None` when absent or the store failed
    async fn cached_token(&self, ctx: &ConvContext) -> Option<String> {
        match self.sessions.get(ctx.user_id).await {
            Ok(Some(credential)) => Some(credential.token),
            Ok(None) => None,
            Err(e) => {
                error!(user = %ctx.username, error = %e, "session lookup failed");
                None
            }
        }
    }

    /// A backend call made with a cached credential came back 401: drop the
    /// credential and force the conversation back to Login.
    async fn auth_rejected(&self, ctx: &ConvContext) -> Reply {
        info!(user = %ctx.username, "cached credential rejected by backend");
        if let Err(e) = self.sessions.invalidate(ctx.user_id).await {
            error!(user = %ctx.username, error = %e, "failed to invalidate session");
        }
        Reply::to(t_lang("invalid-session", ctx.lang()), DialogState::Login)
    }
}

fn password_error_key(reason: &str) -> &'static str {
    match reason {
        "too_short" => "password-too-short",
        "no_uppercase" => "password-no-uppercase",
        "no_lowercase" => "password-no-lowercase",
        "no_digit" => "password-no-digit",
        "no_symbol" => "password-no-symbol",
        _ => "password-bad-character",
    }
}
