//! Dialogue state and event types for the notes conversation.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Conversation states of the notes dialog.
///
/// `Registration` and `Login` are the entry states; `Main` is the resting
/// point every completed or cancelled flow returns to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogState {
    #[default]
    Registration,
    Login,
    Main,
    Title,
    Content,
    Tags,
    Complete,
}

/// Type alias for the notes dialogue
pub type NotesDialogue = Dialogue<DialogState, InMemStorage<DialogState>>;

/// An inbound user event, already stripped of transport details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogEvent {
    /// The /start command
    Start,
    /// Free text typed by the user
    Text(String),
    /// "Create note" button
    CreateNote,
    /// "My notes" button
    MyNotes,
    /// "Confirm" button on the draft summary
    Confirm,
    /// "Cancel" button on the draft summary
    Cancel,
}

/// The outcome of one handled event: exactly one outbound message and an
/// optional state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub next: Option<DialogState>,
}

impl Reply {
    /// A reply that leaves the conversation in its current state
    pub fn stay(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: None,
        }
    }

    /// A reply that moves the conversation to `next`
    pub fn to(text: impl Into<String>, next: DialogState) -> Self {
        Self {
            text: text.into(),
            next: Some(next),
        }
    }
}
