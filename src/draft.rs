//! Per-conversation scratch area for the note being composed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// A note in progress. Fields fill in one per dialog step
/// (title, then content, then tags).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
}

impl Draft {
    /// True once every field has been collected
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.content.is_some() && self.tags.is_some()
    }
}

/// In-process store of drafts, one per conversation.
///
/// Write-once-per-cycle ordering is enforced by the dialog state machine,
/// not here; `clear` runs on both confirm and cancel so no conversation
/// carries stale fields into its next cycle.
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: Mutex<HashMap<i64, Draft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&self, conversation_id: i64, title: String) {
        let mut drafts = self.drafts.lock().unwrap();
        drafts.entry(conversation_id).or_default().title = Some(title);
    }

    pub fn set_content(&self, conversation_id: i64, content: String) {
        let mut drafts = self.drafts.lock().unwrap();
        drafts.entry(conversation_id).or_default().content = Some(content);
    }

    pub fn set_tags(&self, conversation_id: i64, tags: String) {
        let mut drafts = self.drafts.lock().unwrap();
        drafts.entry(conversation_id).or_default().tags = Some(tags);
    }

    /// Snapshot of the conversation's draft; empty if none was started
    pub fn get_all(&self, conversation_id: i64) -> Draft {
        let drafts = self.drafts.lock().unwrap();
        drafts.get(&conversation_id).cloned().unwrap_or_default()
    }

    pub fn clear(&self, conversation_id: i64) {
        let mut drafts = self.drafts.lock().unwrap();
        drafts.remove(&conversation_id);
    }
}
