//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::backend::Note;
use crate::localization::{t_args_lang, t_lang};

/// Callback data for the main-menu "Create note" button
pub const CALLBACK_CREATE_NOTE: &str = "create_note";
/// Callback data for the main-menu "My notes" button
pub const CALLBACK_MY_NOTES: &str = "my_notes";
/// Callback data for the draft-summary "Confirm" button
pub const CALLBACK_CONFIRM: &str = "confirm";
/// Callback data for the draft-summary "Cancel" button
pub const CALLBACK_CANCEL: &str = "cancel";

// Keep note content to one readable line in list views
const CONTENT_PREVIEW_CHARS: usize = 80;

/// Create the main-menu inline keyboard
pub fn create_main_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            t_lang("button-create-note", language_code),
            CALLBACK_CREATE_NOTE.to_string(),
        ),
        InlineKeyboardButton::callback(
            t_lang("button-my-notes", language_code),
            CALLBACK_MY_NOTES.to_string(),
        ),
    ]])
}

/// Create the Confirm/Cancel keyboard shown with the draft summary
pub fn create_confirm_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            t_lang("button-confirm", language_code),
            CALLBACK_CONFIRM.to_string(),
        ),
        InlineKeyboardButton::callback(
            t_lang("button-cancel", language_code),
            CALLBACK_CANCEL.to_string(),
        ),
    ]])
}

/// Format the user's notes as a numbered list
pub fn format_notes_list(notes: &[Note], language_code: Option<&str>) -> String {
    if notes.is_empty() {
        return t_lang("notes-empty", language_code);
    }

    let mut result = t_lang("notes-header", language_code);
    for (i, note) in notes.iter().enumerate() {
        result.push_str(&format_note_line(i + 1, note));
    }
    result
}

/// Format a tag search result
pub fn format_search_results(tag: &str, notes: &[Note], language_code: Option<&str>) -> String {
    if notes.is_empty() {
        return t_lang("search-empty", language_code);
    }

    let mut result = t_args_lang("search-header", &[("tag", tag)], language_code);
    for (i, note) in notes.iter().enumerate() {
        result.push_str(&format_note_line(i + 1, note));
    }
    result
}

fn format_note_line(position: usize, note: &Note) -> String {
    let preview: String = note.content.chars().take(CONTENT_PREVIEW_CHARS).collect();
    let ellipsis = if note.content.chars().count() > CONTENT_PREVIEW_CHARS {
        "…"
    } else {
        ""
    };

    if note.tags.trim().is_empty() {
        format!("\n{}. {}\n   {}{}", position, note.title, preview, ellipsis)
    } else {
        format!(
            "\n{}. {} [{}]\n   {}{}",
            position, note.title, note.tags, preview, ellipsis
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(title: &str, content: &str, tags: &str) -> Note {
        Note {
            id: 1,
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.to_string(),
            owner_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_note_line_includes_tags_when_present() {
        let line = format_note_line(1, &note("title", "body", "work"));
        assert!(line.contains("[work]"));

        let line = format_note_line(1, &note("title", "body", ""));
        assert!(!line.contains('['));
    }

    #[test]
    fn test_long_content_is_previewed() {
        let long = "x".repeat(200);
        let line = format_note_line(1, &note("title", &long, ""));
        assert!(line.contains('…'));
        assert!(!line.contains(&long));
    }
}
