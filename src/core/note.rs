use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped text fragment attached to exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Build a note from raw input. Blank input yields `None` and no id is generated.
    pub fn from_input(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            text: trimmed.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Where a new note lands in its parent's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePlacement {
    NewestFirst,
    OldestFirst,
}

/// Records that own a note list.
pub trait Notes {
    const NOTE_PLACEMENT: NotePlacement;

    fn notes(&self) -> &[Note];
    fn notes_mut(&mut self) -> &mut Vec<Note>;

    fn add_note(&mut self, text: &str) -> Option<Uuid> {
        let note = Note::from_input(text)?;
        let id = note.id;
        match Self::NOTE_PLACEMENT {
            NotePlacement::NewestFirst => self.notes_mut().insert(0, note),
            NotePlacement::OldestFirst => self.notes_mut().push(note),
        }
        Some(id)
    }

    fn remove_note(&mut self, id: Uuid) -> bool {
        let notes = self.notes_mut();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        notes.len() != before
    }
}
