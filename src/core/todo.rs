use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::note::{Note, NotePlacement, Notes};
use super::record::{Cascade, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Todo {
    /// `None` for blank input.
    pub fn from_input(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
            notes: Vec::new(),
        })
    }
}

impl Notes for Todo {
    const NOTE_PLACEMENT: NotePlacement = NotePlacement::OldestFirst;

    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }
}

/// A dated list of to-dos. The title is derived from the creation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoGroup {
    #[serde(skip)]
    pub id: RecordId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl TodoGroup {
    pub fn new() -> Self {
        let created_at = Utc::now();
        Self {
            id: RecordId::new(),
            title: group_title(created_at.with_timezone(&Local).date_naive()),
            created_at,
            todos: Vec::new(),
        }
    }

    /// Newest to-do goes on top. Returns the id, or `None` for blank text.
    pub fn add_todo(&mut self, text: &str) -> Option<Uuid> {
        let todo = Todo::from_input(text)?;
        let id = todo.id;
        self.todos.insert(0, todo);
        Some(id)
    }

    pub fn todo_mut(&mut self, id: Uuid) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    pub fn toggle_todo(&mut self, id: Uuid) -> bool {
        match self.todo_mut(id) {
            Some(t) => {
                t.completed = !t.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove_todo(&mut self, id: Uuid) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        self.todos.len() != before
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }
}

impl Default for TodoGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for TodoGroup {
    const COLLECTION: &'static str = "todoGroups";
    const ORDER_FIELD: &'static str = "createdAt";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn cascade(&self) -> Cascade {
        Cascade {
            notes: self
                .todos
                .iter()
                .flat_map(|t| t.notes.iter().map(|n| n.id))
                .collect(),
            todos: self.todos.iter().map(|t| t.id).collect(),
            ..Cascade::default()
        }
    }
}

/// Long US date, e.g. `Tuesday, January 2, 2024`.
pub fn group_title(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_format() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(group_title(d), "Tuesday, January 2, 2024");
    }

    #[test]
    fn todos_prepend_and_skip_blank() {
        let mut g = TodoGroup::new();
        assert!(g.add_todo("   ").is_none());
        g.add_todo("first").unwrap();
        let second = g.add_todo(" second ").unwrap();
        assert_eq!(g.todos[0].id, second);
        assert_eq!(g.todos[0].text, "second");
        assert_eq!(g.todos.len(), 2);
    }

    #[test]
    fn toggle_and_remove() {
        let mut g = TodoGroup::new();
        let id = g.add_todo("laundry").unwrap();
        assert!(g.toggle_todo(id));
        assert_eq!(g.completed_count(), 1);
        assert!(g.remove_todo(id));
        assert!(!g.toggle_todo(id));
    }

    #[test]
    fn cascade_reaches_todo_notes() {
        let mut g = TodoGroup::new();
        let id = g.add_todo("call").unwrap();
        g.todo_mut(id).unwrap().add_note("voicemail");
        let cascade = Cascade::of(&g);
        assert_eq!(cascade.todos, vec![id]);
        assert_eq!(cascade.notes.len(), 1);
    }
}
