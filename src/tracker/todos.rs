use uuid::Uuid;

use super::Tracker;
use crate::core::note::Notes;
use crate::core::record::Cascade;
use crate::core::todo::TodoGroup;

pub type TodoTracker = Tracker<TodoGroup>;

impl Tracker<TodoGroup> {
    /// Start a list titled with today's date.
    pub async fn add_group(&self) -> Option<TodoGroup> {
        self.create(TodoGroup::new()).await
    }

    pub async fn delete_group(&self, id: &str) -> Option<Cascade> {
        self.remove(id).await
    }

    /// Blank text is ignored.
    pub async fn add_todo(&self, group: &str, text: &str) -> Option<Uuid> {
        let mut added = None;
        self.modify(group, |g| {
            added = g.add_todo(text);
            added.is_some()
        })
        .await?;
        added
    }

    pub async fn toggle_todo(&self, group: &str, todo: Uuid) -> bool {
        self.modify(group, |g| g.toggle_todo(todo)).await.is_some()
    }

    pub async fn delete_todo(&self, group: &str, todo: Uuid) -> bool {
        self.modify(group, |g| g.remove_todo(todo)).await.is_some()
    }

    pub async fn add_todo_note(&self, group: &str, todo: Uuid, text: &str) -> Option<Uuid> {
        let mut added = None;
        self.modify(group, |g| {
            added = g.todo_mut(todo).and_then(|t| t.add_note(text));
            added.is_some()
        })
        .await?;
        added
    }

    pub async fn delete_todo_note(&self, group: &str, todo: Uuid, note: Uuid) -> bool {
        self.modify(group, |g| {
            g.todo_mut(todo).is_some_and(|t| t.remove_note(note))
        })
        .await
        .is_some()
    }

    /// Groups newest first.
    pub fn groups(&self) -> Vec<TodoGroup> {
        let mut out = self.records().to_vec();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }
}
