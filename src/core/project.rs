use serde::{Deserialize, Serialize};

use super::milestone::{Milestone, Milestones, Status};
use super::note::{Note, NotePlacement, Notes};
use super::ordering::Sortable;
use super::record::{Cascade, Illustrated, Record, RecordId};

pub const DEFAULT_PROJECT_NAME: &str = "New Project";

/// A multi-step undertaking tracked through milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(skip)]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub order: i64,
}

impl Project {
    pub fn new(order: i64) -> Self {
        Self {
            id: RecordId::new(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            status: Status::NotStarted,
            image: None,
            milestones: Vec::new(),
            notes: Vec::new(),
            order,
        }
    }
}

impl Record for Project {
    const COLLECTION: &'static str = "projects";
    const ORDER_FIELD: &'static str = "order";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn cascade(&self) -> Cascade {
        Cascade {
            notes: self.notes.iter().map(|n| n.id).collect(),
            milestones: self.milestones.iter().map(|m| m.id).collect(),
            todos: Vec::new(),
            blobs: self.image.iter().cloned().collect(),
        }
    }
}

impl Illustrated for Project {
    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn replace_image(&mut self, path: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.image, path)
    }
}

impl Milestones for Project {
    fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    fn milestones_mut(&mut self) -> &mut Vec<Milestone> {
        &mut self.milestones
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

impl Notes for Project {
    const NOTE_PLACEMENT: NotePlacement = NotePlacement::NewestFirst;

    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }
}

// Projects carry neither a priority nor a deadline; those sort keys leave them in place.
impl Sortable for Project {
    fn order(&self) -> i64 {
        self.order
    }

    fn name(&self) -> &str {
        &self.name
    }
}
