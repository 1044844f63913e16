use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::milestone::{Milestone, Milestones, Status};
use super::note::{Note, NotePlacement, Notes};
use super::ordering::Sortable;
use super::priority::Priority;
use super::record::{Cascade, Illustrated, Record, RecordId};

pub const DEFAULT_GOAL_NAME: &str = "New Goal";

/// A dated target with a priority, milestones and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(skip)]
    pub id: RecordId,
    pub name: String,
    /// Cleared date inputs are stored as `""`; those and unparseable values read as `None`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub order: i64,
}

impl Goal {
    pub fn new(deadline: NaiveDate, order: i64) -> Self {
        Self {
            id: RecordId::new(),
            name: DEFAULT_GOAL_NAME.to_string(),
            deadline: Some(deadline),
            status: Status::NotStarted,
            image: None,
            priority: Priority::default(),
            milestones: Vec::new(),
            notes: Vec::new(),
            order,
        }
    }

    pub fn score(&self) -> f64 {
        self.priority.score()
    }
}

impl Record for Goal {
    const COLLECTION: &'static str = "goals";
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

impl Illustrated for Goal {
    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn replace_image(&mut self, path: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.image, path)
    }
}

impl Milestones for Goal {
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

impl Notes for Goal {
    const NOTE_PLACEMENT: NotePlacement = NotePlacement::NewestFirst;

    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }
}

impl Sortable for Goal {
    fn order(&self) -> i64 {
        self.order
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority_score(&self) -> Option<f64> {
        Some(self.score())
    }

    fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}
