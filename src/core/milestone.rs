use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MILESTONE_NAME: &str = "New Milestone";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
}

impl Milestone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            completed: false,
        }
    }
}

/// Label derived from milestone completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the status label from milestone completion.
///
/// An empty list is vacuously complete and reads as `Completed`.
pub fn derive_status(milestones: &[Milestone]) -> Status {
    let any_done = milestones.iter().any(|m| m.completed);
    let all_done = milestones.iter().all(|m| m.completed);
    if all_done {
        Status::Completed
    } else if any_done {
        Status::InProgress
    } else {
        Status::NotStarted
    }
}

/// Share of completed milestones as a percentage; 0 for an empty list.
pub fn progress_percent(milestones: &[Milestone]) -> f64 {
    if milestones.is_empty() {
        return 0.0;
    }
    let done = milestones.iter().filter(|m| m.completed).count();
    done as f64 / milestones.len() as f64 * 100.0
}

/// Records that own an ordered milestone list and cache its derived status.
pub trait Milestones {
    fn milestones(&self) -> &[Milestone];
    fn milestones_mut(&mut self) -> &mut Vec<Milestone>;
    fn set_status(&mut self, status: Status);

    fn refresh_status(&mut self) {
        let status = derive_status(self.milestones());
        self.set_status(status);
    }

    /// Append a milestone with the default name and return its id.
    fn add_milestone(&mut self) -> Uuid {
        let milestone = Milestone::new(DEFAULT_MILESTONE_NAME);
        let id = milestone.id;
        self.milestones_mut().push(milestone);
        self.refresh_status();
        id
    }

    fn rename_milestone(&mut self, id: Uuid, name: &str) -> bool {
        match self.milestones_mut().iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Flip one completion flag and recompute the status in the same edit.
    fn toggle_milestone(&mut self, id: Uuid) -> bool {
        let found = match self.milestones_mut().iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.completed = !m.completed;
                true
            }
            None => false,
        };
        if found {
            self.refresh_status();
        }
        found
    }

    fn remove_milestone(&mut self, id: Uuid) -> bool {
        let milestones = self.milestones_mut();
        let before = milestones.len();
        milestones.retain(|m| m.id != id);
        let removed = milestones.len() != before;
        if removed {
            self.refresh_status();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_flags(flags: &[bool]) -> Vec<Milestone> {
        flags
            .iter()
            .map(|done| {
                let mut m = Milestone::new("m");
                m.completed = *done;
                m
            })
            .collect()
    }

    #[test]
    fn status_derivation() {
        assert_eq!(derive_status(&[]), Status::Completed);
        assert_eq!(derive_status(&with_flags(&[false])), Status::NotStarted);
        assert_eq!(derive_status(&with_flags(&[true, false])), Status::InProgress);
        assert_eq!(derive_status(&with_flags(&[true, true])), Status::Completed);
    }

    #[test]
    fn progress_ring() {
        assert_eq!(progress_percent(&[]), 0.0);
        assert_eq!(progress_percent(&with_flags(&[true, false, false, false])), 25.0);
        assert_eq!(progress_percent(&with_flags(&[true, true])), 100.0);
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: Status = serde_json::from_str("\"Not Started\"").unwrap();
        assert_eq!(back, Status::NotStarted);
    }
}
