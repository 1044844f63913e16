use super::Tracker;
use crate::core::ordering::{SortKey, next_order, sorted};
use crate::core::project::Project;
use crate::core::record::Cascade;

pub type ProjectTracker = Tracker<Project>;

impl Tracker<Project> {
    pub async fn add_project(&self) -> Option<Project> {
        let order = next_order(self.records().as_slice());
        self.create(Project::new(order)).await
    }

    pub async fn rename_project(&self, id: &str, name: &str) -> bool {
        self.modify(id, |p| {
            p.name = name.to_string();
            true
        })
        .await
        .is_some()
    }

    pub async fn delete_project(&self, id: &str) -> Option<Cascade> {
        self.remove(id).await
    }

    pub fn sorted_projects(&self, key: SortKey) -> Vec<Project> {
        sorted(self.records().as_slice(), key)
    }
}
