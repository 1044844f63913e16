use chrono::{Local, NaiveDate};

use super::Tracker;
use crate::core::goal::Goal;
use crate::core::ordering::{SortKey, next_order, sorted};
use crate::core::priority::Criterion;
use crate::core::record::Cascade;

pub type GoalTracker = Tracker<Goal>;

impl Tracker<Goal> {
    /// New goal due today, appended after the current last one.
    pub async fn add_goal(&self) -> Option<Goal> {
        let order = next_order(self.records().as_slice());
        self.create(Goal::new(Local::now().date_naive(), order)).await
    }

    pub async fn rename_goal(&self, id: &str, name: &str) -> bool {
        self.modify(id, |g| {
            g.name = name.to_string();
            true
        })
        .await
        .is_some()
    }

    /// `None` clears the deadline.
    pub async fn set_deadline(&self, id: &str, deadline: Option<NaiveDate>) -> bool {
        self.modify(id, |g| {
            g.deadline = deadline;
            true
        })
        .await
        .is_some()
    }

    pub async fn set_rating(&self, id: &str, criterion: Criterion, value: u8) -> bool {
        self.modify(id, |g| {
            g.priority.set(criterion, value);
            true
        })
        .await
        .is_some()
    }

    pub async fn delete_goal(&self, id: &str) -> Option<Cascade> {
        self.remove(id).await
    }

    /// The goals ordered by `key`. Stored `order` values are left alone.
    pub fn sorted_goals(&self, key: SortKey) -> Vec<Goal> {
        sorted(self.records().as_slice(), key)
    }
}
