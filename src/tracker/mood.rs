use super::Tracker;
use crate::core::mood::{MoodEntry, MoodFilter, MoodLevel, filter_entries};
use crate::core::record::Cascade;

pub type MoodTracker = Tracker<MoodEntry>;

impl Tracker<MoodEntry> {
    /// Record how the user feels right now.
    pub async fn log_mood(&self, level: MoodLevel) -> Option<MoodEntry> {
        self.create(MoodEntry::new(level)).await
    }

    pub async fn delete_entry(&self, id: &str) -> Option<Cascade> {
        self.remove(id).await
    }

    /// Newest first, restricted to `filter`.
    pub fn entries(&self, filter: MoodFilter) -> Vec<MoodEntry> {
        filter_entries(self.records().as_slice(), filter)
    }
}
