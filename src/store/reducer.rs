use crate::core::record::{Fields, Record, RecordId, patched};

/// A change to a collection's local state.
#[derive(Debug, Clone)]
pub enum Action<T> {
    /// Full replacement from the gateway.
    Snapshot(Vec<T>),
    /// Insert or replace one record by id.
    Upsert(T),
    /// Apply changed top-level fields to one record. Replaying only the fields
    /// an edit touched keeps it independent of other pending edits.
    Patch(RecordId, Fields),
    Remove(RecordId),
}

/// Apply one action to a record list.
pub fn reduce<T: Record>(records: &mut Vec<T>, action: &Action<T>) {
    match action {
        Action::Snapshot(snapshot) => *records = snapshot.clone(),
        Action::Upsert(record) => match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record.clone(),
            None => records.push(record.clone()),
        },
        Action::Patch(id, patch) => {
            if let Some(slot) = records.iter_mut().find(|r| r.id() == id) {
                match patched(slot, patch) {
                    Ok(record) => *slot = record,
                    Err(e) => log::warn!("Cannot apply patch to {}: {}", id, e),
                }
            }
        }
        Action::Remove(id) => records.retain(|r| r.id() != id),
    }
}
