use uuid::Uuid;

use super::Tracker;
use crate::core::milestone::Milestones;
use crate::core::note::Notes;
use crate::core::record::{Illustrated, Record};
use crate::sync::blob::image_path;

impl<T: Record + Milestones> Tracker<T> {
    pub async fn add_milestone(&self, id: &str) -> Option<Uuid> {
        let mut added = None;
        self.modify(id, |record| {
            added = Some(record.add_milestone());
            true
        })
        .await?;
        added
    }

    pub async fn rename_milestone(&self, id: &str, milestone: Uuid, name: &str) -> bool {
        self.modify(id, |record| record.rename_milestone(milestone, name))
            .await
            .is_some()
    }

    /// Flip a milestone and persist the recomputed status with it.
    pub async fn toggle_milestone(&self, id: &str, milestone: Uuid) -> bool {
        self.modify(id, |record| record.toggle_milestone(milestone))
            .await
            .is_some()
    }

    pub async fn remove_milestone(&self, id: &str, milestone: Uuid) -> bool {
        self.modify(id, |record| record.remove_milestone(milestone))
            .await
            .is_some()
    }
}

impl<T: Record + Notes> Tracker<T> {
    /// Blank text is ignored without touching the gateway.
    pub async fn add_note(&self, id: &str, text: &str) -> Option<Uuid> {
        let mut added = None;
        self.modify(id, |record| {
            added = record.add_note(text);
            added.is_some()
        })
        .await?;
        added
    }

    pub async fn remove_note(&self, id: &str, note: Uuid) -> bool {
        self.modify(id, |record| record.remove_note(note)).await.is_some()
    }
}

impl<T: Record + Illustrated> Tracker<T> {
    /// Upload an image and point the record at it.
    ///
    /// The blob is written first. If the record update then fails the blob
    /// stays behind unreferenced; nothing is rolled back.
    pub async fn attach_image(&self, id: &str, file_name: &str, bytes: Vec<u8>) -> Option<String> {
        if self.get(id).is_none() {
            log::debug!("Ignoring image for missing {}/{}", T::COLLECTION, id);
            return None;
        }

        let path = image_path(T::COLLECTION, id, file_name);
        if let Err(e) = self.blobs().put_object(&path, bytes).await {
            self.report("upload", Some(id), &e);
            return None;
        }

        let mut replaced = None;
        let updated = self
            .modify(id, |record| {
                replaced = record.replace_image(Some(path.clone()));
                true
            })
            .await;
        if updated.is_none() {
            log::warn!("Image {} uploaded but not attached to {}/{}", path, T::COLLECTION, id);
            return None;
        }

        if let Some(old) = replaced {
            self.discard_blob(&old).await;
        }
        Some(path)
    }

    pub async fn clear_image(&self, id: &str) -> bool {
        let mut replaced = None;
        let updated = self
            .modify(id, |record| {
                replaced = record.replace_image(None);
                replaced.is_some()
            })
            .await;
        match (updated, replaced) {
            (Some(_), Some(old)) => {
                self.discard_blob(&old).await;
                true
            }
            _ => false,
        }
    }

    /// Resolve the record's image to a fetchable URL.
    pub async fn image_url(&self, id: &str) -> Option<String> {
        let record = self.get(id)?;
        let path = record.image()?;
        match self.blobs().object_url(path).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Cannot resolve image {}: {}", path, e);
                None
            }
        }
    }
}
