use super::Tracker;
use crate::core::balance::{Category, DEFAULT_CATEGORIES, NEW_CATEGORY_VALUE, find_by_name};
use crate::core::ordering::compare_names;

pub type BalanceTracker = Tracker<Category>;

impl Tracker<Category> {
    /// Add a category at the midpoint. Blank or already used names are ignored.
    pub async fn add_category(&self, name: &str) -> Option<Category> {
        let category = Category::new(name, NEW_CATEGORY_VALUE)?;
        if find_by_name(self.records().as_slice(), &category.name).is_some() {
            log::debug!("Category {} already exists", category.name);
            return None;
        }
        self.create(category).await
    }

    pub async fn set_value(&self, name: &str, value: u8) -> bool {
        let Some(id) = self.category_id(name) else {
            return false;
        };
        self.modify(&id, |c| {
            c.set_value(value);
            true
        })
        .await
        .is_some()
    }

    pub async fn remove_category(&self, name: &str) -> bool {
        match self.category_id(name) {
            Some(id) => self.remove(&id).await.is_some(),
            None => false,
        }
    }

    /// Fill an empty radar with the default categories. Returns how many were added.
    pub async fn seed_defaults(&self) -> usize {
        if !self.records().is_empty() {
            return 0;
        }
        let mut added = 0;
        for (name, value) in DEFAULT_CATEGORIES {
            if let Some(category) = Category::new(name, value) {
                if self.create(category).await.is_some() {
                    added += 1;
                }
            }
        }
        added
    }

    /// Categories in name order, as laid out around the radar.
    pub fn categories(&self) -> Vec<Category> {
        let mut out = self.records().to_vec();
        out.sort_by(|a, b| compare_names(&a.name, &b.name));
        out
    }

    fn category_id(&self, name: &str) -> Option<String> {
        find_by_name(self.records().as_slice(), name).map(|c| c.id.clone())
    }
}
