use serde::{Deserialize, Deserializer, Serialize};

use super::record::{Record, RecordId};

pub const MAX_BALANCE: u8 = 10;
pub const NEW_CATEGORY_VALUE: u8 = 5;

/// Seed categories for an empty life-balance radar.
pub const DEFAULT_CATEGORIES: [(&str, u8); 6] = [
    ("Health", 8),
    ("Relationships", 7),
    ("Career", 6),
    ("Finance", 5),
    ("Growth", 7),
    ("Leisure", 6),
];

/// One axis of the life-balance radar. The name is unique within the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(skip)]
    pub id: RecordId,
    pub name: String,
    #[serde(deserialize_with = "stored_value")]
    pub value: u8,
}

impl Category {
    /// `None` when the trimmed name is blank.
    pub fn new(name: &str, value: u8) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: RecordId::new(),
            name: name.to_string(),
            value: clamp_balance(value),
        })
    }

    pub fn set_value(&mut self, value: u8) {
        self.value = clamp_balance(value);
    }
}

impl Record for Category {
    const COLLECTION: &'static str = "lifeBalance";
    const ORDER_FIELD: &'static str = "name";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

pub fn clamp_balance(value: u8) -> u8 {
    value.min(MAX_BALANCE)
}

fn stored_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, f64::from(MAX_BALANCE)) as u8)
}

pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let name = name.trim();
    categories.iter().find(|c| c.name == name)
}

/// Mean of all category values, `None` for an empty radar.
pub fn average(categories: &[Category]) -> Option<f64> {
    if categories.is_empty() {
        return None;
    }
    let total: u32 = categories.iter().map(|c| u32::from(c.value)).sum();
    Some(f64::from(total) / categories.len() as f64)
}
