use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Document id assigned by the gateway when a record is first added.
pub type RecordId = String;

pub type Fields = Map<String, Value>;

/// One stored document: its id beside its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("cannot decode {collection} document {id}: {source}")]
    Decode {
        collection: &'static str,
        id: RecordId,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode {collection} record: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} record did not encode to a JSON object")]
    NotAnObject(&'static str),
}

/// Everything a record owns that goes away with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    pub notes: Vec<Uuid>,
    pub milestones: Vec<Uuid>,
    pub todos: Vec<Uuid>,
    pub blobs: Vec<String>,
}

impl Cascade {
    pub fn of<R: Record>(record: &R) -> Self {
        record.cascade()
    }

    pub fn len(&self) -> usize {
        self.notes.len() + self.milestones.len() + self.todos.len() + self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A top-level entity stored as one document in a named collection.
///
/// The id is never part of the serialized fields; implementors mark it
/// `#[serde(skip)]` and receive it through `set_id`.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const COLLECTION: &'static str;
    /// Field the gateway orders subscription snapshots by.
    const ORDER_FIELD: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: RecordId);

    fn cascade(&self) -> Cascade {
        Cascade::default()
    }

    fn to_fields(&self) -> Result<Fields, RecordError> {
        let value = serde_json::to_value(self).map_err(|source| RecordError::Encode {
            collection: Self::COLLECTION,
            source,
        })?;
        match value {
            Value::Object(mut map) => {
                map.remove("id");
                Ok(map)
            }
            _ => Err(RecordError::NotAnObject(Self::COLLECTION)),
        }
    }

    fn from_document(doc: Document) -> Result<Self, RecordError> {
        let Document { id, fields } = doc;
        let mut record: Self =
            serde_json::from_value(Value::Object(fields)).map_err(|source| RecordError::Decode {
                collection: Self::COLLECTION,
                id: id.clone(),
                source,
            })?;
        record.set_id(id);
        Ok(record)
    }
}

/// Records that can carry one uploaded image, stored as a blob path.
pub trait Illustrated {
    fn image(&self) -> Option<&str>;
    /// Set the image path and return the one it replaced.
    fn replace_image(&mut self, path: Option<String>) -> Option<String>;
}

/// Top-level fields of `after` that differ from `before`. Fields dropped in
/// `after` are cleared with `null`.
pub fn changed_fields(before: &Fields, after: &Fields) -> Fields {
    let mut patch = Fields::new();
    for (key, value) in after {
        if before.get(key) != Some(value) {
            patch.insert(key.clone(), value.clone());
        }
    }
    for key in before.keys() {
        if !after.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }
    patch
}

/// Merge `patch` into `fields` the way the gateway stores it: `null` removes the
/// field, anything else replaces it.
pub fn apply_patch(fields: &mut Fields, patch: &Fields) {
    for (key, value) in patch {
        if value.is_null() {
            fields.remove(key);
        } else {
            fields.insert(key.clone(), value.clone());
        }
    }
}

/// `record` with `patch` applied to its stored fields.
pub fn patched<R: Record>(record: &R, patch: &Fields) -> Result<R, RecordError> {
    let mut fields = record.to_fields()?;
    apply_patch(&mut fields, patch);
    R::from_document(Document::new(record.id(), fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn changed_fields_only_carries_differences() {
        let before = fields(json!({"name": "a", "order": 1, "image": "x.png"}));
        let after = fields(json!({"name": "b", "order": 1}));
        let patch = changed_fields(&before, &after);
        assert_eq!(patch.len(), 2);
        assert_eq!(patch["name"], json!("b"));
        assert_eq!(patch["image"], Value::Null);
    }

    #[test]
    fn changed_fields_empty_when_equal() {
        let same = fields(json!({"name": "a", "milestones": [1, 2]}));
        assert!(changed_fields(&same, &same).is_empty());
    }

    #[test]
    fn patch_replaces_and_clears() {
        let mut doc = fields(json!({"name": "a", "image": "x.png", "order": 3}));
        apply_patch(&mut doc, &fields(json!({"name": "b", "image": null})));
        assert_eq!(doc, fields(json!({"name": "b", "order": 3})));
    }
}
