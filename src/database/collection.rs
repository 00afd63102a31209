//! A single in-memory collection of JSON documents.

use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::StoreError;
use super::schema::CollectionSpec;

/// A stored document: a JSON object carrying `$id`, `$createdAt` and
/// `$updatedAt`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "$id";
pub const CREATED_AT_FIELD: &str = "$createdAt";
pub const UPDATED_AT_FIELD: &str = "$updatedAt";

/// Filters and paging for [`Collection::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// `field == value`, comparing the field's string form.
    pub filters: Vec<(String, String)>,
    /// Case-insensitive substring over the collection's search fields.
    pub search: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

/// Documents in insertion order.
#[derive(Debug)]
pub struct Collection {
    spec: CollectionSpec,
    documents: RwLock<Vec<Document>>,
}

impl Collection {
    pub fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Return one page of matching documents and the pre-paging match count.
    pub fn list(&self, query: &ListQuery) -> (Vec<Document>, u64) {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let documents = self.documents.read();
        let matching: Vec<&Document> = documents
            .iter()
            .filter(|doc| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| doc.get(field).is_some_and(|v| field_matches(v, value)))
            })
            .filter(|doc| match &needle {
                Some(needle) => self.spec.search_fields.iter().any(|field| {
                    doc.get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(needle.as_str()))
                }),
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();
        (page, total)
    }

    pub fn get(&self, id: &str) -> Result<Document, StoreError> {
        self.documents
            .read()
            .iter()
            .find(|doc| document_id(doc) == Some(id))
            .cloned()
            .ok_or_else(|| self.not_found(id))
    }

    /// Insert a new document, assigning its id and timestamps.
    ///
    /// Client-supplied `$` fields are discarded.
    pub fn create(&self, mut fields: Document) -> Result<Document, StoreError> {
        fields.retain(|key, _| !key.starts_with('$'));

        let mut documents = self.documents.write();
        self.check_unique(&documents, &fields, None)?;

        let now = timestamp();
        let id = Uuid::new_v4().to_string();
        let mut document = Document::with_capacity(fields.len() + 3);
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        document.insert(CREATED_AT_FIELD.to_string(), Value::String(now.clone()));
        document.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));
        document.extend(fields);
        self.check_shape(&document)?;

        documents.push(document.clone());
        debug!("Created {} document {}", self.spec.name, id);
        Ok(document)
    }

    /// Merge `fields` into an existing document.
    ///
    /// The merged result must pass the collection's shape check; on failure
    /// the stored document is left untouched.
    pub fn update(&self, id: &str, mut fields: Document) -> Result<Document, StoreError> {
        fields.retain(|key, _| !key.starts_with('$'));

        let mut documents = self.documents.write();
        let index = documents
            .iter()
            .position(|doc| document_id(doc) == Some(id))
            .ok_or_else(|| self.not_found(id))?;
        self.check_unique(&documents, &fields, Some(index))?;

        let mut document = documents[index].clone();
        document.extend(fields);
        document.insert(UPDATED_AT_FIELD.to_string(), Value::String(timestamp()));
        self.check_shape(&document)?;

        documents[index] = document.clone();
        debug!("Updated {} document {}", self.spec.name, id);
        Ok(document)
    }

    pub fn delete(&self, id: &str) -> Result<Document, StoreError> {
        let mut documents = self.documents.write();
        let index = documents
            .iter()
            .position(|doc| document_id(doc) == Some(id))
            .ok_or_else(|| self.not_found(id))?;
        debug!("Deleted {} document {}", self.spec.name, id);
        Ok(documents.remove(index))
    }

    fn check_unique(&self, documents: &[Document], fields: &Document, skip: Option<usize>) -> Result<(), StoreError> {
        for field in self.spec.unique_fields {
            let Some(value) = fields.get(*field).filter(|v| !is_blank(v)) else {
                continue;
            };
            let taken = documents
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != skip && doc.get(*field) == Some(value));
            if taken {
                return Err(StoreError::Duplicate {
                    collection: self.spec.name.to_string(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_shape(&self, document: &Document) -> Result<(), StoreError> {
        (self.spec.shape)(document).map_err(|reason| StoreError::Malformed {
            collection: self.spec.name.to_string(),
            reason,
        })
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: self.spec.name.to_string(),
            id: id.to_string(),
        }
    }
}

fn document_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn field_matches(field: &Value, expected: &str) -> bool {
    match field {
        Value::String(s) => s == expected,
        Value::Array(items) => items.iter().any(|item| field_matches(item, expected)),
        Value::Null => false,
        other => other.to_string() == expected,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn beneficiaries() -> Collection {
        Collection::new(
            CollectionSpec::new("beneficiaries")
                .unique(&["tc_no"])
                .search(&["name"]),
        )
    }

    #[test]
    fn test_create_assigns_metadata() {
        let collection = beneficiaries();
        let created = collection
            .create(doc(json!({"name": "Ali", "$id": "forged"})))
            .unwrap();

        let id = created[ID_FIELD].as_str().unwrap();
        assert_ne!(id, "forged");
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(created[CREATED_AT_FIELD], created[UPDATED_AT_FIELD]);
        assert_eq!(collection.get(id).unwrap(), created);
    }

    #[test]
    fn test_unique_field() {
        let collection = beneficiaries();
        let first = collection.create(doc(json!({"tc_no": "12345678901"}))).unwrap();
        let err = collection
            .create(doc(json!({"tc_no": "12345678901"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field, .. } if field == "tc_no"));

        // Re-saving the same value on its own document is fine; blanks never clash.
        let id = first[ID_FIELD].as_str().unwrap();
        collection.update(id, doc(json!({"tc_no": "12345678901"}))).unwrap();
        collection.create(doc(json!({"tc_no": ""}))).unwrap();
        collection.create(doc(json!({"tc_no": ""}))).unwrap();
    }

    #[test]
    fn test_list_filters_search_and_paging() {
        let collection = beneficiaries();
        for i in 0..50 {
            let city = if i % 2 == 0 { "Ankara" } else { "İzmir" };
            collection
                .create(doc(json!({"name": format!("Kişi {i}"), "city": city, "family_size": i % 5})))
                .unwrap();
        }

        let (page, total) = collection.list(&ListQuery {
            offset: 20,
            limit: 20,
            ..Default::default()
        });
        assert_eq!(total, 50);
        assert_eq!(page.len(), 20);
        assert_eq!(page[0]["name"], "Kişi 20");

        let (_, total) = collection.list(&ListQuery {
            filters: vec![("city".into(), "Ankara".into()), ("family_size".into(), "4".into())],
            limit: 100,
            ..Default::default()
        });
        assert_eq!(total, 5);

        // "Kişi 4" and "Kişi 40".."Kişi 49"
        let (page, total) = collection.list(&ListQuery {
            search: Some("kişi 4".into()),
            limit: 5,
            ..Default::default()
        });
        assert_eq!(total, 11);
        assert_eq!(page.len(), 5);
    }

    #[test]
    fn test_update_merges_and_delete_removes() {
        let collection = beneficiaries();
        let created = collection.create(doc(json!({"name": "Ali", "city": "Van"}))).unwrap();
        let id = created[ID_FIELD].as_str().unwrap().to_string();

        let updated = collection.update(&id, doc(json!({"city": "Muş"}))).unwrap();
        assert_eq!(updated["name"], "Ali");
        assert_eq!(updated["city"], "Muş");
        assert_eq!(updated[CREATED_AT_FIELD], created[CREATED_AT_FIELD]);

        collection.delete(&id).unwrap();
        assert!(matches!(collection.get(&id), Err(StoreError::NotFound { .. })));
        assert!(matches!(collection.delete(&id), Err(StoreError::NotFound { .. })));
    }
}
