use super::{CountLimit, FindOptions, PersonCollection, PersonRecord, RecordStream};
use crate::filter::FilterExpression;
use crate::sanitize::INTERNAL_ID_FIELD;
use crate::Result;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, RwLock};

/// In-memory person collection with document-store matching semantics.
///
/// Natural order is insertion order. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    records: Arc<RwLock<Vec<PersonRecord>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = PersonRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    pub fn insert(&self, record: PersonRecord) {
        self.write().push(record);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a Vec half-written, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<PersonRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<PersonRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn project(record: &PersonRecord, projection: Option<&[String]>) -> PersonRecord {
    match projection {
        None => record.clone(),
        Some(fields) => record
            .iter()
            .filter(|(key, _)| key.as_str() == INTERNAL_ID_FIELD || fields.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}

#[async_trait]
impl PersonCollection for MemoryCollection {
    async fn count(&self, filter: &FilterExpression, limit: CountLimit) -> Result<u64> {
        let records = self.read();
        let matching = records.iter().filter(|r| filter.matches(r));
        let count = match limit {
            CountLimit::Unbounded => matching.count(),
            CountLimit::AtMost(cap) => matching.take(cap as usize).count(),
        };
        Ok(count as u64)
    }

    async fn find(&self, filter: &FilterExpression, options: FindOptions) -> Result<RecordStream> {
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let page: Vec<PersonRecord> = self
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .skip(options.skip as usize)
            .take(limit)
            .map(|r| project(r, options.projection.as_deref()))
            .collect();

        Ok(futures::stream::iter(page.into_iter().map(Ok)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Condition;
    use futures::TryStreamExt;
    use serde_json::json;

    fn person(id: u32, sex: &str) -> PersonRecord {
        json!({"_id": format!("oid{id}"), "id": format!("I{id}"), "sex": sex, "NOTE": "n"})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn collection() -> MemoryCollection {
        MemoryCollection::from_records((1..=5).map(|i| person(i, if i % 2 == 0 { "F" } else { "M" })))
    }

    #[tokio::test]
    async fn count_respects_cap() {
        let store = collection();
        let mut filter = FilterExpression::new();
        filter.set("sex", Condition::Equals(json!("M")));

        assert_eq!(store.count(&filter, CountLimit::Unbounded).await.unwrap(), 3);
        assert_eq!(store.count(&filter, CountLimit::AtMost(2)).await.unwrap(), 2);
        assert_eq!(store.count(&filter, CountLimit::AtMost(10)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn find_pages_and_projects() {
        let store = collection();
        let options = FindOptions {
            projection: Some(vec!["id".to_string()]),
            skip: 1,
            limit: Some(2),
        };
        let page: Vec<PersonRecord> = store
            .find(&FilterExpression::new(), options)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].get("id"), Some(&json!("I2")));
        assert!(page[0].contains_key("_id"));
        assert!(!page[0].contains_key("NOTE"));
    }
}
