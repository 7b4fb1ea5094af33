//! In-process property store.
//!
//! Keeps records in insertion order behind a tokio `RwLock`. Used when no
//! database is configured and throughout the tests, where `set_offline`
//! simulates an outage.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewProperty, Property, PropertyPatch};
use crate::query::ListingSpec;
use crate::store::{PropertyStore, Result, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Property>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Property>) -> Self {
        Self {
            records: RwLock::new(records),
            offline: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn query(&self, spec: &ListingSpec) -> Result<(Vec<Property>, u64)> {
        self.ensure_online()?;
        let records = self.records.read().await;
        Ok(spec.apply(&records))
    }

    async fn list_all(&self) -> Result<Vec<Property>> {
        self.ensure_online()?;
        Ok(self.records.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>> {
        self.ensure_online()?;
        let records = self.records.read().await;
        Ok(records.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, new: NewProperty) -> Result<Property> {
        self.ensure_online()?;
        let property = Property::from_new(Uuid::new_v4().simple().to_string(), new, Utc::now());
        self.records.write().await.push(property.clone());
        Ok(property)
    }

    async fn update(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>> {
        self.ensure_online()?;
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|p| p.id == id).map(|property| {
            patch.apply_to(property);
            property.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.ensure_online()?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|p| p.id != id);
        Ok(records.len() < before)
    }

    async fn count(&self) -> Result<u64> {
        self.ensure_online()?;
        Ok(self.records.read().await.len() as u64)
    }

    async fn seed(&self, records: Vec<Property>) -> Result<usize> {
        self.ensure_online()?;
        let mut stored = self.records.write().await;
        let mut added = 0;
        for mut record in records {
            if record.id.is_empty() || stored.iter().any(|p| p.id == record.id) {
                record.id = Uuid::new_v4().simple().to_string();
            }
            stored.push(record);
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingParams;
    use crate::query::QueryBuilder;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let created = store.insert(NewProperty::new("Casa", 10.0)).await.unwrap();
        assert_eq!(created.id.len(), 32);
        assert!(created.created_at.is_some());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_record() {
        let store = MemoryStore::new();
        let patch = PropertyPatch {
            price: Some(1.0),
            ..Default::default()
        };
        assert!(store.update("nope", &patch).await.unwrap().is_none());
        assert!(!store.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let store = MemoryStore::new();
        let created = store.insert(NewProperty::new("Casa", 10.0)).await.unwrap();
        let patch = PropertyPatch {
            title: Some("Casa grande".into()),
            ..Default::default()
        };
        let updated = store.update(&created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Casa grande");
        assert_eq!(updated.price, 10.0);
        assert_eq!(store.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_query_filters_and_counts() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut new = NewProperty::new(format!("Casa {i}"), f64::from(i) * 100.0);
            new.featured = i % 2 == 0;
            store.insert(new).await.unwrap();
        }
        let params = ListingParams {
            featured: Some("true".into()),
            limit: Some("2".into()),
            ..Default::default()
        };
        let spec = QueryBuilder::default().build(&params);
        let (page, total) = store.query(&spec).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(store.count().await, Err(StoreError::Unavailable(_))));
        assert!(store.list_all().await.is_err());
        store.set_offline(false);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_keeps_ids_and_replaces_duplicates() {
        let store = MemoryStore::new();
        let a = Property::from_new("a", NewProperty::new("A", 1.0), Utc::now());
        let dup = Property::from_new("a", NewProperty::new("B", 2.0), Utc::now());
        assert_eq!(store.seed(vec![a, dup]).await.unwrap(), 2);

        let all = store.list_all().await.unwrap();
        assert_eq!(all[0].id, "a");
        assert_ne!(all[1].id, "a");
    }
}
