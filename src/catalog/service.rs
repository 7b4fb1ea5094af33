//! Catalog Service
//!
//! Chooses a [`DataSource`] per request, serves unfiltered listings from the
//! [`ListingCache`] while it is valid, and keeps the cache coherent with
//! every successful mutation.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, Clock, ListingCache, SystemClock};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    DatabaseHealth, ListingParams, ListingResponse, NewProperty, Pagination, Property,
    PropertyPatch,
};
use crate::query::{ListingSpec, QueryBuilder};
use crate::store::{DataSource, PropertyStore, StaticFallback, StoreError, StoreHealth};

/// Property catalog backed by a store with a static fallback.
pub struct CatalogService {
    store: Arc<dyn PropertyStore>,
    fallback: StaticFallback,
    health: StoreHealth,
    cache: Arc<RwLock<ListingCache>>,
    clock: Arc<dyn Clock>,
    builder: QueryBuilder,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        fallback: StaticFallback,
        health: StoreHealth,
        cache: ListingCache,
        builder: QueryBuilder,
    ) -> Self {
        Self {
            store,
            fallback,
            health,
            cache: Arc::new(RwLock::new(cache)),
            clock: Arc::new(SystemClock),
            builder,
        }
    }

    /// Wires the service from configuration.
    pub fn from_config(store: Arc<dyn PropertyStore>, health: StoreHealth, config: &Config) -> Self {
        Self::new(
            store,
            StaticFallback::new(&config.fallback_path),
            health,
            ListingCache::new(config.cache_ttl_ms),
            QueryBuilder::from_config(config),
        )
    }

    /// Replaces the wall clock used for cache validity.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(&self) -> Arc<RwLock<ListingCache>> {
        Arc::clone(&self.cache)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn health(&self) -> &StoreHealth {
        &self.health
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    fn source(&self) -> DataSource<'_> {
        if self.health.is_connected() {
            DataSource::Store(self.store.as_ref())
        } else {
            DataSource::StaticFallback(&self.fallback)
        }
    }

    fn store_failed(&self, operation: &str, err: &StoreError) {
        error!(operation, error = %err, "Store call failed");
        self.health.mark_disconnected();
    }

    // == Listing ==
    /// Filtered, sorted, paginated listing.
    ///
    /// Unfiltered requests on the store path are answered from the cache
    /// snapshot while it is valid; the snapshot is re-sorted and re-sliced
    /// for the requested page. A store failure flips the connection flag and
    /// the same request is answered from the fallback.
    pub async fn list(&self, params: &ListingParams) -> Result<ListingResponse> {
        let spec = self.builder.build(params);

        if spec.cacheable && self.health.is_connected() {
            let cached = self.cache.write().await.get(self.clock.now_ms());
            if let Some(snapshot) = cached {
                debug!(page = spec.page.page, limit = spec.page.limit, "Listing served from cache");
                return Ok(Self::respond(&spec, spec.apply(&snapshot)));
            }
        }

        let source = self.source();
        let result = match source.list(&spec).await {
            Ok(result) => {
                if spec.cacheable && source.is_store() {
                    self.refresh_cache().await;
                }
                result
            }
            Err(err) if source.is_store() => {
                self.store_failed("list", &err);
                warn!("Serving listing from static fallback");
                match self.fallback.query(&spec).await {
                    Ok(result) => result,
                    Err(err) => self.empty_listing(&err),
                }
            }
            Err(err) => self.empty_listing(&err),
        };

        Ok(Self::respond(&spec, result))
    }

    /// Both sources failed: the listing is empty rather than an error.
    fn empty_listing(&self, err: &StoreError) -> (Vec<Property>, u64) {
        warn!(
            path = %self.fallback.path().display(),
            error = %err,
            "Static fallback unavailable, serving an empty listing"
        );
        (Vec::new(), 0)
    }

    fn respond(spec: &ListingSpec, (properties, total): (Vec<Property>, u64)) -> ListingResponse {
        ListingResponse {
            properties,
            pagination: Pagination::new(spec.page.page, spec.page.limit, total),
        }
    }

    async fn refresh_cache(&self) {
        match self.store.list_all().await {
            Ok(all) => {
                let count = all.len();
                self.cache.write().await.store(all, self.clock.now_ms());
                debug!(count, "Listing cache refreshed");
            }
            Err(err) => warn!(error = %err, "Listing cache refresh skipped"),
        }
    }

    async fn invalidate_cache(&self) {
        self.cache.write().await.invalidate();
        debug!("Listing cache invalidated");
    }

    // == Detail ==
    /// Single record by id: the store first, then the fallback file.
    ///
    /// An unreadable fallback file counts as a miss.
    pub async fn detail(&self, id: &str) -> Result<Property> {
        if self.health.is_connected() {
            match self.store.find_by_id(id).await {
                Ok(Some(property)) => return Ok(property),
                Ok(None) => {}
                Err(err) => self.store_failed("find", &err),
            }
        }

        match self.fallback.find(id).await {
            Ok(found) => found.ok_or_else(ApiError::property_not_found),
            Err(err) => {
                warn!(id, error = %err, "Fallback lookup failed");
                Err(ApiError::property_not_found())
            }
        }
    }

    // == Mutations ==
    pub async fn create(&self, new: NewProperty) -> Result<Property> {
        let created = self.store.insert(new).await?;
        self.invalidate_cache().await;
        info!(id = %created.id, title = %created.title, "Property created");
        Ok(created)
    }

    /// Applies a partial update; only supplied fields change.
    pub async fn update(&self, id: &str, patch: &PropertyPatch) -> Result<Property> {
        let updated = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(ApiError::property_not_found)?;
        self.invalidate_cache().await;
        info!(id, "Property updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(ApiError::property_not_found());
        }
        self.invalidate_cache().await;
        info!(id, "Property deleted");
        Ok(())
    }

    // == Health ==
    /// Connection flag plus the record count of whichever source is live.
    /// An unreadable fallback file counts as zero records.
    pub async fn database_health(&self, users: usize) -> Result<DatabaseHealth> {
        let source = self.source();
        let counted = match source.count().await {
            Err(err) if source.is_store() => {
                self.store_failed("count", &err);
                self.fallback.count().await
            }
            counted => counted,
        };
        let properties = counted.unwrap_or_else(|err| {
            warn!(error = %err, "Static fallback unavailable, reporting zero properties");
            0
        });
        Ok(DatabaseHealth {
            connected: self.health.is_connected(),
            properties,
            users,
        })
    }

    /// Loads the fallback file into an empty store. Returns the number of
    /// records added.
    pub async fn seed_from_fallback(&self) -> Result<usize> {
        if self.store.count().await? > 0 {
            return Ok(0);
        }
        let records = self.fallback.load().await?;
        let added = self.store.seed(records).await?;
        info!(added, path = %self.fallback.path().display(), "Store seeded from fallback file");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::store::MemoryStore;
    use std::io::Write as _;

    const FALLBACK: &str = r#"[
        {"_id": "f1", "title": "Casa respaldo", "price": 100000, "type": "Casa", "status": "En venta", "featured": true},
        {"_id": "f2", "title": "Depto respaldo", "price": 800, "type": "Departamento", "status": "En alquiler"}
    ]"#;

    struct Harness {
        service: CatalogService,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        _file: tempfile::NamedTempFile,
    }

    fn harness(records: usize) -> Harness {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{FALLBACK}").unwrap();

        let seed = (0..records)
            .map(|i| {
                let mut new = NewProperty::new(format!("Casa {i}"), 1_000.0 * (i as f64 + 1.0));
                new.featured = i < 3;
                Property::from_new(format!("p{i}"), new, chrono::Utc::now())
            })
            .collect();
        let store = Arc::new(MemoryStore::with_records(seed));
        let clock = Arc::new(ManualClock::new(1_000_000));
        let service = CatalogService::new(
            store.clone(),
            StaticFallback::new(file.path()),
            StoreHealth::new(true),
            ListingCache::new(60_000),
            QueryBuilder::default(),
        )
        .with_clock(clock.clone());
        Harness {
            service,
            store,
            clock,
            _file: file,
        }
    }

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[tokio::test]
    async fn test_featured_filter_counts_across_pages() {
        let h = harness(13);
        let response = h
            .service
            .list(&params(&[("featured", "true"), ("limit", "12")]))
            .await
            .unwrap();
        assert_eq!(response.properties.len(), 3);
        assert_eq!(response.pagination.total_count, 3);
        assert!(!response.pagination.has_next_page);
    }

    #[tokio::test]
    async fn test_unfiltered_listing_fills_then_hits_cache() {
        let h = harness(5);
        let first = h.service.list(&ListingParams::default()).await.unwrap();
        let second = h.service.list(&ListingParams::default()).await.unwrap();

        assert_eq!(first.properties, second.properties);
        let stats = h.service.cache_stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.refreshes, 1);
    }

    #[tokio::test]
    async fn test_filtered_listing_bypasses_cache() {
        let h = harness(5);
        h.service.list(&params(&[("type", "Casa")])).await.unwrap();
        h.service.list(&params(&[("featured", "false")])).await.unwrap();
        let stats = h.service.cache_stats().await;
        assert_eq!(stats.hits + stats.misses + stats.refreshes, 0);
    }

    #[tokio::test]
    async fn test_cache_hit_honours_page_and_limit() {
        let h = harness(5);
        h.service.list(&ListingParams::default()).await.unwrap();

        let page = h
            .service
            .list(&params(&[("page", "2"), ("limit", "2"), ("sort", "price"), ("order", "asc")]))
            .await
            .unwrap();
        assert_eq!(h.service.cache_stats().await.hits, 1);

        let ids: Vec<_> = page.properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p3"]);
        assert_eq!(page.pagination.total_count, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.current_page, 2);
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let h = harness(2);
        h.service.list(&ListingParams::default()).await.unwrap();
        h.store
            .insert(NewProperty::new("Directo al store", 5.0))
            .await
            .unwrap();

        let cached = h.service.list(&ListingParams::default()).await.unwrap();
        assert_eq!(cached.pagination.total_count, 2);

        h.clock.advance(60_000);
        let fresh = h.service.list(&ListingParams::default()).await.unwrap();
        assert_eq!(fresh.pagination.total_count, 3);
    }

    #[tokio::test]
    async fn test_create_invalidates_warm_cache() {
        let h = harness(3);
        h.service.list(&ListingParams::default()).await.unwrap();

        let created = h
            .service
            .create(NewProperty::new("Casa X", 250_000.0))
            .await
            .unwrap();
        let listing = h.service.list(&ListingParams::default()).await.unwrap();
        assert!(listing.properties.iter().any(|p| p.id == created.id));
        assert_eq!(h.service.cache_stats().await.invalidations, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_invalidate_and_report_missing() {
        let h = harness(2);
        let patch = PropertyPatch {
            title: Some("Casa renovada".into()),
            ..Default::default()
        };
        let updated = h.service.update("p0", &patch).await.unwrap();
        assert_eq!(updated.title, "Casa renovada");
        assert!(matches!(
            h.service.update("nope", &patch).await,
            Err(ApiError::NotFound(_))
        ));

        h.service.delete("p1").await.unwrap();
        assert!(matches!(h.service.delete("p1").await, Err(ApiError::NotFound(_))));
        assert_eq!(h.service.cache_stats().await.invalidations, 2);
    }

    #[tokio::test]
    async fn test_store_outage_switches_to_fallback_for_good() {
        let h = harness(4);
        h.store.set_offline(true);

        let listing = h.service.list(&ListingParams::default()).await.unwrap();
        assert_eq!(listing.pagination.total_count, 2);
        assert!(!h.service.health().is_connected());

        // The flag is sticky even once the store recovers
        h.store.set_offline(false);
        let listing = h.service.list(&params(&[("featured", "true")])).await.unwrap();
        let ids: Vec<_> = listing.properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["f1"]);
    }

    #[tokio::test]
    async fn test_writes_fail_while_store_is_down() {
        let h = harness(1);
        h.store.set_offline(true);
        let err = h
            .service
            .create(NewProperty::new("Casa", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
        assert_eq!(h.service.cache_stats().await.invalidations, 0);
    }

    #[tokio::test]
    async fn test_detail_falls_back_on_store_miss() {
        let h = harness(1);
        assert_eq!(h.service.detail("p0").await.unwrap().title, "Casa 0");
        assert_eq!(h.service.detail("f2").await.unwrap().title, "Depto respaldo");
        assert!(matches!(
            h.service.detail("missing").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(h.service.health().is_connected());
    }

    #[tokio::test]
    async fn test_detail_on_store_error_uses_fallback() {
        let h = harness(1);
        h.store.set_offline(true);
        assert_eq!(h.service.detail("f1").await.unwrap().title, "Casa respaldo");
        assert!(!h.service.health().is_connected());
    }

    #[tokio::test]
    async fn test_outage_with_unreadable_fallback_is_empty_not_an_error() {
        let store = Arc::new(MemoryStore::with_records(Vec::new()));
        let service = CatalogService::new(
            store.clone(),
            StaticFallback::new("/nonexistent/realty/properties.json"),
            StoreHealth::new(true),
            ListingCache::new(60_000),
            QueryBuilder::default(),
        );
        store.set_offline(true);

        let listing = service.list(&params(&[("page", "2")])).await.unwrap();
        assert!(listing.properties.is_empty());
        assert_eq!(listing.pagination.total_count, 0);
        assert_eq!(listing.pagination.total_pages, 0);
        assert_eq!(listing.pagination.current_page, 2);
        assert!(!listing.pagination.has_next_page);
        assert!(!service.health().is_connected());

        // Already on the fallback path
        let listing = service.list(&ListingParams::default()).await.unwrap();
        assert!(listing.properties.is_empty());

        let health = service.database_health(0).await.unwrap();
        assert!(!health.connected);
        assert_eq!(health.properties, 0);

        assert!(matches!(service.detail("p0").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_store_error_and_unreadable_fallback_is_not_found() {
        let store = Arc::new(MemoryStore::with_records(Vec::new()));
        let service = CatalogService::new(
            store.clone(),
            StaticFallback::new("/nonexistent/realty/properties.json"),
            StoreHealth::new(true),
            ListingCache::new(60_000),
            QueryBuilder::default(),
        );
        assert!(matches!(service.detail("x").await, Err(ApiError::NotFound(_))));
        assert!(service.health().is_connected());

        store.set_offline(true);
        assert!(matches!(service.detail("x").await, Err(ApiError::NotFound(_))));
        assert!(!service.health().is_connected());
    }

    #[tokio::test]
    async fn test_database_health_reports_live_source() {
        let h = harness(6);
        let health = h.service.database_health(1).await.unwrap();
        assert!(health.connected);
        assert_eq!(health.properties, 6);
        assert_eq!(health.users, 1);

        h.store.set_offline(true);
        let health = h.service.database_health(1).await.unwrap();
        assert!(!health.connected);
        assert_eq!(health.properties, 2);
    }

    #[tokio::test]
    async fn test_seed_from_fallback_only_when_empty() {
        let h = harness(0);
        assert_eq!(h.service.seed_from_fallback().await.unwrap(), 2);
        assert_eq!(h.service.seed_from_fallback().await.unwrap(), 0);
        assert_eq!(h.store.count().await.unwrap(), 2);
    }
}
