//! MongoDB-backed property store.
//!
//! Records live in the `properties` collection with an ObjectId `_id`.
//! Identifiers that are not valid ObjectIds are treated as a miss.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{options::ReturnDocument, Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{NewProperty, Property, PropertyPatch, PropertyStatus};
use crate::query::{ListingSpec, PropertyFilter, SortOrder};
use crate::store::{PropertyStore, Result};

const COLLECTION: &str = "properties";

/// Stored shape. Absent optionals are not written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    description: String,
    price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bathrooms: Option<u32>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(rename = "type", default)]
    property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<PropertyStatus>,
    #[serde(default)]
    featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<bson::DateTime>,
}

impl PropertyDocument {
    fn from_property(id: ObjectId, property: Property) -> Self {
        Self {
            id,
            title: property.title,
            description: property.description,
            price: property.price,
            address: property.address,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            images: property.images,
            property_type: property.property_type,
            status: property.status,
            featured: property.featured,
            lat: property.lat,
            lng: property.lng,
            created_at: property.created_at.map(bson::DateTime::from_chrono),
        }
    }
}

impl From<PropertyDocument> for Property {
    fn from(doc: PropertyDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title,
            description: doc.description,
            price: doc.price,
            address: doc.address,
            bedrooms: doc.bedrooms,
            bathrooms: doc.bathrooms,
            images: doc.images,
            property_type: doc.property_type,
            status: doc.status,
            featured: doc.featured,
            lat: doc.lat,
            lng: doc.lng,
            created_at: doc.created_at.map(|dt| dt.to_chrono()),
        }
    }
}

pub struct MongoStore {
    database: Database,
    collection: Collection<PropertyDocument>,
}

impl MongoStore {
    /// Builds a client for `uri`. The driver connects lazily, so this only
    /// fails on a malformed connection string; use [`MongoStore::ping`] to
    /// check reachability.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database);
        let collection = database.collection::<PropertyDocument>(COLLECTION);
        Ok(Self {
            database,
            collection,
        })
    }

    /// Round-trips a `ping` command.
    pub async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        info!(database = self.database.name(), "MongoDB reachable");
        Ok(())
    }
}

fn filter_document(filter: &PropertyFilter) -> Document {
    let mut document = Document::new();
    if let Some(property_type) = &filter.property_type {
        document.insert("type", property_type.as_str());
    }
    if let Some(status) = &filter.status {
        document.insert("status", status.as_str());
    }
    if let Some(featured) = filter.featured {
        document.insert("featured", featured);
    }
    if filter.min_price.is_some() || filter.max_price.is_some() {
        let mut range = Document::new();
        if let Some(min) = filter.min_price {
            range.insert("$gte", min);
        }
        if let Some(max) = filter.max_price {
            range.insert("$lte", max);
        }
        document.insert("price", range);
    }
    document
}

fn set_document(patch: &PropertyPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(description) = &patch.description {
        set.insert("description", description.as_str());
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    if let Some(address) = &patch.address {
        set.insert("address", address.as_str());
    }
    if let Some(bedrooms) = patch.bedrooms {
        set.insert("bedrooms", i64::from(bedrooms));
    }
    if let Some(bathrooms) = patch.bathrooms {
        set.insert("bathrooms", i64::from(bathrooms));
    }
    if let Some(images) = &patch.images {
        let images: Vec<Bson> = images.iter().map(|i| Bson::String(i.clone())).collect();
        set.insert("images", images);
    }
    if let Some(property_type) = &patch.property_type {
        set.insert("type", property_type.as_str());
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    if let Some(featured) = patch.featured {
        set.insert("featured", featured);
    }
    if let Some(lat) = patch.lat {
        set.insert("lat", lat);
    }
    if let Some(lng) = patch.lng {
        set.insert("lng", lng);
    }
    set
}

#[async_trait]
impl PropertyStore for MongoStore {
    async fn query(&self, spec: &ListingSpec) -> Result<(Vec<Property>, u64)> {
        let filter = filter_document(&spec.filter);
        let mut sort = Document::new();
        let direction = match spec.sort.order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        sort.insert(spec.sort.field.as_str(), direction);

        let limit = i64::try_from(spec.page.limit).unwrap_or(i64::MAX);
        let documents: Vec<PropertyDocument> = self
            .collection
            .find(filter.clone())
            .sort(sort)
            .skip(spec.page.skip())
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        let total = self.collection.count_documents(filter).await?;

        Ok((documents.into_iter().map(Property::from).collect(), total))
    }

    async fn list_all(&self) -> Result<Vec<Property>> {
        let documents: Vec<PropertyDocument> = self
            .collection
            .find(Document::new())
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(Property::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let document = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(document.map(Property::from))
    }

    async fn insert(&self, new: NewProperty) -> Result<Property> {
        let id = ObjectId::new();
        let property = Property::from_new(id.to_hex(), new, Utc::now());
        let document = PropertyDocument::from_property(id, property.clone());
        self.collection.insert_one(&document).await?;
        Ok(property)
    }

    async fn update(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let set = set_document(patch);
        if set.is_empty() {
            return self.find_by_id(id).await;
        }
        let document = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(document.map(Property::from))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(Document::new()).await?)
    }

    async fn seed(&self, records: Vec<Property>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let documents: Vec<PropertyDocument> = records
            .into_iter()
            .map(|record| {
                let id = ObjectId::parse_str(&record.id).unwrap_or_else(|_| {
                    warn!(id = %record.id, "Seed record id is not an ObjectId, assigning a new one");
                    ObjectId::new()
                });
                let mut record = record;
                if record.created_at.is_none() {
                    record.created_at = Some(Utc::now());
                }
                PropertyDocument::from_property(id, record)
            })
            .collect();
        let result = self.collection.insert_many(documents).await?;
        Ok(result.inserted_ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document_shapes_price_range() {
        let filter = PropertyFilter {
            property_type: Some("Casa".into()),
            featured: Some(true),
            min_price: Some(100.0),
            ..Default::default()
        };
        let document = filter_document(&filter);
        assert_eq!(document.get_str("type").unwrap(), "Casa");
        assert!(document.get_bool("featured").unwrap());
        let range = document.get_document("price").unwrap();
        assert_eq!(range.get_f64("$gte").unwrap(), 100.0);
        assert!(range.get("$lte").is_none());
        assert!(document.get("status").is_none());
    }

    #[test]
    fn test_empty_filter_is_empty_document() {
        assert!(filter_document(&PropertyFilter::default()).is_empty());
    }

    #[test]
    fn test_set_document_only_has_supplied_fields() {
        let patch = PropertyPatch {
            price: Some(5.0),
            status: Some(PropertyStatus::ForRent),
            ..Default::default()
        };
        let set = set_document(&patch);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("status").unwrap(), "En alquiler");
    }

    #[test]
    fn test_document_round_trips_to_property() {
        let id = ObjectId::new();
        let property = Property::from_new(id.to_hex(), NewProperty::new("Casa", 1.0), Utc::now());
        let back = Property::from(PropertyDocument::from_property(id, property.clone()));
        assert_eq!(back.id, property.id);
        assert_eq!(back.title, "Casa");
    }
}
