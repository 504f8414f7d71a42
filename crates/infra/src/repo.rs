//! Typed access to the record store for entities that know their table.

use serde::de::DeserializeOwned;
use serde::Serialize;

use realtyops_core::Entity;
use realtyops_listings::Property;
use realtyops_parties::{Client, Lead};
use realtyops_purchasing::PurchaseOrder;

use crate::store::{Filter, Query, Record, RecordStore, StoreError, Table};

/// An entity stored as one record in a fixed table.
pub trait StoredEntity: Entity + Serialize + DeserializeOwned + Send + Sync {
    const TABLE: Table;
}

impl StoredEntity for Property {
    const TABLE: Table = Table::Properties;
}

impl StoredEntity for Lead {
    const TABLE: Table = Table::Leads;
}

impl StoredEntity for Client {
    const TABLE: Table = Table::Clients;
}

impl StoredEntity for PurchaseOrder {
    const TABLE: Table = Table::PurchaseOrders;
}

pub fn to_record<T: Serialize>(table: Table, value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::MalformedRecord {
            table,
            message: format!("expected a JSON object, found {other}"),
        }),
        Err(e) => Err(StoreError::MalformedRecord { table, message: e.to_string() }),
    }
}

pub fn from_record<T: DeserializeOwned>(table: Table, record: Record) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::Object(record)).map_err(|e| StoreError::Decode {
        table,
        message: e.to_string(),
    })
}

pub async fn list<T, S>(store: &S, query: &Query) -> Result<Vec<T>, StoreError>
where
    T: StoredEntity,
    S: RecordStore + ?Sized,
{
    store
        .select(T::TABLE, query)
        .await?
        .into_iter()
        .map(|r| from_record(T::TABLE, r))
        .collect()
}

pub async fn get<T, S>(store: &S, id: T::Id) -> Result<Option<T>, StoreError>
where
    T: StoredEntity,
    S: RecordStore + ?Sized,
{
    let query = Query::filtered(Filter::by_id(id)).limit(1);
    match store.select(T::TABLE, &query).await?.into_iter().next() {
        Some(record) => from_record(T::TABLE, record).map(Some),
        None => Ok(None),
    }
}

pub async fn exists<T, S>(store: &S, id: T::Id) -> Result<bool, StoreError>
where
    T: StoredEntity,
    S: RecordStore + ?Sized,
{
    Ok(store.count(T::TABLE, &Filter::by_id(id)).await? > 0)
}

pub async fn insert<T, S>(store: &S, entity: &T) -> Result<T, StoreError>
where
    T: StoredEntity,
    S: RecordStore + ?Sized,
{
    let record = store.insert(T::TABLE, to_record(T::TABLE, entity)?).await?;
    from_record(T::TABLE, record)
}

/// Overwrite every stored field of `entity`. `None` when it no longer exists.
pub async fn replace<T, S>(store: &S, entity: &T) -> Result<Option<T>, StoreError>
where
    T: StoredEntity,
    S: RecordStore + ?Sized,
{
    let fields = to_record(T::TABLE, entity)?;
    let updated = store
        .update(T::TABLE, &Filter::by_id(entity.id()), fields)
        .await?;
    match updated.into_iter().next() {
        Some(record) => from_record(T::TABLE, record).map(Some),
        None => Ok(None),
    }
}

/// Remove one entity by id, reporting whether it existed.
pub async fn delete<T, S>(store: &S, id: T::Id) -> Result<bool, StoreError>
where
    T: StoredEntity,
    S: RecordStore + ?Sized,
{
    Ok(store.delete(T::TABLE, &Filter::by_id(id)).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use chrono::Utc;
    use realtyops_core::UserId;
    use realtyops_listings::{ListingDraft, PropertyId, PropertyStatus};

    fn property(address: &str) -> Property {
        ListingDraft {
            name: None,
            address: address.to_string(),
            price: 300_000,
            beds: 2,
            baths: 1,
            sqft: 70,
            status: None,
            image_url: None,
        }
        .into_property(PropertyId::generate(), UserId::new(), Utc::now())
    }

    #[tokio::test]
    async fn insert_get_replace_delete() {
        let store = InMemoryRecordStore::new();
        let mut p = property("Rua B, 5");
        insert(&store, &p).await.unwrap();

        let loaded = get::<Property, _>(&store, p.id).await.unwrap().unwrap();
        assert_eq!(loaded, p);

        p.status = PropertyStatus::Pending;
        let replaced = replace(&store, &p).await.unwrap().unwrap();
        assert_eq!(replaced.status, PropertyStatus::Pending);

        assert!(delete::<Property, _>(&store, p.id).await.unwrap());
        assert!(get::<Property, _>(&store, p.id).await.unwrap().is_none());
        assert!(replace(&store, &p).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_records_decode() {
        let store = InMemoryRecordStore::new();
        let p = property("Rua C, 9");
        let mut record = to_record(Table::Properties, &p).unwrap();
        record.insert("status".into(), "Vendido".into());
        store.insert(Table::Properties, record).await.unwrap();

        let loaded = get::<Property, _>(&store, p.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, PropertyStatus::Sold);
    }

    #[tokio::test]
    async fn undecodable_record_is_a_decode_error() {
        let store = InMemoryRecordStore::new();
        let id = PropertyId::generate();
        let mut record = Record::new();
        record.insert("id".into(), id.to_string().into());
        store.insert(Table::Properties, record).await.unwrap();

        let err = get::<Property, _>(&store, id).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { table: Table::Properties, .. }));
    }
}
