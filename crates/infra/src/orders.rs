//! Purchase order workflows: the order write followed by property synchronization.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{info, instrument, warn};

use realtyops_core::{DomainError, UserId};
use realtyops_listings::{Property, PropertyId, PropertyStatus};
use realtyops_parties::{Client, ClientId};
use realtyops_purchasing::{
    ensure_references, reconcile, NewPurchaseOrder, PropertyStatusUpdate, PurchaseOrder,
    PurchaseOrderId, PurchaseOrderStatus,
};

use crate::repo;
use crate::store::{Filter, Query, Record, RecordStore, StoreError, Table};
use crate::sync_executor::EffectExecutor;

#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to the linked property after an order write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    NotRequired,
    Applied { command: PropertyStatusUpdate },
    /// The order write stands; the property was left as it was.
    Failed {
        command: PropertyStatusUpdate,
        error: String,
    },
}

impl SyncOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Result of a write to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderChange {
    pub order: PurchaseOrder,
    pub sync: SyncOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub id: ClientId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub name: Option<String>,
    pub address: String,
    pub price: u64,
    pub status: PropertyStatus,
}

impl From<Property> for PropertySummary {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            name: p.name,
            address: p.address,
            price: p.price,
            status: p.status,
        }
    }
}

/// An order joined with its client and property, as list views show it.
///
/// References that no longer resolve come back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub client: Option<ClientSummary>,
    pub property: Option<PropertySummary>,
}

/// Load orders matching `query` and join their clients and properties.
pub async fn load_details<S>(store: &S, query: &Query) -> Result<Vec<OrderDetails>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let orders = repo::list::<PurchaseOrder, _>(store, query).await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let client_ids: BTreeSet<String> = orders.iter().map(|o| o.client_id.to_string()).collect();
    let property_ids: BTreeSet<String> = orders.iter().map(|o| o.property_id.to_string()).collect();
    let clients_query = Query::filtered(Filter::all().and_in("id", client_ids));
    let properties_query = Query::filtered(Filter::all().and_in("id", property_ids));

    let (clients, properties) = tokio::try_join!(
        repo::list::<Client, _>(store, &clients_query),
        repo::list::<Property, _>(store, &properties_query),
    )?;

    let clients: HashMap<ClientId, Client> = clients.into_iter().map(|c| (c.id, c)).collect();
    let properties: HashMap<PropertyId, Property> =
        properties.into_iter().map(|p| (p.id, p)).collect();

    Ok(orders
        .into_iter()
        .map(|order| OrderDetails {
            client: clients.get(&order.client_id).map(|c| ClientSummary {
                id: c.id,
                name: c.name.clone(),
            }),
            property: properties.get(&order.property_id).cloned().map(Into::into),
            order,
        })
        .collect())
}

/// Purchase order operations over a record store and a property effect executor.
///
/// Every write to an order completes before the synchronizer runs; a failed
/// property write is reported in the returned [`SyncOutcome`] and never undoes
/// the order write. No retries.
#[derive(Debug, Clone)]
pub struct OrderService<S, E> {
    store: S,
    executor: E,
}

impl<S, E> OrderService<S, E>
where
    S: RecordStore,
    E: EffectExecutor,
{
    pub fn new(store: S, executor: E) -> Self {
        Self { store, executor }
    }

    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<OrderDetails>, StoreError> {
        let mut query = Query::all().newest_first();
        query.limit = limit;
        load_details(&self.store, &query).await
    }

    pub async fn get(&self, id: PurchaseOrderId) -> Result<OrderDetails, OrderServiceError> {
        let query = Query::filtered(Filter::by_id(id)).limit(1);
        load_details(&self.store, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found("purchase order").into())
    }

    /// The stored order alone, without the client and property join.
    pub async fn find(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, OrderServiceError> {
        repo::get::<PurchaseOrder, _>(&self.store, id)
            .await?
            .ok_or_else(|| DomainError::not_found("purchase order").into())
    }

    /// Open an order. Both references must resolve.
    #[instrument(skip(self, input), fields(client_id = %input.client_id, property_id = %input.property_id), err)]
    pub async fn create(&self, owner: UserId, input: NewPurchaseOrder) -> Result<OrderChange, OrderServiceError> {
        let (client_exists, property_exists) = tokio::try_join!(
            repo::exists::<Client, _>(&self.store, input.client_id),
            repo::exists::<Property, _>(&self.store, input.property_id),
        )?;
        ensure_references(client_exists, property_exists)?;

        let (order, command) = input.open(PurchaseOrderId::generate(), owner, Utc::now());
        let order = repo::insert(&self.store, &order).await?;
        info!(order_id = %order.id, status = %order.status, "purchase order created");

        let sync = self.synchronize(order.id, command).await;
        Ok(OrderChange { order, sync })
    }

    /// Write the new status, then bring the linked property in step.
    #[instrument(skip_all, fields(order_id = %id, status = %status), err)]
    pub async fn update_status(
        &self,
        id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> Result<OrderChange, OrderServiceError> {
        let mut order = self.find(id).await?;
        let previous = order.status;
        let command = order.set_status(status);

        let mut fields = Record::new();
        fields.insert("status".to_string(), JsonValue::String(status.as_str().to_string()));
        let updated = self
            .store
            .update(Table::PurchaseOrders, &Filter::by_id(id), fields)
            .await?;
        let Some(record) = updated.into_iter().next() else {
            return Err(DomainError::not_found("purchase order").into());
        };
        let order: PurchaseOrder = repo::from_record(Table::PurchaseOrders, record)?;
        info!(order_id = %id, from = %previous, to = %status, "purchase order status updated");

        let sync = self.synchronize(id, command).await;
        Ok(OrderChange { order, sync })
    }

    /// Make the linked property agree with the order's current status.
    ///
    /// Recovery path after a failed synchronization; a no-op when the two
    /// records already agree.
    #[instrument(skip_all, fields(order_id = %id), err)]
    pub async fn reconcile(&self, id: PurchaseOrderId) -> Result<OrderChange, OrderServiceError> {
        let order = self.find(id).await?;
        let property = repo::get::<Property, _>(&self.store, order.property_id)
            .await?
            .ok_or_else(|| DomainError::invariant("purchase order references a property that no longer exists"))?;

        let command = reconcile(order.status, property.status, property.id);
        let sync = self.synchronize(id, command).await;
        Ok(OrderChange { order, sync })
    }

    /// Remove an order. The linked property is left untouched.
    pub async fn delete(&self, id: PurchaseOrderId) -> Result<bool, StoreError> {
        let removed = repo::delete::<PurchaseOrder, _>(&self.store, id).await?;
        if removed {
            info!(order_id = %id, "purchase order deleted");
        }
        Ok(removed)
    }

    async fn synchronize(&self, order_id: PurchaseOrderId, command: Option<PropertyStatusUpdate>) -> SyncOutcome {
        let Some(command) = command else {
            return SyncOutcome::NotRequired;
        };

        match self.executor.apply(&command).await {
            Ok(()) => {
                info!(
                    order_id = %order_id,
                    property_id = %command.property_id,
                    status = %command.status,
                    "property status synchronized"
                );
                SyncOutcome::Applied { command }
            }
            Err(e) => {
                warn!(
                    order_id = %order_id,
                    property_id = %command.property_id,
                    status = %command.status,
                    error = %e,
                    "property status synchronization failed"
                );
                SyncOutcome::Failed { command, error: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use realtyops_listings::ListingDraft;
    use realtyops_parties::{ClientDraft, ContactInfo};

    use crate::store::InMemoryRecordStore;
    use crate::sync_executor::{StoreEffectExecutor, SyncError};

    /// Delegates to the in-memory store but rejects every write to `properties`.
    struct PropertyWritesFail(Arc<InMemoryRecordStore>);

    #[async_trait]
    impl RecordStore for PropertyWritesFail {
        async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
            self.0.select(table, query).await
        }

        async fn count(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
            self.0.count(table, filter).await
        }

        async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
            self.0.insert(table, record).await
        }

        async fn update(&self, table: Table, filter: &Filter, fields: Record) -> Result<Vec<Record>, StoreError> {
            if table == Table::Properties {
                return Err(StoreError::backend("update", "connection reset"));
            }
            self.0.update(table, filter, fields).await
        }

        async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
            self.0.delete(table, filter).await
        }
    }

    type Service = OrderService<Arc<InMemoryRecordStore>, StoreEffectExecutor<Arc<InMemoryRecordStore>>>;

    fn service() -> (Arc<InMemoryRecordStore>, Service) {
        let store = Arc::new(InMemoryRecordStore::new());
        let svc = OrderService::new(store.clone(), StoreEffectExecutor::new(store.clone()));
        (store, svc)
    }

    async fn seed<S: RecordStore + ?Sized>(store: &S) -> (ClientId, PropertyId) {
        let owner = UserId::new();
        let client = ClientDraft {
            name: "Ana Souza".into(),
            contact: ContactInfo::default(),
            last_contact: None,
        }
        .into_client(ClientId::generate(), owner, Utc::now());
        let property = ListingDraft {
            name: Some("Casa Verde".into()),
            address: "Rua E, 12".into(),
            price: 850_000,
            beds: 3,
            baths: 2,
            sqft: 140,
            status: None,
            image_url: None,
        }
        .into_property(PropertyId::generate(), owner, Utc::now());

        repo::insert(store, &client).await.unwrap();
        repo::insert(store, &property).await.unwrap();
        (client.id, property.id)
    }

    async fn property_status<S: RecordStore + ?Sized>(store: &S, id: PropertyId) -> PropertyStatus {
        repo::get::<Property, _>(store, id).await.unwrap().unwrap().status
    }

    fn new_order(client_id: ClientId, property_id: PropertyId, status: Option<PurchaseOrderStatus>) -> NewPurchaseOrder {
        NewPurchaseOrder { client_id, property_id, status }
    }

    #[tokio::test]
    async fn pending_to_sold_marks_property_sold() {
        let (store, svc) = service();
        let (client, property) = seed(&*store).await;
        let created = svc.create(UserId::new(), new_order(client, property, None)).await.unwrap();
        assert_eq!(created.sync, SyncOutcome::NotRequired);

        let change = svc
            .update_status(created.order.id, PurchaseOrderStatus::Sold)
            .await
            .unwrap();

        assert_eq!(change.order.status, PurchaseOrderStatus::Sold);
        assert_eq!(
            change.sync,
            SyncOutcome::Applied {
                command: PropertyStatusUpdate { property_id: property, status: PropertyStatus::Sold }
            }
        );
        assert_eq!(property_status(&*store, property).await, PropertyStatus::Sold);
    }

    #[tokio::test]
    async fn sold_to_cancelled_puts_property_back_on_sale() {
        let (store, svc) = service();
        let (client, property) = seed(&*store).await;
        let created = svc
            .create(UserId::new(), new_order(client, property, Some(PurchaseOrderStatus::Sold)))
            .await
            .unwrap();
        assert!(matches!(created.sync, SyncOutcome::Applied { .. }));
        assert_eq!(property_status(&*store, property).await, PropertyStatus::Sold);

        svc.update_status(created.order.id, PurchaseOrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(property_status(&*store, property).await, PropertyStatus::ForSale);
    }

    #[tokio::test]
    async fn pending_to_cancelled_leaves_property_alone() {
        let (store, svc) = service();
        let (client, property) = seed(&*store).await;
        let created = svc.create(UserId::new(), new_order(client, property, None)).await.unwrap();

        let change = svc
            .update_status(created.order.id, PurchaseOrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(change.sync, SyncOutcome::NotRequired);
        assert_eq!(property_status(&*store, property).await, PropertyStatus::ForSale);
    }

    #[tokio::test]
    async fn failed_property_write_keeps_new_order_status() {
        let inner = Arc::new(InMemoryRecordStore::new());
        let (client, property) = seed(&*inner).await;
        let store = Arc::new(PropertyWritesFail(inner.clone()));
        let svc = OrderService::new(store.clone(), StoreEffectExecutor::new(store.clone()));

        let created = svc.create(UserId::new(), new_order(client, property, None)).await.unwrap();
        let change = svc
            .update_status(created.order.id, PurchaseOrderStatus::Sold)
            .await
            .unwrap();

        assert!(change.sync.is_failed());
        let stored = repo::get::<PurchaseOrder, _>(&*inner, created.order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PurchaseOrderStatus::Sold);
        assert_eq!(property_status(&*inner, property).await, PropertyStatus::ForSale);

        // Once the store recovers, reconciliation repairs the divergence.
        let healthy = OrderService::new(inner.clone(), StoreEffectExecutor::new(inner.clone()));
        let repaired = healthy.reconcile(created.order.id).await.unwrap();
        assert!(matches!(repaired.sync, SyncOutcome::Applied { .. }));
        assert_eq!(property_status(&*inner, property).await, PropertyStatus::Sold);

        let again = healthy.reconcile(created.order.id).await.unwrap();
        assert_eq!(again.sync, SyncOutcome::NotRequired);
    }

    #[tokio::test]
    async fn executor_errors_are_reported_not_raised() {
        struct Unavailable;

        #[async_trait]
        impl EffectExecutor for Unavailable {
            async fn apply(&self, update: &PropertyStatusUpdate) -> Result<(), SyncError> {
                Err(SyncError::PropertyMissing(update.property_id))
            }
        }

        let store = Arc::new(InMemoryRecordStore::new());
        let (client, property) = seed(&*store).await;
        let svc = OrderService::new(store.clone(), Unavailable);
        let created = svc
            .create(UserId::new(), new_order(client, property, Some(PurchaseOrderStatus::Sold)))
            .await
            .unwrap();

        match created.sync {
            SyncOutcome::Failed { command, error } => {
                assert_eq!(command.status, PropertyStatus::Sold);
                assert!(error.contains("no longer exists"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let (store, svc) = service();
        let (client, _) = seed(&*store).await;
        let err = svc
            .create(UserId::new(), new_order(client, PropertyId::generate(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderServiceError::Domain(DomainError::InvariantViolation(_))));
        assert!(svc.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (_, svc) = service();
        let err = svc
            .update_status(PurchaseOrderId::generate(), PurchaseOrderStatus::Sold)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderServiceError::Domain(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn find_returns_the_bare_order() {
        let (store, svc) = service();
        let (client, property) = seed(&*store).await;
        let created = svc.create(UserId::new(), new_order(client, property, None)).await.unwrap();

        let found = svc.find(created.order.id).await.unwrap();
        assert_eq!(found, created.order);

        let err = svc.find(PurchaseOrderId::generate()).await.unwrap_err();
        assert!(matches!(err, OrderServiceError::Domain(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_joins_client_and_property() {
        let (store, svc) = service();
        let (client, property) = seed(&*store).await;
        let created = svc.create(UserId::new(), new_order(client, property, None)).await.unwrap();

        let details = svc.get(created.order.id).await.unwrap();
        assert_eq!(details.client.unwrap().name, "Ana Souza");
        assert_eq!(details.property.as_ref().unwrap().price, 850_000);

        let listed = svc.list(Some(5)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order.id, created.order.id);
    }

    #[tokio::test]
    async fn deleting_a_sold_order_leaves_property_sold() {
        let (store, svc) = service();
        let (client, property) = seed(&*store).await;
        let created = svc
            .create(UserId::new(), new_order(client, property, Some(PurchaseOrderStatus::Sold)))
            .await
            .unwrap();

        assert!(svc.delete(created.order.id).await.unwrap());
        assert!(!svc.delete(created.order.id).await.unwrap());
        assert_eq!(property_status(&*store, property).await, PropertyStatus::Sold);
    }
}
