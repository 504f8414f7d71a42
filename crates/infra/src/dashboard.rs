//! Dashboard aggregation: independent reads issued together, joined on completion.

use serde::Serialize;
use tracing::instrument;

use realtyops_listings::{format_compact, Property, PropertyStatus};

use crate::orders::{load_details, OrderDetails};
use crate::repo;
use crate::store::{Filter, Query, RecordStore, StoreError, Table};

pub const RECENT_LISTINGS: usize = 3;
pub const RECENT_ACTIVITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    /// Sum of sold listing prices, whole BRL.
    pub total_sales: u64,
    /// `total_sales` in compact form, e.g. `R$2M`.
    pub total_sales_label: String,
    pub new_leads_count: u64,
    pub sold_properties_count: u64,
    pub active_properties_count: u64,
    pub recent_listings: Vec<Property>,
    pub recent_activity: Vec<OrderDetails>,
}

fn status_filter(statuses: &[PropertyStatus]) -> Filter {
    let labels = statuses
        .iter()
        .flat_map(|s| s.stored_labels().iter().copied());
    Filter::all().and_in("status", labels)
}

/// Issue the six dashboard reads concurrently. Any failure fails the whole snapshot.
#[instrument(skip_all, err)]
pub async fn load_dashboard<S>(store: &S) -> Result<DashboardSnapshot, StoreError>
where
    S: RecordStore + ?Sized,
{
    let all = Filter::all();
    let sold = status_filter(&[PropertyStatus::Sold]);
    let active = status_filter(&PropertyStatus::ACTIVE);
    let sold_query = Query::filtered(sold.clone());
    let listings_query = Query::all().newest_first().limit(RECENT_LISTINGS);
    let activity_query = Query::all().newest_first().limit(RECENT_ACTIVITY);

    let (
        sold_properties,
        new_leads_count,
        sold_properties_count,
        active_properties_count,
        recent_listings,
        recent_activity,
    ) = tokio::try_join!(
        repo::list::<Property, _>(store, &sold_query),
        store.count(Table::Leads, &all),
        store.count(Table::Properties, &sold),
        store.count(Table::Properties, &active),
        repo::list::<Property, _>(store, &listings_query),
        load_details(store, &activity_query),
    )?;

    // Saturates: stored records predate price validation.
    let total_sales = sold_properties
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.price));

    Ok(DashboardSnapshot {
        total_sales,
        total_sales_label: format_compact(total_sales),
        new_leads_count,
        sold_properties_count,
        active_properties_count,
        recent_listings,
        recent_activity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use realtyops_core::UserId;
    use realtyops_listings::{ListingDraft, PropertyId};

    use crate::store::{InMemoryRecordStore, Record};

    async fn listing(store: &InMemoryRecordStore, address: &str, price: u64, status: PropertyStatus, age_days: i64) {
        let p = ListingDraft {
            name: None,
            address: address.into(),
            price,
            beds: 1,
            baths: 1,
            sqft: 50,
            status: Some(status),
            image_url: None,
        }
        .into_property(PropertyId::generate(), UserId::new(), Utc::now() - Duration::days(age_days));
        repo::insert(store, &p).await.unwrap();
    }

    #[tokio::test]
    async fn empty_store_gives_zeroes() {
        let snapshot = load_dashboard(&InMemoryRecordStore::new()).await.unwrap();
        assert_eq!(snapshot.total_sales, 0);
        assert_eq!(snapshot.total_sales_label, "R$0");
        assert!(snapshot.recent_listings.is_empty());
        assert!(snapshot.recent_activity.is_empty());
    }

    #[tokio::test]
    async fn aggregates_sales_and_counts() {
        let store = InMemoryRecordStore::new();
        listing(&store, "Rua 1", 1_200_000, PropertyStatus::Sold, 4).await;
        listing(&store, "Rua 2", 800_000, PropertyStatus::Sold, 3).await;
        listing(&store, "Rua 3", 500_000, PropertyStatus::ForSale, 2).await;
        listing(&store, "Rua 4", 450_000, PropertyStatus::Pending, 1).await;
        listing(&store, "Rua 5", 300_000, PropertyStatus::ForSale, 0).await;

        let snapshot = load_dashboard(&store).await.unwrap();
        assert_eq!(snapshot.total_sales, 2_000_000);
        assert_eq!(snapshot.total_sales_label, "R$2M");
        assert_eq!(snapshot.sold_properties_count, 2);
        assert_eq!(snapshot.active_properties_count, 3);
        assert_eq!(snapshot.new_leads_count, 0);

        let addresses: Vec<_> = snapshot.recent_listings.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, ["Rua 5", "Rua 4", "Rua 3"]);
    }

    #[tokio::test]
    async fn total_sales_saturates_instead_of_overflowing() {
        let store = InMemoryRecordStore::new();
        listing(&store, "Rua 1", u64::MAX / 2 + 1, PropertyStatus::Sold, 1).await;
        listing(&store, "Rua 2", u64::MAX / 2 + 1, PropertyStatus::Sold, 0).await;

        let snapshot = load_dashboard(&store).await.unwrap();
        assert_eq!(snapshot.total_sales, u64::MAX);
        assert_eq!(snapshot.sold_properties_count, 2);
    }

    #[tokio::test]
    async fn legacy_status_labels_are_counted() {
        let store = InMemoryRecordStore::new();
        let mut record = Record::new();
        record.insert("id".into(), PropertyId::generate().to_string().into());
        record.insert("address".into(), "Rua Antiga".into());
        record.insert("price".into(), 100_000.into());
        record.insert("beds".into(), 1.into());
        record.insert("baths".into(), 1.into());
        record.insert("sqft".into(), 40.into());
        record.insert("status".into(), "Vendido".into());
        store.insert(Table::Properties, record).await.unwrap();

        let snapshot = load_dashboard(&store).await.unwrap();
        assert_eq!(snapshot.sold_properties_count, 1);
        assert_eq!(snapshot.total_sales, 100_000);
    }

    #[tokio::test]
    async fn any_failed_read_fails_the_snapshot() {
        struct LeadsDown(Arc<InMemoryRecordStore>);

        #[async_trait]
        impl RecordStore for LeadsDown {
            async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
                self.0.select(table, query).await
            }

            async fn count(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
                if table == Table::Leads {
                    return Err(StoreError::backend("count", "timeout"));
                }
                self.0.count(table, filter).await
            }

            async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
                self.0.insert(table, record).await
            }

            async fn update(&self, table: Table, filter: &Filter, fields: Record) -> Result<Vec<Record>, StoreError> {
                self.0.update(table, filter, fields).await
            }

            async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
                self.0.delete(table, filter).await
            }
        }

        let err = load_dashboard(&LeadsDown(Arc::new(InMemoryRecordStore::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { operation: "count", .. }));
    }
}
