//! High-level CRM service bundling the four repositories.
//!
//! Provides one handle over a shared backend: repositories for each
//! collection, session control, and a dashboard rollup.

use crate::aggregate::{
    self, CategoryCount, CollectionSummary, CustomerRevenue, MonthlyBucket,
};
use crate::error::Result;
use crate::model::{Customer, Event, EventDetail, Payment};
use crate::observability::StoreMetrics;
use crate::repository::Repository;
use crate::session::SessionContext;
use crate::store::StringStore;
use serde::Serialize;
use std::sync::Arc;

/// Everything the dashboard renders, computed in one pass over the
/// active user's data.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Σ effective totals over paid events.
    pub revenue_total: f64,
    /// Top five customers by paid revenue.
    pub top_customers: Vec<CustomerRevenue>,
    /// Event counts per category bucket.
    pub category_distribution: Vec<CategoryCount>,
    /// Scheduled vs collected amounts per calendar month, ascending.
    pub monthly_series: Vec<MonthlyBucket>,
    /// Overall collected vs pending amounts.
    pub collection: CollectionSummary,
}

/// Number of entries in the dashboard's top-customer ranking.
const TOP_CUSTOMER_COUNT: usize = 5;

/// High-level CRM datastore service.
///
/// Bundles one [`StringStore`] backend and one [`SessionContext`] into
/// repository handles for every collection. All handles share the same
/// backend, so a sign-in through [`CrmService::session`] immediately
/// re-namespaces every repository.
///
/// `Clone` is cheap and clones share state, making the service easy to
/// hand to each part of an application.
///
/// # Example
///
/// ```ignore
/// use crm_kit::{CrmService, store::InMemoryStore};
/// use crm_kit::model::CustomerDraft;
///
/// let crm = CrmService::new(InMemoryStore::new());
///
/// let ana = crm.customers().add(CustomerDraft {
///     name: "Ana".to_string(),
///     email: "ana@x.com".to_string(),
///     phone: "8888-0000".to_string(),
///     notes: None,
///     identification_number: None,
/// }).await?;
///
/// let snapshot = crm.dashboard().await?;
/// ```
#[derive(Clone)]
pub struct CrmService<S: StringStore> {
    customers: Repository<Customer, S>,
    events: Repository<Event, S>,
    event_details: Repository<EventDetail, S>,
    payments: Repository<Payment, S>,
    session: SessionContext<S>,
}

impl<S: StringStore> CrmService<S> {
    /// Create a service over `store`.
    pub fn new(store: S) -> Self {
        CrmService {
            customers: Repository::new(store.clone()),
            events: Repository::new(store.clone()),
            event_details: Repository::new(store.clone()),
            payments: Repository::new(store.clone()),
            session: SessionContext::new(store),
        }
    }

    /// Create a service with a custom metrics sink shared by all four
    /// repositories.
    pub fn with_metrics(store: S, metrics: Arc<dyn StoreMetrics>) -> Self {
        CrmService {
            customers: Repository::new(store.clone()).with_metrics(Arc::clone(&metrics)),
            events: Repository::new(store.clone()).with_metrics(Arc::clone(&metrics)),
            event_details: Repository::new(store.clone()).with_metrics(Arc::clone(&metrics)),
            payments: Repository::new(store.clone()).with_metrics(metrics),
            session: SessionContext::new(store),
        }
    }

    /// Customer collection.
    pub fn customers(&self) -> &Repository<Customer, S> {
        &self.customers
    }

    /// Event collection.
    pub fn events(&self) -> &Repository<Event, S> {
        &self.events
    }

    /// Event line-item collection.
    pub fn event_details(&self) -> &Repository<EventDetail, S> {
        &self.event_details
    }

    /// Payment collection.
    pub fn payments(&self) -> &Repository<Payment, S> {
        &self.payments
    }

    /// Session control (sign in, sign out, current user).
    pub fn session(&self) -> &SessionContext<S> {
        &self.session
    }

    /// Compute the full dashboard rollup for the active user.
    ///
    /// Loads customers, events, and payments once and feeds them through
    /// the aggregation functions. Recomputed on every call; nothing is
    /// cached.
    ///
    /// # Errors
    /// Returns `Err` only on a store failure; empty collections produce
    /// a zeroed snapshot.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot> {
        let customers = self.customers.get_all().await?;
        let events = self.events.get_all().await?;
        let payments = self.payments.get_all().await?;

        Ok(DashboardSnapshot {
            revenue_total: aggregate::revenue_total(&events),
            top_customers: aggregate::top_customers(&customers, &events, TOP_CUSTOMER_COUNT),
            category_distribution: aggregate::category_distribution(&events),
            monthly_series: aggregate::monthly_series(&events, &payments, None),
            collection: aggregate::pending_vs_collected(&events, &payments),
        })
    }
}
