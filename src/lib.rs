//! # crm-kit
//!
//! An embeddable datastore and reporting layer for event/booking CRM data.
//!
//! ## What it is
//!
//! Four entity collections - customers, events, event line items,
//! payments - persisted as JSON blobs in a flat string key-value store,
//! namespaced per signed-in user, with pure aggregation functions for
//! dashboard reporting on top. The persisted layout matches the browser
//! local-storage data it replaces - each collection is one JSON array
//! under `"{collection}_{userId}"`, dates as ISO-8601 strings - so
//! existing blobs decode without migration. Rewritten blobs use the same
//! layout but are not guaranteed byte-identical (status spellings and
//! date precision are normalized on write).
//!
//! ## Features
//!
//! - **Backend Agnostic:** In-memory (default), file-backed, or any
//!   custom [`StringStore`] implementation
//! - **Per-User Namespacing:** The active user is resolved from the
//!   session record on every operation, never cached across a switch
//! - **Fail-Open Reads:** A malformed collection blob decodes as empty
//!   instead of propagating a parse error
//! - **Derived Fields:** Event tax amounts and tax-inclusive totals are
//!   recomputed as a pair, never set independently
//! - **Pure Reporting:** Revenue, top customers, category distribution,
//!   and monthly scheduled-vs-collected series as stateless functions
//!
//! ## Quick Start
//!
//! ```ignore
//! use crm_kit::{CrmService, store::InMemoryStore};
//! use crm_kit::model::{CustomerDraft, EventDraft, EventStatus, EventCategory};
//! use chrono::Utc;
//!
//! let crm = CrmService::new(InMemoryStore::new());
//!
//! let ana = crm.customers().add(CustomerDraft {
//!     name: "Ana".to_string(),
//!     email: "ana@x.com".to_string(),
//!     phone: "8888-0000".to_string(),
//!     notes: None,
//!     identification_number: None,
//! }).await?;
//!
//! let event = crm.events().add(EventDraft {
//!     customer_id: ana.id.clone(),
//!     title: "Wedding reception".to_string(),
//!     date: Utc::now(),
//!     venue: "Main hall".to_string(),
//!     cost: 1000.0,
//!     status: EventStatus::Prospect,
//!     category: Some(EventCategory::Wedding),
//!     comments: None,
//! }).await?;
//!
//! crm.events().add_tax(&event.id, 13.0).await?;
//! let snapshot = crm.dashboard().await?;
//! ```
//!
//! ## What it is not
//!
//! There are no transactions, no cross-entity referential enforcement,
//! and no multi-process coordination: collections are read and written
//! whole, last write wins. Deleting a customer leaves its events
//! orphaned. Monetary math is `f64`. All of this mirrors the system this
//! crate replaces and is documented rather than "fixed".

#[macro_use]
extern crate log;

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod key;
pub mod model;
pub mod observability;
pub mod repository;
pub mod serialization;
pub mod service;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use aggregate::{CategoryCount, CollectionSummary, CustomerRevenue, DateRange, MonthlyBucket};
pub use entity::Entity;
pub use error::{Error, Result};
pub use model::{Customer, Event, EventDetail, Payment};
pub use repository::Repository;
pub use service::{CrmService, DashboardSnapshot};
pub use session::{Session, SessionContext};
pub use store::StringStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
