//! The CRM data model: customers, events, event line items, payments.
//!
//! All records serialize with camelCase field names and RFC 3339 dates to
//! stay byte-compatible with the legacy persisted layout. Optional fields
//! are omitted when absent rather than written as `null`, which is how the
//! original data was shaped; in particular the three tax fields on
//! [`Event`] exist as a trio or not at all.
//!
//! Monetary amounts are plain `f64`. That matches the demo-grade precision
//! of the source data and is NOT suitable for audited financial totals.

use crate::entity::Entity;
use crate::key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of an event.
///
/// `Paid` is directly settable as a manual override; nothing reconciles
/// it against recorded payments. Use [`Event::is_fully_paid`] when you
/// need the computed answer instead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Prospect,
    Confirmed,
    /// The event took place. Older blobs spell this `show_completed`.
    #[serde(alias = "show_completed")]
    Delivered,
    Paid,
}

/// Booking category of an event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Wedding,
    Birthday,
    Corporate,
    Club,
    Other,
}

impl EventCategory {
    /// Stable label used in reporting buckets.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Wedding => "wedding",
            EventCategory::Birthday => "birthday",
            EventCategory::Corporate => "corporate",
            EventCategory::Club => "club",
            EventCategory::Other => "other",
        }
    }
}

/// Currency a payment was taken in.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Crc,
    Usd,
    Eur,
}

/// How a payment was made.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Credit,
    Transfer,
    Check,
}

// ============================================================================
// Customer
// ============================================================================

/// A customer record.
///
/// `user_id` is the owning namespace and is immutable after creation;
/// it is injected by the repository and not reachable from a patch.
/// Deleting a customer does NOT cascade to its events - orphaned events
/// keep referencing the deleted id. That relationship gap is preserved
/// from the original system.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_number: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new [`Customer`].
#[derive(Clone, Debug)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub identification_number: Option<String>,
}

/// Partial update for a [`Customer`]. `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub identification_number: Option<String>,
}

impl Entity for Customer {
    type Draft = CustomerDraft;
    type Patch = CustomerPatch;

    fn collection() -> &'static str {
        key::CUSTOMERS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(draft: CustomerDraft, id: String, user_id: &str, now: DateTime<Utc>) -> Self {
        Customer {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            notes: draft.notes,
            identification_number: draft.identification_number,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: CustomerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(identification_number) = patch.identification_number {
            self.identification_number = Some(identification_number);
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

// ============================================================================
// Event
// ============================================================================

/// A booked (or prospective) event.
///
/// `customer_id` is an unenforced reference: nothing validates that the
/// customer exists at write time.
///
/// The three tax fields are a derived trio. `tax_amount` and
/// `total_with_tax` are always recomputed together from `cost` and
/// `tax_percentage`, and clearing tax removes all three. They are managed
/// through the event repository's `add_tax`/`remove_tax` (or
/// [`Event::apply_tax`]/[`Event::clear_tax`] on an owned value), never
/// patched individually.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub customer_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    /// Base amount before tax.
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<f64>,
    /// Derived: `cost * tax_percentage / 100`. Present only with tax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    /// Derived: `cost + tax_amount`. Present only with tax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_with_tax: Option<f64>,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// The amount used everywhere in reporting: `total_with_tax` when tax
    /// has been applied, else the base `cost`.
    pub fn effective_total(&self) -> f64 {
        self.total_with_tax.unwrap_or(self.cost)
    }

    /// Recompute the derived tax trio from `cost` and `percentage`.
    pub fn apply_tax(&mut self, percentage: f64) {
        let tax_amount = self.cost * percentage / 100.0;
        self.tax_percentage = Some(percentage);
        self.tax_amount = Some(tax_amount);
        self.total_with_tax = Some(self.cost + tax_amount);
    }

    /// Remove the derived tax trio. The effective total falls back to the
    /// base cost.
    pub fn clear_tax(&mut self) {
        self.tax_percentage = None;
        self.tax_amount = None;
        self.total_with_tax = None;
    }

    /// Computed payment reconciliation: whether payments recorded against
    /// this event cover its effective total.
    ///
    /// Independent of [`EventStatus::Paid`], which remains a manual flag.
    /// Payments for other events are ignored, so the full payment list
    /// can be passed as-is.
    pub fn is_fully_paid(&self, payments: &[Payment]) -> bool {
        let collected: f64 = payments
            .iter()
            .filter(|p| p.event_id == self.id)
            .map(|p| p.amount)
            .sum();
        collected >= self.effective_total()
    }
}

/// Caller-supplied fields for a new [`Event`].
#[derive(Clone, Debug)]
pub struct EventDraft {
    pub customer_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub cost: f64,
    pub status: EventStatus,
    pub category: Option<EventCategory>,
    pub comments: Option<String>,
}

/// Partial update for an [`Event`]. `None` fields are left unchanged.
///
/// The derived tax fields are deliberately absent; changing `cost` on an
/// event that has tax applied re-derives the pair so the trio never goes
/// stale.
#[derive(Clone, Debug, Default)]
pub struct EventPatch {
    pub customer_id: Option<String>,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub cost: Option<f64>,
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
    pub comments: Option<String>,
}

impl Entity for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;

    fn collection() -> &'static str {
        key::EVENTS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(draft: EventDraft, id: String, user_id: &str, now: DateTime<Utc>) -> Self {
        Event {
            id,
            customer_id: draft.customer_id,
            title: draft.title,
            date: draft.date,
            venue: draft.venue,
            cost: draft.cost,
            tax_percentage: None,
            tax_amount: None,
            total_with_tax: None,
            status: draft.status,
            category: draft.category,
            comments: draft.comments,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: EventPatch) {
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(venue) = patch.venue {
            self.venue = venue;
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(comments) = patch.comments {
            self.comments = Some(comments);
        }

        // Keep the derived trio in step with the (possibly new) cost.
        if let Some(percentage) = self.tax_percentage {
            self.apply_tax(percentage);
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

// ============================================================================
// EventDetail
// ============================================================================

/// A line item (equipment, staffing, …) attached to an event.
///
/// Pure child of [`Event`]; it has no lifecycle meaning of its own.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub id: String,
    pub event_id: String,
    pub description: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new [`EventDetail`].
#[derive(Clone, Debug)]
pub struct EventDetailDraft {
    pub event_id: String,
    pub description: String,
    pub quantity: u32,
    pub notes: Option<String>,
}

/// Partial update for an [`EventDetail`]. `None` fields are left
/// unchanged.
#[derive(Clone, Debug, Default)]
pub struct EventDetailPatch {
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub notes: Option<String>,
}

impl Entity for EventDetail {
    type Draft = EventDetailDraft;
    type Patch = EventDetailPatch;

    fn collection() -> &'static str {
        key::EVENT_DETAILS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(draft: EventDetailDraft, id: String, _user_id: &str, now: DateTime<Utc>) -> Self {
        EventDetail {
            id,
            event_id: draft.event_id,
            description: draft.description,
            quantity: draft.quantity,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: EventDetailPatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

// ============================================================================
// Payment
// ============================================================================

/// A payment recorded against an event.
///
/// Multiple payments may exist per event. Nothing enforces that the sum
/// of payments stays at or below the event total - partial payment and
/// overpayment are both representable and neither is flagged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub event_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new [`Payment`].
#[derive(Clone, Debug)]
pub struct PaymentDraft {
    pub event_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    pub notes: Option<String>,
}

/// Partial update for a [`Payment`]. `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct PaymentPatch {
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub payment_date: Option<DateTime<Utc>>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl Entity for Payment {
    type Draft = PaymentDraft;
    type Patch = PaymentPatch;

    fn collection() -> &'static str {
        key::PAYMENTS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(draft: PaymentDraft, id: String, _user_id: &str, now: DateTime<Utc>) -> Self {
        Payment {
            id,
            event_id: draft.event_id,
            amount: draft.amount,
            currency: draft.currency,
            payment_date: draft.payment_date,
            method: draft.method,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: PaymentPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(payment_date) = patch.payment_date {
            self.payment_date = payment_date;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
