//! Field-level change log for edits
//!
//! Values compare by their text form with missing values read as empty:
//! `0`, `"0"` and `0.00` are equal, `0` and `""` are not.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::next_id;
use super::models::{Expense, Refund, Sale, Supplier, SupplierOrder};
use super::types::EntityType;

/// A tracked field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Missing,
    Text(String),
    Amount(Decimal),
}

impl FieldValue {
    /// Text form used for comparison
    pub fn coerced(&self) -> String {
        match self {
            FieldValue::Missing => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Amount(d) => d.normalize().to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        FieldValue::Amount(d)
    }
}

/// Equality on coerced text
pub fn loose_equals(a: &FieldValue, b: &FieldValue) -> bool {
    a.coerced() == b.coerced()
}

/// Records whose edits are logged
pub trait Tracked {
    const ENTITY: EntityType;
    /// Fields compared on edit, in reporting order
    const TRACKED_FIELDS: &'static [&'static str];

    fn entity_id(&self) -> u64;

    /// Value of a tracked field, `Missing` for unknown names
    fn field(&self, name: &str) -> FieldValue;

    /// Human reference stored alongside the entry, e.g. an invoice number
    fn reference(&self) -> Option<String> {
        None
    }
}

/// One changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
}

/// One edit of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub id: u64,
    pub entity_type: EntityType,
    pub entity_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub changes: Vec<FieldChange>,
}

/// Changed fields between two versions of a record
pub fn diff_fields<T: Tracked>(old: &T, new: &T) -> Vec<FieldChange> {
    T::TRACKED_FIELDS
        .iter()
        .filter_map(|&name| {
            let old_value = old.field(name);
            let new_value = new.field(name);
            (!loose_equals(&old_value, &new_value)).then(|| FieldChange {
                field: name.to_string(),
                old_value,
                new_value,
            })
        })
        .collect()
}

/// Append-only edit history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry when any tracked field changed. Returns the new entry,
    /// or `None` when the edit changed nothing.
    pub fn record_change<T: Tracked>(
        &mut self,
        old: &T,
        new: &T,
        changed_at: DateTime<Utc>,
    ) -> Option<&ChangeLogEntry> {
        let changes = diff_fields(old, new);
        if changes.is_empty() {
            return None;
        }

        let entry = ChangeLogEntry {
            id: next_id(self.entries.iter().map(|e| e.id)),
            entity_type: T::ENTITY,
            entity_id: old.entity_id(),
            reference: old.reference(),
            changed_at,
            changes,
        };
        log::debug!(
            "Recorded {} change(s) on {} {}",
            entry.changes.len(),
            entry.entity_type,
            entry.entity_id
        );
        self.entries.push(entry);
        self.entries.last()
    }

    /// Entries for one record, oldest first
    pub fn history(&self, entity_type: EntityType, entity_id: u64) -> Vec<&ChangeLogEntry> {
        let mut found: Vec<&ChangeLogEntry> = self
            .entries
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .collect();
        found.sort_by_key(|e| e.changed_at);
        found
    }
}

impl Tracked for Sale {
    const ENTITY: EntityType = EntityType::Sale;
    const TRACKED_FIELDS: &'static [&'static str] =
        &["date", "customerName", "product", "total", "cash", "unpaid", "note"];

    fn entity_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "date" => self.date.as_str().into(),
            "customerName" => self.customer_name.as_str().into(),
            "product" => self.product.as_str().into(),
            "total" => self.total.into(),
            "cash" => self.cash.into(),
            "unpaid" => self.unpaid().into(),
            "note" => self.note.as_str().into(),
            _ => FieldValue::Missing,
        }
    }

    fn reference(&self) -> Option<String> {
        Some(self.invoice_no.clone()).filter(|s| !s.is_empty())
    }
}

impl Tracked for Refund {
    const ENTITY: EntityType = EntityType::Refund;
    const TRACKED_FIELDS: &'static [&'static str] =
        &["date", "customerName", "product", "total", "cash", "unpaid", "note"];

    fn entity_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "date" => self.date.as_str().into(),
            "customerName" => self.customer_name.as_str().into(),
            "product" => self.product.as_str().into(),
            "total" => self.total.into(),
            "cash" => self.cash.into(),
            "unpaid" => self.unpaid().into(),
            "note" => self.note.as_str().into(),
            _ => FieldValue::Missing,
        }
    }

    fn reference(&self) -> Option<String> {
        Some(self.invoice_no.clone()).filter(|s| !s.is_empty())
    }
}

impl Tracked for Supplier {
    const ENTITY: EntityType = EntityType::Supplier;
    const TRACKED_FIELDS: &'static [&'static str] = &["name", "note", "debit", "credit"];

    fn entity_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "name" => self.name.as_str().into(),
            "note" => self.note.as_str().into(),
            "debit" => self.debit.into(),
            "credit" => self.credit.into(),
            _ => FieldValue::Missing,
        }
    }
}

impl Tracked for SupplierOrder {
    const ENTITY: EntityType = EntityType::SupplierOrder;
    const TRACKED_FIELDS: &'static [&'static str] = &[
        "date",
        "customerName",
        "product",
        "transactionType",
        "amountCredit",
        "amountDebit",
    ];

    fn entity_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "date" => self.date.as_str().into(),
            "customerName" => self.customer_name.as_str().into(),
            "product" => self.product.as_str().into(),
            "transactionType" => FieldValue::Text(self.transaction_type.to_string()),
            "amountCredit" => self.amount_credit.into(),
            "amountDebit" => self.amount_debit.into(),
            _ => FieldValue::Missing,
        }
    }
}

impl Tracked for Expense {
    const ENTITY: EntityType = EntityType::Expense;
    const TRACKED_FIELDS: &'static [&'static str] = &["date", "description", "note", "cash"];

    fn entity_id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "date" => self.date.as_str().into(),
            "description" => self.description.as_str().into(),
            "note" => self.note.as_str().into(),
            "cash" => self.cash.into(),
            _ => FieldValue::Missing,
        }
    }
}
