//! Record ids and the invoice/customer number counters

use serde::{Deserialize, Serialize};
use tillbook_utils::sequence_label;

/// Next record id: highest existing id plus one, starting at 1
pub fn next_id<I>(ids: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    ids.into_iter().max().unwrap_or(0) + 1
}

/// `INV-0001` style invoice number
pub fn invoice_number(n: u32) -> String {
    sequence_label("INV-", n, 4)
}

/// `C-0001` style customer number
pub fn customer_number(n: u32) -> String {
    sequence_label("C-", n, 4)
}

/// Persisted counters; each holds the number the next sale will receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub next_invoice: u32,
    pub next_customer: u32,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            next_invoice: 1,
            next_customer: 1,
        }
    }
}

impl Counters {
    /// Numbers the next sale will be created with
    pub fn peek(&self) -> (String, String) {
        (
            invoice_number(self.next_invoice),
            customer_number(self.next_customer),
        )
    }

    /// Counters after one sale has been created
    pub fn advanced(&self) -> Self {
        Self {
            next_invoice: self.next_invoice + 1,
            next_customer: self.next_customer + 1,
        }
    }
}
