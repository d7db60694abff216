//! Core data models for the books
//!
//! Records are stored with camelCase keys. Amount fields accept numbers,
//! numeric strings or null and coerce anything else to zero; text fields
//! accept null as empty.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::balance::outstanding;
use super::money::lenient;
use super::types::TransactionType;

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// A customer sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: u64,
    /// Invoice number, e.g. `INV-0001`
    #[serde(default, deserialize_with = "lenient_text")]
    pub invoice_no: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_no: String,
    /// ISO date
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product: String,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    /// Cash received
    #[serde(default, deserialize_with = "lenient")]
    pub cash: Decimal,
    #[serde(default, deserialize_with = "lenient_text")]
    pub note: String,
}

impl Sale {
    /// Amount the customer still owes; negative when overpaid
    pub fn unpaid(&self) -> Decimal {
        outstanding(self.total, self.cash)
    }
}

/// Money returned to a customer against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub invoice_no: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_no: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product: String,
    /// Amount owed back to the customer
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    /// Cash already paid back
    #[serde(default, deserialize_with = "lenient")]
    pub cash: Decimal,
    #[serde(default, deserialize_with = "lenient_text")]
    pub note: String,
}

impl Refund {
    /// Amount still owed to the customer
    pub fn unpaid(&self) -> Decimal {
        outstanding(self.total, self.cash)
    }

    /// Settled when the full amount went out in cash
    pub fn is_settled(&self) -> bool {
        self.total == self.cash && self.unpaid().is_zero()
    }
}

/// A supplier with an opening position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub note: String,
    /// Opening amount the supplier owes us
    #[serde(default, deserialize_with = "lenient")]
    pub debit: Decimal,
    /// Opening amount we owe the supplier
    #[serde(default, deserialize_with = "lenient")]
    pub credit: Decimal,
}

/// One movement on a supplier account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOrder {
    pub id: u64,
    pub supplier_id: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product: String,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default, deserialize_with = "lenient")]
    pub amount_credit: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub amount_debit: Decimal,
}

/// Cash spent on running the business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient")]
    pub cash: Decimal,
}

/// A sale or refund paired with its derived outstanding amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutstandingRow<T> {
    #[serde(flatten)]
    pub record: T,
    pub unpaid: Decimal,
}

impl From<&Sale> for OutstandingRow<Sale> {
    fn from(sale: &Sale) -> Self {
        Self {
            unpaid: sale.unpaid(),
            record: sale.clone(),
        }
    }
}

impl From<&Refund> for OutstandingRow<Refund> {
    fn from(refund: &Refund) -> Self {
        Self {
            unpaid: refund.unpaid(),
            record: refund.clone(),
        }
    }
}

// ==================== Drafts ====================
//
// Form input for create and edit. Amounts stay as typed until the books
// coerce them.

/// Sale form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleDraft {
    pub date: String,
    pub customer_name: String,
    pub product: String,
    pub total: String,
    pub cash: String,
    pub note: String,
}

/// Refund form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefundDraft {
    pub invoice_no: String,
    pub customer_no: String,
    pub date: String,
    pub customer_name: String,
    pub product: String,
    pub total: String,
    pub cash: String,
    pub note: String,
}

/// Supplier form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierDraft {
    pub name: String,
    pub note: String,
    pub debit: String,
    pub credit: String,
}

/// Supplier order form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierOrderDraft {
    pub supplier_id: Option<u64>,
    pub date: String,
    pub customer_name: String,
    pub product: String,
    pub transaction_type: TransactionType,
    pub amount_credit: String,
    pub amount_debit: String,
}

/// Expense form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseDraft {
    pub date: String,
    pub description: String,
    pub note: String,
    pub cash: String,
}

// Edit forms open prefilled with the stored record

impl From<&Sale> for SaleDraft {
    fn from(sale: &Sale) -> Self {
        Self {
            date: sale.date.clone(),
            customer_name: sale.customer_name.clone(),
            product: sale.product.clone(),
            total: sale.total.to_string(),
            cash: sale.cash.to_string(),
            note: sale.note.clone(),
        }
    }
}

impl From<&Refund> for RefundDraft {
    fn from(refund: &Refund) -> Self {
        Self {
            invoice_no: refund.invoice_no.clone(),
            customer_no: refund.customer_no.clone(),
            date: refund.date.clone(),
            customer_name: refund.customer_name.clone(),
            product: refund.product.clone(),
            total: refund.total.to_string(),
            cash: refund.cash.to_string(),
            note: refund.note.clone(),
        }
    }
}

impl From<&Supplier> for SupplierDraft {
    fn from(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            note: supplier.note.clone(),
            debit: supplier.debit.to_string(),
            credit: supplier.credit.to_string(),
        }
    }
}

impl From<&SupplierOrder> for SupplierOrderDraft {
    fn from(order: &SupplierOrder) -> Self {
        Self {
            supplier_id: Some(order.supplier_id),
            date: order.date.clone(),
            customer_name: order.customer_name.clone(),
            product: order.product.clone(),
            transaction_type: order.transaction_type,
            amount_credit: order.amount_credit.to_string(),
            amount_debit: order.amount_debit.to_string(),
        }
    }
}

impl From<&Expense> for ExpenseDraft {
    fn from(expense: &Expense) -> Self {
        Self {
            date: expense.date.clone(),
            description: expense.description.clone(),
            note: expense.note.clone(),
            cash: expense.cash.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sale_from_loose_json() {
        let json = r#"{
            "id": 3,
            "invoiceNo": "INV-0003",
            "date": "2024-01-05",
            "customerName": null,
            "product": "Chair",
            "total": "120.50",
            "cash": 100,
            "unpaid": 999,
            "note": 12
        }"#;
        let sale: Sale = serde_json::from_str(json).unwrap();
        assert_eq!(sale.id, 3);
        assert_eq!(sale.customer_name, "");
        assert_eq!(sale.customer_no, "");
        assert_eq!(sale.total, dec!(120.50));
        assert_eq!(sale.cash, dec!(100));
        assert_eq!(sale.note, "12");
        // Stored unpaid values are ignored, the derived one wins
        assert_eq!(sale.unpaid(), dec!(20.50));
    }

    #[test]
    fn test_refund_settlement() {
        let mut refund = Refund {
            id: 1,
            invoice_no: "INV-0001".into(),
            customer_no: String::new(),
            date: "2024-01-01".into(),
            customer_name: "Ana".into(),
            product: "Chair".into(),
            total: dec!(50),
            cash: dec!(50),
            note: String::new(),
        };
        assert!(refund.is_settled());

        refund.cash = dec!(20);
        assert!(!refund.is_settled());
        assert_eq!(refund.unpaid(), dec!(30));
    }

    #[test]
    fn test_outstanding_row_serializes_flat() {
        let sale = Sale {
            id: 1,
            invoice_no: "INV-0001".into(),
            customer_no: "C-0001".into(),
            date: "2024-01-01".into(),
            customer_name: "Ana".into(),
            product: "Chair".into(),
            total: dec!(10),
            cash: dec!(4),
            note: String::new(),
        };
        let value = serde_json::to_value(OutstandingRow::from(&sale)).unwrap();
        assert_eq!(value["invoiceNo"], "INV-0001");
        assert_eq!(value["unpaid"], "6");
    }

    #[test]
    fn test_supplier_order_defaults() {
        let order: SupplierOrder =
            serde_json::from_str(r#"{"id": 1, "supplierId": 2, "amountCredit": "40"}"#).unwrap();
        assert_eq!(order.transaction_type, TransactionType::Invoice);
        assert_eq!(order.amount_credit, dec!(40));
        assert_eq!(order.amount_debit, Decimal::ZERO);
    }
}
