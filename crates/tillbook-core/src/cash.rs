//! Cash ledger
//!
//! Ledger rows are derived from sales, refunds, supplier payments and
//! refunds, and expenses on every query. Rows sort by date and then by their
//! composite id compared as text. That tiebreak is stable but carries no
//! meaning across row kinds (`exp-3` sorts before `sale-12`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tillbook_utils::join_non_empty;

use super::filter::Filter;
use super::models::{Expense, Refund, Sale, Supplier, SupplierOrder};
use super::types::{CashEntryKind, TransactionType};

const LABEL_SEPARATOR: &str = " · ";

/// One cash movement, before running balances are attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashLedgerRow {
    /// Namespaced id: `sale-<id>`, `refund-<id>`, `suporder-<id>` or `exp-<id>`
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: CashEntryKind,
    pub description: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

/// A ledger row with the balance after it was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningRow {
    #[serde(flatten)]
    pub row: CashLedgerRow,
    pub balance: Decimal,
}

/// Folded ledger. `rows` are newest first; each balance reflects
/// chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashLedger {
    pub rows: Vec<RunningRow>,
    pub opening_balance: Decimal,
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub closing_balance: Decimal,
}

/// Derive ledger rows from the books.
///
/// Zero-amount movements and undated records produce no row. Supplier
/// invoices and returns never touch cash.
pub fn build_cash_ledger_rows(
    sales: &[Sale],
    refunds: &[Refund],
    supplier_orders: &[SupplierOrder],
    suppliers: &[Supplier],
    expenses: &[Expense],
) -> Vec<CashLedgerRow> {
    let supplier_names: HashMap<u64, &str> =
        suppliers.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut rows = Vec::new();

    for sale in sales.iter().filter(|s| s.cash > Decimal::ZERO) {
        rows.push(CashLedgerRow {
            id: format!("sale-{}", sale.id),
            date: sale.date.clone(),
            kind: CashEntryKind::Sale,
            description: format!("{} {}", sale.invoice_no, sale.customer_name).trim().to_string(),
            amount_in: sale.cash,
            amount_out: Decimal::ZERO,
        });
    }

    for refund in refunds.iter().filter(|r| r.cash > Decimal::ZERO) {
        rows.push(CashLedgerRow {
            id: format!("refund-{}", refund.id),
            date: refund.date.clone(),
            kind: CashEntryKind::Refund,
            description: format!("{} {}", refund.invoice_no, refund.customer_name).trim().to_string(),
            amount_in: Decimal::ZERO,
            amount_out: refund.cash,
        });
    }

    for order in supplier_orders {
        let (kind, amount_in, amount_out) = match order.transaction_type {
            TransactionType::Payment if order.amount_debit > Decimal::ZERO => {
                (CashEntryKind::SupplierPayment, Decimal::ZERO, order.amount_debit)
            }
            TransactionType::Refund if order.amount_credit > Decimal::ZERO => {
                (CashEntryKind::SupplierRefund, order.amount_credit, Decimal::ZERO)
            }
            _ => continue,
        };

        let supplier_name = supplier_names.get(&order.supplier_id).copied().unwrap_or("");
        rows.push(CashLedgerRow {
            id: format!("suporder-{}", order.id),
            date: order.date.clone(),
            kind,
            description: join_non_empty(
                [supplier_name, order.customer_name.as_str(), order.product.as_str()],
                LABEL_SEPARATOR,
            ),
            amount_in,
            amount_out,
        });
    }

    for expense in expenses.iter().filter(|e| e.cash > Decimal::ZERO) {
        rows.push(CashLedgerRow {
            id: format!("exp-{}", expense.id),
            date: expense.date.clone(),
            kind: CashEntryKind::Expense,
            description: join_non_empty(
                [expense.description.as_str(), expense.note.as_str()],
                LABEL_SEPARATOR,
            ),
            amount_in: Decimal::ZERO,
            amount_out: expense.cash,
        });
    }

    rows.retain(|r| !r.date.trim().is_empty());
    rows
}

/// Filter, sort and fold rows into a ledger starting from `opening_balance`
pub fn compute_running_ledger(
    rows: &[CashLedgerRow],
    opening_balance: Decimal,
    filter: &Filter,
    today: NaiveDate,
) -> CashLedger {
    let selected: Vec<CashLedgerRow> = rows
        .iter()
        .filter(|r| filter.matches(*r, today))
        .cloned()
        .collect();
    log::debug!(
        "Cash ledger: {} of {} rows selected ({})",
        selected.len(),
        rows.len(),
        filter.dates.description()
    );
    fold_ledger(selected, opening_balance)
}

/// Ledger over every row, ignoring any active filter
pub fn cash_totals_all(rows: &[CashLedgerRow], opening_balance: Decimal) -> CashLedger {
    fold_ledger(rows.to_vec(), opening_balance)
}

/// Chronological order: date, then id as text
pub fn sort_chronologically(rows: &mut [CashLedgerRow]) {
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}

fn fold_ledger(mut rows: Vec<CashLedgerRow>, opening_balance: Decimal) -> CashLedger {
    sort_chronologically(&mut rows);

    let mut running = opening_balance;
    let mut total_in = Decimal::ZERO;
    let mut total_out = Decimal::ZERO;

    let mut folded: Vec<RunningRow> = rows
        .into_iter()
        .map(|row| {
            total_in += row.amount_in;
            total_out += row.amount_out;
            running += row.amount_in - row.amount_out;
            RunningRow {
                row,
                balance: running,
            }
        })
        .collect();

    // Newest first for display; balances stay as folded
    folded.reverse();

    CashLedger {
        rows: folded,
        opening_balance,
        total_in,
        total_out,
        closing_balance: running,
    }
}
