//! Per-view orderings and small derived lists

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::models::{Expense, Refund, Sale, Supplier, SupplierOrder};

fn newest_first(a_date: &str, a_id: u64, b_date: &str, b_id: u64) -> Ordering {
    b_date.cmp(a_date).then_with(|| b_id.cmp(&a_id))
}

fn unpaid_rank(unpaid: Decimal) -> u8 {
    if unpaid > Decimal::ZERO {
        0
    } else if unpaid < Decimal::ZERO {
        1
    } else {
        2
    }
}

/// Sales still owed first, then overpaid, then settled; newest first within each
pub fn order_sales(sales: &mut [&Sale]) {
    sales.sort_by(|a, b| {
        unpaid_rank(a.unpaid())
            .cmp(&unpaid_rank(b.unpaid()))
            .then_with(|| newest_first(&a.date, a.id, &b.date, b.id))
    });
}

/// Unsettled refunds first, largest committed amount first; settled ones
/// follow newest first
pub fn order_refunds(refunds: &mut [&Refund]) {
    refunds.sort_by(|a, b| match (a.is_settled(), b.is_settled()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, false) => (b.cash + b.unpaid()).cmp(&(a.cash + a.unpaid())),
        (true, true) => newest_first(&a.date, a.id, &b.date, b.id),
    });
}

/// Newest first
pub fn order_expenses(expenses: &mut [&Expense]) {
    expenses.sort_by(|a, b| newest_first(&a.date, a.id, &b.date, b.id));
}

/// Alphabetical by name
pub fn order_suppliers(suppliers: &mut [&Supplier]) {
    suppliers.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Oldest first, as on a statement
pub fn order_supplier_orders(orders: &mut [&SupplierOrder]) {
    orders.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}

/// The `limit` newest sales
pub fn recent_sales(sales: &[Sale], limit: usize) -> Vec<&Sale> {
    let mut sorted: Vec<&Sale> = sales.iter().collect();
    sorted.sort_by(|a, b| newest_first(&a.date, a.id, &b.date, b.id));
    sorted.truncate(limit);
    sorted
}

/// The `limit` newest refunds
pub fn recent_refunds(refunds: &[Refund], limit: usize) -> Vec<&Refund> {
    let mut sorted: Vec<&Refund> = refunds.iter().collect();
    sorted.sort_by(|a, b| newest_first(&a.date, a.id, &b.date, b.id));
    sorted.truncate(limit);
    sorted
}

/// Distinct trimmed customer names across sales, refunds and supplier orders, sorted
pub fn customer_name_suggestions(
    sales: &[Sale],
    refunds: &[Refund],
    orders: &[SupplierOrder],
) -> Vec<String> {
    sales
        .iter()
        .map(|s| s.customer_name.as_str())
        .chain(refunds.iter().map(|r| r.customer_name.as_str()))
        .chain(orders.iter().map(|o| o.customer_name.as_str()))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
