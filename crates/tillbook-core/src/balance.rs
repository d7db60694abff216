//! Outstanding amounts and supplier balances

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::models::{Supplier, SupplierOrder};
use super::money::{parse_money_or_zero, round2};
use super::types::TransactionType;

/// Outstanding amount from already-coerced figures, rounded to two places
pub fn outstanding(total: Decimal, cash: Decimal) -> Decimal {
    round2(total - cash)
}

/// Outstanding amount from form input, e.g. `("100", "")` is 100
pub fn recalc_outstanding(total: &str, cash: &str) -> Decimal {
    outstanding(parse_money_or_zero(total), parse_money_or_zero(cash))
}

/// Supplier account position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierTotals {
    /// Opening credit plus every order credit
    pub credit: Decimal,
    /// Opening debit plus every order debit
    pub debit: Decimal,
    /// `credit - debit`; positive means we owe the supplier
    pub balance: Decimal,
}

/// Fold a supplier's opening position with its orders.
///
/// Orders for other suppliers are ignored. A missing supplier contributes a
/// zero opening position.
pub fn supplier_totals(supplier: Option<&Supplier>, orders: &[SupplierOrder]) -> SupplierTotals {
    let Some(supplier) = supplier else {
        return SupplierTotals::default();
    };

    let (credit, debit) = orders
        .iter()
        .filter(|o| o.supplier_id == supplier.id)
        .fold((supplier.credit, supplier.debit), |(c, d), o| {
            (c + o.amount_credit, d + o.amount_debit)
        });

    SupplierTotals {
        credit,
        debit,
        balance: credit - debit,
    }
}

/// Number of orders referencing a supplier
pub fn order_count(supplier_id: u64, orders: &[SupplierOrder]) -> usize {
    orders.iter().filter(|o| o.supplier_id == supplier_id).count()
}

/// Net effect of supplier orders on profit.
///
/// Invoice credits add to it and return debits subtract from it. Supplier
/// payments and refunds stay out of this figure; they only move cash.
pub fn supplier_profit_balance(orders: &[SupplierOrder]) -> Decimal {
    orders.iter().fold(Decimal::ZERO, |acc, o| match o.transaction_type {
        TransactionType::Invoice => acc + o.amount_credit,
        TransactionType::Return => acc - o.amount_debit,
        TransactionType::Payment | TransactionType::Refund => acc,
    })
}
