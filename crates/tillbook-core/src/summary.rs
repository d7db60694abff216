//! Summary reducers over filtered record sets
//!
//! Reducers take whatever subset a view selected. Only the supplier summary
//! and the profit figure are computed over everything.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::{supplier_profit_balance, supplier_totals};
use super::models::{Expense, Refund, Sale, Supplier, SupplierOrder};

/// Sales summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTotals {
    pub count: usize,
    pub total_amount: Decimal,
    /// Sum of positive outstanding amounts; overpayments are not netted
    pub total_unpaid: Decimal,
}

/// Refund summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTotals {
    pub count: usize,
    pub total_refunded: Decimal,
    pub total_still_owe: Decimal,
}

/// Expense summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub count: usize,
    pub total: Decimal,
}

/// Supplier summary, always over every supplier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierSummaryTotals {
    pub count: usize,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
}

/// Receivable or payable summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingTotals {
    pub count: usize,
    pub total: Decimal,
}

/// Profit and the terms it was computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub total_sales: Decimal,
    /// Refund cash plus what is still owed back
    pub total_refunds: Decimal,
    /// Invoice credits less return debits
    pub supplier_balance: Decimal,
    pub total_expenses: Decimal,
    pub profit: Decimal,
}

fn positive(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        Decimal::ZERO
    }
}

pub fn sales_totals<'a, I>(sales: I) -> SalesTotals
where
    I: IntoIterator<Item = &'a Sale>,
{
    sales.into_iter().fold(SalesTotals::default(), |acc, s| SalesTotals {
        count: acc.count + 1,
        total_amount: acc.total_amount + s.total,
        total_unpaid: acc.total_unpaid + positive(s.unpaid()),
    })
}

pub fn refund_totals<'a, I>(refunds: I) -> RefundTotals
where
    I: IntoIterator<Item = &'a Refund>,
{
    refunds.into_iter().fold(RefundTotals::default(), |acc, r| RefundTotals {
        count: acc.count + 1,
        total_refunded: acc.total_refunded + r.cash,
        total_still_owe: acc.total_still_owe + positive(r.unpaid()),
    })
}

pub fn expense_totals<'a, I>(expenses: I) -> ExpenseTotals
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses.into_iter().fold(ExpenseTotals::default(), |acc, e| ExpenseTotals {
        count: acc.count + 1,
        total: acc.total + e.cash,
    })
}

pub fn supplier_summary(suppliers: &[Supplier], orders: &[SupplierOrder]) -> SupplierSummaryTotals {
    let (total_credit, total_debit) = suppliers
        .iter()
        .map(|s| supplier_totals(Some(s), orders))
        .fold((Decimal::ZERO, Decimal::ZERO), |(c, d), t| (c + t.credit, d + t.debit));

    SupplierSummaryTotals {
        count: suppliers.len(),
        total_credit,
        total_debit,
        balance: total_credit - total_debit,
    }
}

/// Outstanding amounts above zero, with how many records carry one
pub fn outstanding_totals<I>(unpaid: I) -> OutstandingTotals
where
    I: IntoIterator<Item = Decimal>,
{
    unpaid
        .into_iter()
        .filter(|u| *u > Decimal::ZERO)
        .fold(OutstandingTotals::default(), |acc, u| OutstandingTotals {
            count: acc.count + 1,
            total: acc.total + u,
        })
}

/// Profit over the whole books.
///
/// Refunds count at their full committed amount as soon as they are
/// recorded, while supplier payments and refunds are left out because they
/// only shift cash.
pub fn profit(
    sales: &[Sale],
    refunds: &[Refund],
    orders: &[SupplierOrder],
    expenses: &[Expense],
) -> ProfitBreakdown {
    let total_sales = sales.iter().map(|s| s.total).sum::<Decimal>();
    let total_refunds = refunds.iter().map(|r| r.cash + r.unpaid()).sum::<Decimal>();
    let supplier_balance = supplier_profit_balance(orders);
    let total_expenses = expenses.iter().map(|e| e.cash).sum::<Decimal>();

    ProfitBreakdown {
        total_sales,
        total_refunds,
        supplier_balance,
        total_expenses,
        profit: total_sales - total_refunds - supplier_balance - total_expenses,
    }
}

/// Filtered sales total less filtered refund cash
pub fn net_sales(sales: &SalesTotals, refunds: &RefundTotals) -> Decimal {
    sales.total_amount - refunds.total_refunded
}
