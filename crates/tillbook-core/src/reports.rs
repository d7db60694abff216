//! Report structures for display
//!
//! Amounts are pre-formatted strings and dates use the display format, so a
//! report can be printed or serialized as-is.

use serde::{Deserialize, Serialize};

use super::audit::ChangeLogEntry;
use super::books::{
    Dashboard, ExpensesView, ImportReport, OutstandingView, RefundsView, SalesView,
    SupplierStatement, SuppliersView,
};
use super::cash::CashLedger;
use super::models::{OutstandingRow, Refund, Sale};
use super::money::MoneyFormat;
use super::time::format_display_date;

/// One sale or refund line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: u64,
    pub invoice_no: String,
    pub customer_no: String,
    pub date: String,
    pub customer_name: String,
    pub product: String,
    pub total: String,
    pub cash: String,
    pub unpaid: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub note: String,
}

impl InvoiceLine {
    fn from_sale(row: &OutstandingRow<Sale>, fmt: &MoneyFormat) -> Self {
        let s = &row.record;
        Self {
            id: s.id,
            invoice_no: s.invoice_no.clone(),
            customer_no: s.customer_no.clone(),
            date: format_display_date(&s.date),
            customer_name: s.customer_name.clone(),
            product: s.product.clone(),
            total: fmt.format(s.total),
            cash: fmt.format(s.cash),
            unpaid: fmt.format(row.unpaid),
            note: s.note.clone(),
        }
    }

    fn from_refund(row: &OutstandingRow<Refund>, fmt: &MoneyFormat) -> Self {
        let r = &row.record;
        Self {
            id: r.id,
            invoice_no: r.invoice_no.clone(),
            customer_no: r.customer_no.clone(),
            date: format_display_date(&r.date),
            customer_name: r.customer_name.clone(),
            product: r.product.clone(),
            total: fmt.format(r.total),
            cash: fmt.format(r.cash),
            unpaid: fmt.format(row.unpaid),
            note: r.note.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub lines: Vec<InvoiceLine>,
    pub count: usize,
    pub total_amount: String,
    pub total_unpaid: String,
}

impl SalesReport {
    pub fn build(view: &SalesView, fmt: &MoneyFormat) -> Self {
        Self {
            lines: view.rows.iter().map(|r| InvoiceLine::from_sale(r, fmt)).collect(),
            count: view.totals.count,
            total_amount: fmt.format(view.totals.total_amount),
            total_unpaid: fmt.format(view.totals.total_unpaid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundsReport {
    pub lines: Vec<InvoiceLine>,
    pub count: usize,
    pub total_refunded: String,
    pub total_still_owe: String,
}

impl RefundsReport {
    pub fn build(view: &RefundsView, fmt: &MoneyFormat) -> Self {
        Self {
            lines: view.rows.iter().map(|r| InvoiceLine::from_refund(r, fmt)).collect(),
            count: view.totals.count,
            total_refunded: fmt.format(view.totals.total_refunded),
            total_still_owe: fmt.format(view.totals.total_still_owe),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub id: u64,
    pub date: String,
    pub description: String,
    pub note: String,
    pub cash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensesReport {
    pub lines: Vec<ExpenseLine>,
    pub count: usize,
    pub total: String,
}

impl ExpensesReport {
    pub fn build(view: &ExpensesView, fmt: &MoneyFormat) -> Self {
        Self {
            lines: view
                .rows
                .iter()
                .map(|e| ExpenseLine {
                    id: e.id,
                    date: format_display_date(&e.date),
                    description: e.description.clone(),
                    note: e.note.clone(),
                    cash: fmt.format(e.cash),
                })
                .collect(),
            count: view.totals.count,
            total: fmt.format(view.totals.total),
        }
    }
}

/// Supplier position line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierLine {
    pub id: u64,
    pub name: String,
    pub note: String,
    pub credit: String,
    pub debit: String,
    pub balance: String,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppliersReport {
    pub lines: Vec<SupplierLine>,
    pub count: usize,
    pub total_credit: String,
    pub total_debit: String,
    pub balance: String,
}

impl SuppliersReport {
    pub fn build(view: &SuppliersView, fmt: &MoneyFormat) -> Self {
        Self {
            lines: view
                .rows
                .iter()
                .map(|r| SupplierLine {
                    id: r.supplier.id,
                    name: r.supplier.name.clone(),
                    note: r.supplier.note.clone(),
                    credit: fmt.format(r.totals.credit),
                    debit: fmt.format(r.totals.debit),
                    balance: fmt.format(r.totals.balance),
                    order_count: r.order_count,
                })
                .collect(),
            count: view.summary.count,
            total_credit: fmt.format(view.summary.total_credit),
            total_debit: fmt.format(view.summary.total_debit),
            balance: fmt.format(view.summary.balance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub id: u64,
    pub date: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub customer_name: String,
    pub product: String,
    pub credit: String,
    pub debit: String,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierStatementReport {
    pub supplier: SupplierLine,
    pub lines: Vec<StatementLine>,
}

impl SupplierStatementReport {
    pub fn build(statement: &SupplierStatement, order_count: usize, fmt: &MoneyFormat) -> Self {
        let s = &statement.supplier;
        Self {
            supplier: SupplierLine {
                id: s.id,
                name: s.name.clone(),
                note: s.note.clone(),
                credit: fmt.format(statement.totals.credit),
                debit: fmt.format(statement.totals.debit),
                balance: fmt.format(statement.totals.balance),
                order_count,
            },
            lines: statement
                .orders
                .iter()
                .map(|row| {
                    let o = &row.order;
                    StatementLine {
                        id: o.id,
                        date: format_display_date(&o.date),
                        transaction_type: o.transaction_type.to_string(),
                        customer_name: o.customer_name.clone(),
                        product: o.product.clone(),
                        credit: fmt.format(o.amount_credit),
                        debit: fmt.format(o.amount_debit),
                        balance: fmt.format(row.balance),
                    }
                })
                .collect(),
        }
    }
}

/// Receivables or payables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingReport {
    pub lines: Vec<InvoiceLine>,
    pub count: usize,
    pub total: String,
}

impl OutstandingReport {
    pub fn receivables(view: &OutstandingView<Sale>, fmt: &MoneyFormat) -> Self {
        Self {
            lines: view.rows.iter().map(|r| InvoiceLine::from_sale(r, fmt)).collect(),
            count: view.totals.count,
            total: fmt.format(view.totals.total),
        }
    }

    pub fn payables(view: &OutstandingView<Refund>, fmt: &MoneyFormat) -> Self {
        Self {
            lines: view.rows.iter().map(|r| InvoiceLine::from_refund(r, fmt)).collect(),
            count: view.totals.count,
            total: fmt.format(view.totals.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashLine {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub amount_in: String,
    pub amount_out: String,
    pub balance: String,
}

/// Cash ledger, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashLedgerReport {
    pub period: String,
    pub lines: Vec<CashLine>,
    pub opening_balance: String,
    pub total_in: String,
    pub total_out: String,
    pub closing_balance: String,
}

impl CashLedgerReport {
    pub fn build(ledger: &CashLedger, period: impl Into<String>, fmt: &MoneyFormat) -> Self {
        Self {
            period: period.into(),
            lines: ledger
                .rows
                .iter()
                .map(|r| CashLine {
                    id: r.row.id.clone(),
                    date: format_display_date(&r.row.date),
                    kind: r.row.kind.to_string(),
                    description: r.row.description.clone(),
                    amount_in: fmt.format(r.row.amount_in),
                    amount_out: fmt.format(r.row.amount_out),
                    balance: fmt.format(r.balance),
                })
                .collect(),
            opening_balance: fmt.format(ledger.opening_balance),
            total_in: fmt.format(ledger.total_in),
            total_out: fmt.format(ledger.total_out),
            closing_balance: fmt.format(ledger.closing_balance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub total_sales: String,
    pub total_refunds: String,
    pub supplier_balance: String,
    pub total_expenses: String,
    pub profit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub cash_opening: String,
    pub cash_in: String,
    pub cash_out: String,
    pub cash_closing: String,
    pub receivable_count: usize,
    pub receivable: String,
    pub payable_count: usize,
    pub payable: String,
    pub supplier_balance: String,
    pub net_sales: String,
    pub profit: ProfitReport,
    pub recent_sales: Vec<InvoiceLine>,
    pub recent_refunds: Vec<InvoiceLine>,
}

impl DashboardReport {
    pub fn build(dashboard: &Dashboard, fmt: &MoneyFormat) -> Self {
        let p = &dashboard.profit;
        Self {
            cash_opening: fmt.format(dashboard.cash_opening),
            cash_in: fmt.format(dashboard.cash_in),
            cash_out: fmt.format(dashboard.cash_out),
            cash_closing: fmt.format(dashboard.cash_closing),
            receivable_count: dashboard.receivable.count,
            receivable: fmt.format(dashboard.receivable.total),
            payable_count: dashboard.payable.count,
            payable: fmt.format(dashboard.payable.total),
            supplier_balance: fmt.format(dashboard.suppliers.balance),
            net_sales: fmt.format(dashboard.net_sales),
            profit: ProfitReport {
                total_sales: fmt.format(p.total_sales),
                total_refunds: fmt.format(p.total_refunds),
                supplier_balance: fmt.format(p.supplier_balance),
                total_expenses: fmt.format(p.total_expenses),
                profit: fmt.format(p.profit),
            },
            recent_sales: dashboard
                .recent_sales
                .iter()
                .map(|r| InvoiceLine::from_sale(r, fmt))
                .collect(),
            recent_refunds: dashboard
                .recent_refunds
                .iter()
                .map(|r| InvoiceLine::from_refund(r, fmt))
                .collect(),
        }
    }
}

/// One audit entry with display timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLine {
    pub changed_at: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reference: Option<String>,
    pub changes: Vec<String>,
}

impl HistoryLine {
    pub fn build(entry: &ChangeLogEntry) -> Self {
        Self {
            changed_at: entry.changed_at.format("%d.%m.%Y %H:%M").to_string(),
            reference: entry.reference.clone(),
            changes: entry
                .changes
                .iter()
                .map(|c| format!("{}: {} → {}", c.field, c.old_value.coerced(), c.new_value.coerced()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
    pub skipped_lines: Vec<usize>,
    pub invoices: Option<String>,
}

impl From<&ImportReport> for ImportSummary {
    fn from(report: &ImportReport) -> Self {
        let invoices = match (&report.first_invoice, &report.last_invoice) {
            (Some(first), Some(last)) if first == last => Some(first.clone()),
            (Some(first), Some(last)) => Some(format!("{} – {}", first, last)),
            _ => None,
        };
        Self {
            created: report.created,
            skipped: report.skipped_lines.len(),
            skipped_lines: report.skipped_lines.clone(),
            invoices,
        }
    }
}
