//! The books: every record collection plus counters and the change log
//!
//! `Books` is an immutable snapshot. Mutations validate their input and
//! return a new snapshot; the caller decides when to persist it. Views are
//! pure reads that take `today` explicitly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tillbook_store::ImportedSales;

use super::audit::{ChangeLog, ChangeLogEntry};
use super::balance::{order_count, supplier_totals, SupplierTotals};
use super::cash::{build_cash_ledger_rows, cash_totals_all, compute_running_ledger, CashLedger, CashLedgerRow};
use super::error::{CoreError, CoreResult};
use super::filter::{BalanceFilter, Filter};
use super::ids::{next_id, Counters};
use super::models::{
    Expense, ExpenseDraft, OutstandingRow, Refund, RefundDraft, Sale, SaleDraft, Supplier,
    SupplierDraft, SupplierOrder, SupplierOrderDraft,
};
use super::money::{lenient_opt, parse_money_or_zero};
use super::summary::{
    expense_totals, net_sales, outstanding_totals, profit, refund_totals, sales_totals,
    supplier_summary, ExpenseTotals, OutstandingTotals, ProfitBreakdown, RefundTotals,
    SalesTotals, SupplierSummaryTotals,
};
use super::time::to_iso;
use super::types::EntityType;
use super::views::{
    customer_name_suggestions, order_expenses, order_refunds, order_sales, order_supplier_orders,
    order_suppliers, recent_refunds, recent_sales,
};

/// Number of records in the dashboard's recent lists
pub const RECENT_LIMIT: usize = 5;

/// Snapshot of the whole books
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Books {
    pub sales: Vec<Sale>,
    pub refunds: Vec<Refund>,
    pub suppliers: Vec<Supplier>,
    pub supplier_orders: Vec<SupplierOrder>,
    pub expenses: Vec<Expense>,
    pub counters: Counters,
    /// Opening cash; `None` until set, then the configured default applies
    #[serde(deserialize_with = "lenient_opt")]
    pub cash_opening: Option<Decimal>,
    pub change_log: ChangeLog,
}

// ==================== Views ====================

/// Filtered, ordered sales with their summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesView {
    pub rows: Vec<OutstandingRow<Sale>>,
    pub totals: SalesTotals,
}

/// Filtered, ordered refunds with their summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundsView {
    pub rows: Vec<OutstandingRow<Refund>>,
    pub totals: RefundTotals,
}

/// Filtered expenses, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensesView {
    pub rows: Vec<Expense>,
    pub totals: ExpenseTotals,
}

/// A supplier with its computed position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierRow {
    pub supplier: Supplier,
    pub totals: SupplierTotals,
    pub order_count: usize,
}

/// Filtered suppliers with the global summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppliersView {
    pub rows: Vec<SupplierRow>,
    pub summary: SupplierSummaryTotals,
}

/// A statement order with the balance after it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRow {
    #[serde(flatten)]
    pub order: SupplierOrder,
    /// Credits less debits of the listed orders up to and including this one
    pub balance: Decimal,
}

/// One supplier's orders in statement order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierStatement {
    pub supplier: Supplier,
    pub totals: SupplierTotals,
    pub orders: Vec<StatementRow>,
}

/// Records with a positive outstanding amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutstandingView<T> {
    pub rows: Vec<OutstandingRow<T>>,
    pub totals: OutstandingTotals,
}

/// Global figures for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub cash_opening: Decimal,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub cash_closing: Decimal,
    pub receivable: OutstandingTotals,
    pub payable: OutstandingTotals,
    pub profit: ProfitBreakdown,
    pub suppliers: SupplierSummaryTotals,
    pub net_sales: Decimal,
    pub recent_sales: Vec<OutstandingRow<Sale>>,
    pub recent_refunds: Vec<OutstandingRow<Refund>>,
}

/// Outcome of a sales import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    /// Line numbers of rows with no name, product or total
    pub skipped_lines: Vec<usize>,
    pub first_invoice: Option<String>,
    pub last_invoice: Option<String>,
}

fn require(value: &str, message: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        Err(CoreError::validation(message))
    } else {
        Ok(())
    }
}

fn sale_from_draft(id: u64, invoice_no: String, customer_no: String, draft: &SaleDraft) -> CoreResult<Sale> {
    require(&draft.customer_name, "Customer name is required")?;
    require(&draft.product, "Product is required")?;
    require(&draft.date, "Date is required")?;

    Ok(Sale {
        id,
        invoice_no,
        customer_no,
        date: draft.date.trim().to_string(),
        customer_name: draft.customer_name.trim().to_string(),
        product: draft.product.trim().to_string(),
        total: parse_money_or_zero(&draft.total),
        cash: parse_money_or_zero(&draft.cash),
        note: draft.note.trim().to_string(),
    })
}

fn supplier_from_draft(id: u64, draft: &SupplierDraft) -> CoreResult<Supplier> {
    require(&draft.name, "Supplier name is required")?;

    Ok(Supplier {
        id,
        name: draft.name.trim().to_string(),
        note: draft.note.trim().to_string(),
        debit: parse_money_or_zero(&draft.debit),
        credit: parse_money_or_zero(&draft.credit),
    })
}

fn expense_from_draft(id: u64, draft: &ExpenseDraft, today: NaiveDate) -> Expense {
    let date = draft.date.trim();
    Expense {
        id,
        date: if date.is_empty() { to_iso(today) } else { date.to_string() },
        description: draft.description.trim().to_string(),
        note: draft.note.trim().to_string(),
        cash: parse_money_or_zero(&draft.cash),
    }
}

impl Books {
    /// Opening cash, falling back to `default` when none was recorded
    pub fn opening_balance_or(&self, default: Decimal) -> Decimal {
        self.cash_opening.unwrap_or(default)
    }

    /// Record the opening cash balance from free-form input
    pub fn set_cash_opening(&self, input: &str) -> Books {
        let mut next = self.clone();
        next.cash_opening = Some(parse_money_or_zero(input));
        log::info!("Opening cash set to {}", next.opening_balance_or(Decimal::ZERO));
        next
    }

    /// Invoice and customer numbers the next sale will receive
    pub fn next_sale_numbers(&self) -> (String, String) {
        self.counters.peek()
    }

    // ==================== Sales ====================

    pub fn sale(&self, id: u64) -> CoreResult<&Sale> {
        self.sales
            .iter()
            .find(|s| s.id == id)
            .ok_or(CoreError::SaleNotFound { id })
    }

    /// Create a sale with the next invoice and customer numbers
    pub fn create_sale(&self, draft: &SaleDraft) -> CoreResult<(Books, Sale)> {
        let (invoice_no, customer_no) = self.counters.peek();
        let id = next_id(self.sales.iter().map(|s| s.id));
        let sale = sale_from_draft(id, invoice_no, customer_no, draft)?;

        let mut next = self.clone();
        next.sales.push(sale.clone());
        next.counters = self.counters.advanced();
        log::info!("Created sale {} ({})", sale.id, sale.invoice_no);
        Ok((next, sale))
    }

    /// Replace a sale's editable fields, logging what changed
    pub fn edit_sale(
        &self,
        id: u64,
        draft: &SaleDraft,
        changed_at: DateTime<Utc>,
    ) -> CoreResult<(Books, Option<ChangeLogEntry>)> {
        let old = self.sale(id)?;
        let updated = sale_from_draft(id, old.invoice_no.clone(), old.customer_no.clone(), draft)?;

        let mut next = self.clone();
        let entry = next.change_log.record_change(old, &updated, changed_at).cloned();
        if let Some(slot) = next.sales.iter_mut().find(|s| s.id == id) {
            *slot = updated;
        }
        log::info!("Edited sale {}", id);
        Ok((next, entry))
    }

    pub fn delete_sale(&self, id: u64) -> CoreResult<Books> {
        self.sale(id)?;
        let mut next = self.clone();
        next.sales.retain(|s| s.id != id);
        log::info!("Deleted sale {}", id);
        Ok(next)
    }

    // ==================== Refunds ====================

    pub fn refund(&self, id: u64) -> CoreResult<&Refund> {
        self.refunds
            .iter()
            .find(|r| r.id == id)
            .ok_or(CoreError::RefundNotFound { id })
    }

    /// Refund form prefilled from the sale carrying `invoice_no`
    pub fn refund_draft_for_invoice(&self, invoice_no: &str) -> RefundDraft {
        let mut draft = RefundDraft {
            invoice_no: invoice_no.to_string(),
            ..RefundDraft::default()
        };
        if let Some(sale) = self.sales.iter().find(|s| s.invoice_no == invoice_no) {
            draft.customer_no = sale.customer_no.clone();
            draft.customer_name = sale.customer_name.clone();
            draft.product = sale.product.clone();
        }
        draft
    }

    fn refund_from_draft(&self, id: u64, draft: &RefundDraft) -> CoreResult<Refund> {
        require(&draft.invoice_no, "Invoice number is required")?;
        require(&draft.date, "Date is required")?;

        let invoice_no = draft.invoice_no.trim().to_string();
        let product = match draft.product.trim() {
            "" => self
                .sales
                .iter()
                .find(|s| s.invoice_no == invoice_no)
                .map(|s| s.product.clone())
                .unwrap_or_default(),
            p => p.to_string(),
        };

        Ok(Refund {
            id,
            invoice_no,
            customer_no: draft.customer_no.trim().to_string(),
            date: draft.date.trim().to_string(),
            customer_name: draft.customer_name.trim().to_string(),
            product,
            total: parse_money_or_zero(&draft.total),
            cash: parse_money_or_zero(&draft.cash),
            note: draft.note.trim().to_string(),
        })
    }

    pub fn create_refund(&self, draft: &RefundDraft) -> CoreResult<(Books, Refund)> {
        let id = next_id(self.refunds.iter().map(|r| r.id));
        let refund = self.refund_from_draft(id, draft)?;

        let mut next = self.clone();
        next.refunds.push(refund.clone());
        log::info!("Created refund {} against {}", refund.id, refund.invoice_no);
        Ok((next, refund))
    }

    pub fn edit_refund(
        &self,
        id: u64,
        draft: &RefundDraft,
        changed_at: DateTime<Utc>,
    ) -> CoreResult<(Books, Option<ChangeLogEntry>)> {
        let old = self.refund(id)?;
        let updated = self.refund_from_draft(id, draft)?;

        let mut next = self.clone();
        let entry = next.change_log.record_change(old, &updated, changed_at).cloned();
        if let Some(slot) = next.refunds.iter_mut().find(|r| r.id == id) {
            *slot = updated;
        }
        log::info!("Edited refund {}", id);
        Ok((next, entry))
    }

    pub fn delete_refund(&self, id: u64) -> CoreResult<Books> {
        self.refund(id)?;
        let mut next = self.clone();
        next.refunds.retain(|r| r.id != id);
        log::info!("Deleted refund {}", id);
        Ok(next)
    }

    // ==================== Suppliers ====================

    pub fn supplier(&self, id: u64) -> CoreResult<&Supplier> {
        self.suppliers
            .iter()
            .find(|s| s.id == id)
            .ok_or(CoreError::SupplierNotFound { id })
    }

    /// Fails with `SupplierHasOrders` while any order references the supplier
    fn guard_supplier(&self, id: u64) -> CoreResult<()> {
        let count = order_count(id, &self.supplier_orders);
        if count > 0 {
            log::warn!("Supplier {} has {} order(s); change blocked", id, count);
            return Err(CoreError::SupplierHasOrders {
                supplier_id: id,
                order_count: count,
            });
        }
        Ok(())
    }

    pub fn create_supplier(&self, draft: &SupplierDraft) -> CoreResult<(Books, Supplier)> {
        let id = next_id(self.suppliers.iter().map(|s| s.id));
        let supplier = supplier_from_draft(id, draft)?;

        let mut next = self.clone();
        next.suppliers.push(supplier.clone());
        log::info!("Created supplier {} ({})", supplier.id, supplier.name);
        Ok((next, supplier))
    }

    pub fn edit_supplier(
        &self,
        id: u64,
        draft: &SupplierDraft,
        changed_at: DateTime<Utc>,
    ) -> CoreResult<(Books, Option<ChangeLogEntry>)> {
        let old = self.supplier(id)?;
        self.guard_supplier(id)?;
        let updated = supplier_from_draft(id, draft)?;

        let mut next = self.clone();
        let entry = next.change_log.record_change(old, &updated, changed_at).cloned();
        if let Some(slot) = next.suppliers.iter_mut().find(|s| s.id == id) {
            *slot = updated;
        }
        log::info!("Edited supplier {}", id);
        Ok((next, entry))
    }

    pub fn delete_supplier(&self, id: u64) -> CoreResult<Books> {
        self.supplier(id)?;
        self.guard_supplier(id)?;

        let mut next = self.clone();
        next.suppliers.retain(|s| s.id != id);
        log::info!("Deleted supplier {}", id);
        Ok(next)
    }

    // ==================== Supplier orders ====================

    pub fn supplier_order(&self, id: u64) -> CoreResult<&SupplierOrder> {
        self.supplier_orders
            .iter()
            .find(|o| o.id == id)
            .ok_or(CoreError::SupplierOrderNotFound { id })
    }

    fn supplier_order_from_draft(&self, id: u64, draft: &SupplierOrderDraft) -> CoreResult<SupplierOrder> {
        let supplier_id = draft
            .supplier_id
            .ok_or_else(|| CoreError::validation("Select a supplier first"))?;
        self.supplier(supplier_id)?;
        require(&draft.date, "Date is required")?;
        require(&draft.customer_name, "Customer name is required")?;

        Ok(SupplierOrder {
            id,
            supplier_id,
            date: draft.date.trim().to_string(),
            customer_name: draft.customer_name.trim().to_string(),
            product: draft.product.trim().to_string(),
            transaction_type: draft.transaction_type,
            amount_credit: parse_money_or_zero(&draft.amount_credit),
            amount_debit: parse_money_or_zero(&draft.amount_debit),
        })
    }

    pub fn create_supplier_order(&self, draft: &SupplierOrderDraft) -> CoreResult<(Books, SupplierOrder)> {
        let id = next_id(self.supplier_orders.iter().map(|o| o.id));
        let order = self.supplier_order_from_draft(id, draft)?;

        let mut next = self.clone();
        next.supplier_orders.push(order.clone());
        log::info!(
            "Created {} order {} for supplier {}",
            order.transaction_type,
            order.id,
            order.supplier_id
        );
        Ok((next, order))
    }

    /// Edit an order in place. The order stays with its supplier whatever the
    /// draft names.
    pub fn edit_supplier_order(
        &self,
        id: u64,
        draft: &SupplierOrderDraft,
        changed_at: DateTime<Utc>,
    ) -> CoreResult<(Books, Option<ChangeLogEntry>)> {
        let old = self.supplier_order(id)?;
        let draft = SupplierOrderDraft {
            supplier_id: Some(old.supplier_id),
            ..draft.clone()
        };
        let updated = self.supplier_order_from_draft(id, &draft)?;

        let mut next = self.clone();
        let entry = next.change_log.record_change(old, &updated, changed_at).cloned();
        if let Some(slot) = next.supplier_orders.iter_mut().find(|o| o.id == id) {
            *slot = updated;
        }
        log::info!("Edited supplier order {}", id);
        Ok((next, entry))
    }

    pub fn delete_supplier_order(&self, id: u64) -> CoreResult<Books> {
        self.supplier_order(id)?;
        let mut next = self.clone();
        next.supplier_orders.retain(|o| o.id != id);
        log::info!("Deleted supplier order {}", id);
        Ok(next)
    }

    // ==================== Expenses ====================

    pub fn expense(&self, id: u64) -> CoreResult<&Expense> {
        self.expenses
            .iter()
            .find(|e| e.id == id)
            .ok_or(CoreError::ExpenseNotFound { id })
    }

    /// Create an expense; an empty date means today
    pub fn create_expense(&self, draft: &ExpenseDraft, today: NaiveDate) -> CoreResult<(Books, Expense)> {
        let id = next_id(self.expenses.iter().map(|e| e.id));
        let expense = expense_from_draft(id, draft, today);

        let mut next = self.clone();
        next.expenses.push(expense.clone());
        log::info!("Created expense {} on {}", expense.id, expense.date);
        Ok((next, expense))
    }

    pub fn edit_expense(
        &self,
        id: u64,
        draft: &ExpenseDraft,
        today: NaiveDate,
        changed_at: DateTime<Utc>,
    ) -> CoreResult<(Books, Option<ChangeLogEntry>)> {
        let old = self.expense(id)?;
        let updated = expense_from_draft(id, draft, today);

        let mut next = self.clone();
        let entry = next.change_log.record_change(old, &updated, changed_at).cloned();
        if let Some(slot) = next.expenses.iter_mut().find(|e| e.id == id) {
            *slot = updated;
        }
        log::info!("Edited expense {}", id);
        Ok((next, entry))
    }

    pub fn delete_expense(&self, id: u64) -> CoreResult<Books> {
        self.expense(id)?;
        let mut next = self.clone();
        next.expenses.retain(|e| e.id != id);
        log::info!("Deleted expense {}", id);
        Ok(next)
    }

    // ==================== Import ====================

    /// Turn imported CSV rows into sales.
    ///
    /// Rows without a date get `today`. The outstanding amount is always
    /// derived, so an `unpaid` column is only compared and never stored.
    pub fn import_sales(&self, imported: &ImportedSales, today: NaiveDate) -> CoreResult<(Books, ImportReport)> {
        let mut next = self.clone();
        let mut report = ImportReport {
            created: 0,
            skipped_lines: Vec::new(),
            first_invoice: None,
            last_invoice: None,
        };

        for row in &imported.rows {
            let total = parse_money_or_zero(&row.total);
            if row.customer_name.is_empty() && row.product.is_empty() && total.is_zero() {
                log::warn!("Import line {} has no name, product or total; skipped", row.line);
                report.skipped_lines.push(row.line);
                continue;
            }

            let (invoice_no, customer_no) = next.counters.peek();
            let sale = Sale {
                id: next_id(next.sales.iter().map(|s| s.id)),
                invoice_no,
                customer_no,
                date: row.date.clone().unwrap_or_else(|| to_iso(today)),
                customer_name: row.customer_name.clone(),
                product: row.product.clone(),
                total,
                cash: parse_money_or_zero(&row.cash),
                note: String::new(),
            };

            if let Some(ref unpaid) = row.unpaid {
                let stated = parse_money_or_zero(unpaid);
                if stated != sale.unpaid() {
                    log::warn!(
                        "Import line {}: unpaid column says {}, derived {}; using derived",
                        row.line,
                        stated,
                        sale.unpaid()
                    );
                }
            }

            if report.first_invoice.is_none() {
                report.first_invoice = Some(sale.invoice_no.clone());
            }
            report.last_invoice = Some(sale.invoice_no.clone());
            report.created += 1;

            next.counters = next.counters.advanced();
            next.sales.push(sale);
        }

        if report.created == 0 {
            return Err(CoreError::Import {
                message: "No valid rows found in file".to_string(),
            });
        }

        log::info!(
            "Imported {} sale(s), skipped {}",
            report.created,
            report.skipped_lines.len()
        );
        Ok((next, report))
    }

    // ==================== Views ====================

    pub fn sales_view(&self, filter: &Filter, today: NaiveDate) -> SalesView {
        let mut rows = filter.apply(&self.sales, today);
        order_sales(&mut rows);
        log::debug!("Sales view: {} of {}", rows.len(), self.sales.len());
        SalesView {
            totals: sales_totals(rows.iter().copied()),
            rows: rows.into_iter().map(OutstandingRow::from).collect(),
        }
    }

    pub fn refunds_view(&self, filter: &Filter, today: NaiveDate) -> RefundsView {
        let mut rows = filter.apply(&self.refunds, today);
        order_refunds(&mut rows);
        log::debug!("Refunds view: {} of {}", rows.len(), self.refunds.len());
        RefundsView {
            totals: refund_totals(rows.iter().copied()),
            rows: rows.into_iter().map(OutstandingRow::from).collect(),
        }
    }

    pub fn expenses_view(&self, filter: &Filter, today: NaiveDate) -> ExpensesView {
        let mut rows = filter.apply(&self.expenses, today);
        order_expenses(&mut rows);
        ExpensesView {
            totals: expense_totals(rows.iter().copied()),
            rows: rows.into_iter().cloned().collect(),
        }
    }

    /// Suppliers matching the filter by name/note and balance sign. The
    /// summary always covers every supplier.
    pub fn suppliers_view(&self, filter: &BalanceFilter) -> SuppliersView {
        let mut selected: Vec<&Supplier> = self
            .suppliers
            .iter()
            .filter(|s| filter.matches(*s, supplier_totals(Some(*s), &self.supplier_orders).balance))
            .collect();
        order_suppliers(&mut selected);

        SuppliersView {
            rows: selected
                .into_iter()
                .map(|s| SupplierRow {
                    supplier: s.clone(),
                    totals: supplier_totals(Some(s), &self.supplier_orders),
                    order_count: order_count(s.id, &self.supplier_orders),
                })
                .collect(),
            summary: supplier_summary(&self.suppliers, &self.supplier_orders),
        }
    }

    /// One supplier's orders, oldest first, filtered by text and by the sign
    /// of each order's credit minus debit
    pub fn supplier_statement(&self, supplier_id: u64, filter: &BalanceFilter) -> CoreResult<SupplierStatement> {
        let supplier = self.supplier(supplier_id)?;
        let mut orders: Vec<&SupplierOrder> = self
            .supplier_orders
            .iter()
            .filter(|o| o.supplier_id == supplier_id)
            .filter(|o| filter.matches(*o, o.amount_credit - o.amount_debit))
            .collect();
        order_supplier_orders(&mut orders);

        // The running balance starts at zero and covers only the listed orders
        let mut running = Decimal::ZERO;
        let orders = orders
            .into_iter()
            .map(|o| {
                running += o.amount_credit - o.amount_debit;
                StatementRow {
                    order: o.clone(),
                    balance: running,
                }
            })
            .collect();

        Ok(SupplierStatement {
            supplier: supplier.clone(),
            totals: supplier_totals(Some(supplier), &self.supplier_orders),
            orders,
        })
    }

    /// Filtered sales the customers still owe on
    pub fn receivables(&self, filter: &Filter, today: NaiveDate) -> OutstandingView<Sale> {
        let rows: Vec<OutstandingRow<Sale>> = self
            .sales_view(filter, today)
            .rows
            .into_iter()
            .filter(|r| r.unpaid > Decimal::ZERO)
            .collect();
        OutstandingView {
            totals: outstanding_totals(rows.iter().map(|r| r.unpaid)),
            rows,
        }
    }

    /// Filtered refunds still owed back to customers
    pub fn payables(&self, filter: &Filter, today: NaiveDate) -> OutstandingView<Refund> {
        let rows: Vec<OutstandingRow<Refund>> = self
            .refunds_view(filter, today)
            .rows
            .into_iter()
            .filter(|r| r.unpaid > Decimal::ZERO)
            .collect();
        OutstandingView {
            totals: outstanding_totals(rows.iter().map(|r| r.unpaid)),
            rows,
        }
    }

    pub fn cash_ledger_rows(&self) -> Vec<CashLedgerRow> {
        build_cash_ledger_rows(
            &self.sales,
            &self.refunds,
            &self.supplier_orders,
            &self.suppliers,
            &self.expenses,
        )
    }

    /// Cash ledger for the filter, starting from the opening balance
    pub fn cash_ledger(&self, opening: Decimal, filter: &Filter, today: NaiveDate) -> CashLedger {
        compute_running_ledger(&self.cash_ledger_rows(), opening, filter, today)
    }

    /// Cash ledger over every row
    pub fn cash_ledger_all(&self, opening: Decimal) -> CashLedger {
        cash_totals_all(&self.cash_ledger_rows(), opening)
    }

    pub fn profit(&self) -> ProfitBreakdown {
        profit(&self.sales, &self.refunds, &self.supplier_orders, &self.expenses)
    }

    /// Filtered sales total less filtered refund cash
    pub fn net_sales(&self, filter: &Filter, today: NaiveDate) -> Decimal {
        net_sales(
            &self.sales_view(filter, today).totals,
            &self.refunds_view(filter, today).totals,
        )
    }

    /// Global figures, unaffected by any view filter
    pub fn dashboard(&self, opening: Decimal) -> Dashboard {
        let ledger = self.cash_ledger_all(opening);
        let everything = Filter::default();
        // Quick range `All` never consults the day
        let any_day = NaiveDate::default();

        Dashboard {
            cash_opening: ledger.opening_balance,
            cash_in: ledger.total_in,
            cash_out: ledger.total_out,
            cash_closing: ledger.closing_balance,
            receivable: outstanding_totals(self.sales.iter().map(Sale::unpaid)),
            payable: outstanding_totals(self.refunds.iter().map(Refund::unpaid)),
            profit: self.profit(),
            suppliers: supplier_summary(&self.suppliers, &self.supplier_orders),
            net_sales: self.net_sales(&everything, any_day),
            recent_sales: recent_sales(&self.sales, RECENT_LIMIT)
                .into_iter()
                .map(OutstandingRow::from)
                .collect(),
            recent_refunds: recent_refunds(&self.refunds, RECENT_LIMIT)
                .into_iter()
                .map(OutstandingRow::from)
                .collect(),
        }
    }

    pub fn customer_names(&self) -> Vec<String> {
        customer_name_suggestions(&self.sales, &self.refunds, &self.supplier_orders)
    }

    /// Edit history of one record, oldest first
    pub fn history(&self, entity_type: EntityType, entity_id: u64) -> Vec<&ChangeLogEntry> {
        self.change_log.history(entity_type, entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BalanceMode, TransactionType};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tillbook_store::ImportedSaleRow;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn sale_draft(name: &str, total: &str, cash: &str) -> SaleDraft {
        SaleDraft {
            date: "2024-03-01".to_string(),
            customer_name: name.to_string(),
            product: "Chair".to_string(),
            total: total.to_string(),
            cash: cash.to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_create_sale_assigns_numbers_and_keeps_original() {
        let books = Books::default();
        assert_eq!(books.next_sale_numbers().0, "INV-0001");

        let (after, sale) = books.create_sale(&sale_draft(" Ana ", "100", "40")).unwrap();
        assert_eq!(sale.id, 1);
        assert_eq!(sale.invoice_no, "INV-0001");
        assert_eq!(sale.customer_no, "C-0001");
        assert_eq!(sale.customer_name, "Ana");
        assert_eq!(sale.unpaid(), dec!(60));
        assert_eq!(after.next_sale_numbers().0, "INV-0002");

        assert!(books.sales.is_empty());
        assert_eq!(books.counters, Counters::default());
    }

    #[test]
    fn test_create_sale_validation() {
        let books = Books::default();
        let mut draft = sale_draft("Ana", "10", "");
        draft.product = "  ".to_string();
        let err = books.create_sale(&draft).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[test]
    fn test_edit_sale_logs_changes() {
        let (books, sale) = Books::default().create_sale(&sale_draft("Ana", "100", "40")).unwrap();

        let (same, entry) = books.edit_sale(sale.id, &sale_draft("Ana", "100.00", "40"), now()).unwrap();
        assert!(entry.is_none());
        assert!(same.change_log.is_empty());

        let (edited, entry) = books.edit_sale(sale.id, &sale_draft("Ana", "100", "100"), now()).unwrap();
        let entry = entry.unwrap();
        assert_eq!(entry.changes.len(), 2);
        assert_eq!(edited.sale(sale.id).unwrap().invoice_no, "INV-0001");
        assert_eq!(edited.history(EntityType::Sale, sale.id).len(), 1);
    }

    #[test]
    fn test_delete_missing_sale() {
        assert!(matches!(
            Books::default().delete_sale(9),
            Err(CoreError::SaleNotFound { id: 9 })
        ));
    }

    #[test]
    fn test_refund_prefill_and_product_fallback() {
        let (books, sale) = Books::default().create_sale(&sale_draft("Ana", "100", "100")).unwrap();

        let mut draft = books.refund_draft_for_invoice(&sale.invoice_no);
        assert_eq!(draft.customer_no, "C-0001");
        assert_eq!(draft.customer_name, "Ana");
        assert_eq!(draft.product, "Chair");

        draft.product.clear();
        draft.date = "2024-03-05".to_string();
        draft.total = "30".to_string();
        let (books, refund) = books.create_refund(&draft).unwrap();
        assert_eq!(refund.product, "Chair");
        assert_eq!(refund.unpaid(), dec!(30));
        assert_eq!(books.refunds.len(), 1);

        let missing_invoice = RefundDraft {
            date: "2024-03-05".to_string(),
            ..RefundDraft::default()
        };
        assert!(books.create_refund(&missing_invoice).is_err());
    }

    #[test]
    fn test_supplier_guard() {
        let (books, supplier) = Books::default()
            .create_supplier(&SupplierDraft {
                name: "Acme".to_string(),
                ..SupplierDraft::default()
            })
            .unwrap();

        let rename = SupplierDraft {
            name: "Acme Ltd".to_string(),
            ..SupplierDraft::default()
        };
        assert!(books.edit_supplier(supplier.id, &rename, now()).is_ok());

        let (books, _) = books
            .create_supplier_order(&SupplierOrderDraft {
                supplier_id: Some(supplier.id),
                date: "2024-03-01".to_string(),
                customer_name: "Ana".to_string(),
                amount_credit: "50".to_string(),
                ..SupplierOrderDraft::default()
            })
            .unwrap();

        match books.delete_supplier(supplier.id) {
            Err(CoreError::SupplierHasOrders {
                supplier_id,
                order_count,
            }) => {
                assert_eq!(supplier_id, supplier.id);
                assert_eq!(order_count, 1);
            }
            other => panic!("expected guard, got {:?}", other),
        }
        assert!(matches!(
            books.edit_supplier(supplier.id, &rename, now()),
            Err(CoreError::SupplierHasOrders { .. })
        ));
    }

    #[test]
    fn test_supplier_order_needs_existing_supplier() {
        let draft = SupplierOrderDraft {
            supplier_id: Some(4),
            date: "2024-03-01".to_string(),
            customer_name: "Ana".to_string(),
            ..SupplierOrderDraft::default()
        };
        assert!(matches!(
            Books::default().create_supplier_order(&draft),
            Err(CoreError::SupplierNotFound { id: 4 })
        ));

        let unselected = SupplierOrderDraft {
            supplier_id: None,
            ..draft
        };
        assert!(matches!(
            Books::default().create_supplier_order(&unselected),
            Err(CoreError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_edited_order_stays_with_its_supplier() {
        let named = |name: &str| SupplierDraft {
            name: name.to_string(),
            ..SupplierDraft::default()
        };
        let (books, acme) = Books::default().create_supplier(&named("Acme")).unwrap();
        let (books, other) = books.create_supplier(&named("Birch")).unwrap();
        let draft = SupplierOrderDraft {
            supplier_id: Some(acme.id),
            date: "2024-03-01".to_string(),
            customer_name: "Ana".to_string(),
            amount_credit: "50".to_string(),
            ..SupplierOrderDraft::default()
        };
        let (books, order) = books.create_supplier_order(&draft).unwrap();

        let moved = SupplierOrderDraft {
            supplier_id: Some(other.id),
            amount_credit: "70".to_string(),
            ..draft.clone()
        };
        let (books, entry) = books.edit_supplier_order(order.id, &moved, now()).unwrap();
        let edited = books.supplier_order(order.id).unwrap();
        assert_eq!(edited.supplier_id, acme.id);
        assert_eq!(edited.amount_credit, dec!(70));
        let entry = entry.unwrap();
        assert_eq!(entry.changes.len(), 1);
        assert_eq!(entry.changes[0].field, "amountCredit");

        assert!(matches!(
            books.delete_supplier(acme.id),
            Err(CoreError::SupplierHasOrders { order_count: 1, .. })
        ));
        assert!(books.delete_supplier(other.id).is_ok());

        let unselected = SupplierOrderDraft {
            supplier_id: None,
            ..draft
        };
        let (books, _) = books.edit_supplier_order(order.id, &unselected, now()).unwrap();
        assert_eq!(books.supplier_order(order.id).unwrap().supplier_id, acme.id);
    }

    #[test]
    fn test_expense_defaults_to_today() {
        let (books, expense) = Books::default()
            .create_expense(
                &ExpenseDraft {
                    description: "Rent".to_string(),
                    cash: "abc".to_string(),
                    ..ExpenseDraft::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(expense.date, "2024-03-10");
        assert_eq!(expense.cash, Decimal::ZERO);
        assert_eq!(books.expenses.len(), 1);
    }

    #[test]
    fn test_import_sales() {
        let imported = ImportedSales {
            delimiter: ';',
            rows: vec![
                ImportedSaleRow {
                    line: 2,
                    date: Some("2024-02-03".to_string()),
                    customer_name: "Ana".to_string(),
                    product: "Chair".to_string(),
                    total: "120".to_string(),
                    cash: "100".to_string(),
                    unpaid: Some("999".to_string()),
                },
                ImportedSaleRow {
                    line: 3,
                    date: None,
                    customer_name: String::new(),
                    product: String::new(),
                    total: "0".to_string(),
                    cash: String::new(),
                    unpaid: None,
                },
                ImportedSaleRow {
                    line: 4,
                    date: None,
                    customer_name: "Ben".to_string(),
                    product: "Desk".to_string(),
                    total: "80".to_string(),
                    cash: String::new(),
                    unpaid: None,
                },
            ],
        };

        let (books, _) = Books::default().create_sale(&sale_draft("Cleo", "5", "5")).unwrap();
        let (books, report) = books.import_sales(&imported, today()).unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.skipped_lines, vec![3]);
        assert_eq!(report.first_invoice.as_deref(), Some("INV-0002"));
        assert_eq!(report.last_invoice.as_deref(), Some("INV-0003"));

        let ana = books.sale(2).unwrap();
        assert_eq!(ana.unpaid(), dec!(20));
        assert_eq!(books.sale(3).unwrap().date, "2024-03-10");
        assert_eq!(books.next_sale_numbers().0, "INV-0004");
    }

    #[test]
    fn test_import_with_no_valid_rows() {
        let imported = ImportedSales {
            delimiter: ',',
            rows: vec![],
        };
        assert!(matches!(
            Books::default().import_sales(&imported, today()),
            Err(CoreError::Import { .. })
        ));
    }

    #[test]
    fn test_supplier_views() {
        let mut books = Books::default();
        for (name, credit) in [("Zed", "10"), ("acme", "0"), ("Beta", "0")] {
            books = books
                .create_supplier(&SupplierDraft {
                    name: name.to_string(),
                    credit: credit.to_string(),
                    ..SupplierDraft::default()
                })
                .unwrap()
                .0;
        }
        let (books, _) = books
            .create_supplier_order(&SupplierOrderDraft {
                supplier_id: Some(3),
                date: "2024-03-01".to_string(),
                customer_name: "Ana".to_string(),
                transaction_type: TransactionType::Payment,
                amount_debit: "25".to_string(),
                ..SupplierOrderDraft::default()
            })
            .unwrap();

        let all = books.suppliers_view(&BalanceFilter::default());
        let names: Vec<&str> = all.rows.iter().map(|r| r.supplier.name.as_str()).collect();
        assert_eq!(names, vec!["acme", "Beta", "Zed"]);
        assert_eq!(all.summary.balance, dec!(-15));

        let debit = books.suppliers_view(&BalanceFilter::new("", BalanceMode::Debit));
        assert_eq!(debit.rows.len(), 1);
        assert_eq!(debit.rows[0].supplier.name, "Beta");
        assert_eq!(debit.rows[0].order_count, 1);
        assert_eq!(debit.summary.count, 3);

        let statement = books.supplier_statement(3, &BalanceFilter::default()).unwrap();
        assert_eq!(statement.orders.len(), 1);
        assert_eq!(statement.orders[0].balance, dec!(-25));
        assert_eq!(statement.totals.balance, dec!(-25));
        assert!(books.supplier_statement(9, &BalanceFilter::default()).is_err());
    }

    #[test]
    fn test_statement_running_balance() {
        let (mut books, acme) = Books::default()
            .create_supplier(&SupplierDraft {
                name: "Acme".to_string(),
                credit: "500".to_string(),
                ..SupplierDraft::default()
            })
            .unwrap();
        let orders = [
            ("2024-03-05", TransactionType::Payment, "", "60"),
            ("2024-03-01", TransactionType::Invoice, "100", ""),
            ("2024-03-03", TransactionType::Return, "", "20"),
            ("2024-03-01", TransactionType::Invoice, "40.50", ""),
        ];
        for (date, kind, credit, debit) in orders {
            books = books
                .create_supplier_order(&SupplierOrderDraft {
                    supplier_id: Some(acme.id),
                    date: date.to_string(),
                    customer_name: "Ana".to_string(),
                    transaction_type: kind,
                    amount_credit: credit.to_string(),
                    amount_debit: debit.to_string(),
                    ..SupplierOrderDraft::default()
                })
                .unwrap()
                .0;
        }

        let statement = books.supplier_statement(acme.id, &BalanceFilter::default()).unwrap();
        let rows: Vec<(u64, Decimal)> = statement.orders.iter().map(|r| (r.order.id, r.balance)).collect();
        assert_eq!(
            rows,
            vec![(2, dec!(100)), (4, dec!(140.50)), (3, dec!(120.50)), (1, dec!(60.50))]
        );
        // The opening credit stays in the totals, not in the running column
        assert_eq!(statement.totals.balance, dec!(560.50));

        let credits = books
            .supplier_statement(acme.id, &BalanceFilter::new("", BalanceMode::Credit))
            .unwrap();
        let balances: Vec<Decimal> = credits.orders.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![dec!(100), dec!(140.50)]);
    }

    #[test]
    fn test_receivables_and_payables() {
        let mut books = Books::default();
        for (name, total, cash) in [("Ana", "100", "40"), ("Ben", "50", "70"), ("Cleo", "10", "10")] {
            books = books.create_sale(&sale_draft(name, total, cash)).unwrap().0;
        }
        let receivables = books.receivables(&Filter::default(), today());
        assert_eq!(receivables.totals.count, 1);
        assert_eq!(receivables.totals.total, dec!(60));
        assert_eq!(receivables.rows[0].record.customer_name, "Ana");

        let payables = books.payables(&Filter::default(), today());
        assert_eq!(payables.totals.count, 0);
    }

    #[test]
    fn test_dashboard_ignores_view_filters() {
        let (books, _) = Books::default().create_sale(&sale_draft("Ana", "100", "40")).unwrap();
        let books = books.set_cash_opening("25");
        let opening = books.opening_balance_or(dec!(999));
        assert_eq!(opening, dec!(25));

        let dashboard = books.dashboard(opening);
        assert_eq!(dashboard.cash_closing, dec!(65));
        assert_eq!(dashboard.receivable.total, dec!(60));
        assert_eq!(dashboard.profit.profit, dec!(100));
        assert_eq!(dashboard.net_sales, dec!(100));
        assert_eq!(dashboard.recent_sales.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (books, _) = Books::default().create_sale(&sale_draft("Ana", "100", "40")).unwrap();
        let json = serde_json::to_string(&books).unwrap();
        let restored: Books = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, books);

        let empty: Books = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.counters, Counters::default());
    }

    #[test]
    fn test_oversized_stored_amounts_do_not_break_views() {
        let max = "79228162514264337593543950335";
        let json = format!(
            r#"{{
                "sales": [
                    {{"id": 1, "date": "2024-03-01", "customerName": "Ana", "product": "Sofa", "total": "{max}", "cash": "{max}"}},
                    {{"id": 2, "date": "2024-03-02", "customerName": "Ben", "product": "Lamp", "total": "{max}", "cash": "-{max}"}},
                    {{"id": 3, "date": "2024-03-03", "customerName": "Cleo", "product": "Rug", "total": "10", "cash": "4"}}
                ],
                "expenses": [{{"id": 1, "date": "2024-03-04", "description": "Rent", "cash": "{max}"}}],
                "cashOpening": "{max}"
            }}"#
        );
        let books: Books = serde_json::from_str(&json).unwrap();
        assert_eq!(books.sales[0].total, Decimal::ZERO);
        assert_eq!(books.cash_opening, Some(Decimal::ZERO));

        let dashboard = books.dashboard(books.opening_balance_or(Decimal::ZERO));
        assert_eq!(dashboard.cash_closing, dec!(4));
        assert_eq!(dashboard.receivable.total, dec!(6));
        assert_eq!(books.profit().profit, dec!(10));
        assert_eq!(books.sales_view(&Filter::default(), today()).rows.len(), 3);
    }
}
