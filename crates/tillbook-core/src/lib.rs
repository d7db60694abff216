//! Core bookkeeping logic
//!
//! Everything below `Bookkeeper` is pure: records go in, snapshots and
//! figures come out, and the current day is always an argument.

pub mod audit;
pub mod balance;
pub mod books;
pub mod cash;
pub mod error;
pub mod filter;
pub mod ids;
pub mod models;
pub mod money;
pub mod reports;
pub mod summary;
pub mod time;
pub mod types;
pub mod views;

#[cfg(test)]
mod cash_props;

use rust_decimal::Decimal;
use std::path::Path;
use std::sync::RwLock;
use tillbook_config::Config;
use tillbook_store::{read_sales_csv, StoreRef};

pub use audit::{ChangeLog, ChangeLogEntry, FieldChange, FieldValue, Tracked};
pub use books::{Books, Dashboard, ImportReport, StatementRow, SupplierStatement};
pub use cash::{CashLedger, CashLedgerRow, RunningRow};
pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use filter::{BalanceFilter, Filter};
pub use models::{
    Expense, ExpenseDraft, Refund, RefundDraft, Sale, SaleDraft, Supplier, SupplierDraft,
    SupplierOrder, SupplierOrderDraft,
};
pub use money::{parse_money_or_zero, MoneyFormat};
pub use time::{DateFilter, RangeSpans};
pub use types::{BalanceMode, CashEntryKind, EntityType, TransactionType};

/// Snapshot store reference for the books
pub type BooksStore = StoreRef<Books>;

/// Holds the current books and writes every committed snapshot through the store
pub struct Bookkeeper {
    config: Config,
    store: BooksStore,
    books: RwLock<Books>,
}

impl Bookkeeper {
    pub fn new(config: Config, store: BooksStore) -> Self {
        Self {
            config,
            store,
            books: RwLock::new(Books::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the stored snapshot, replacing whatever is held
    pub async fn load(&self) -> CoreResult<Books> {
        let books = self.store.load().await?;
        log::info!(
            "Loaded {} sale(s), {} refund(s), {} supplier(s), {} order(s), {} expense(s)",
            books.sales.len(),
            books.refunds.len(),
            books.suppliers.len(),
            books.supplier_orders.len(),
            books.expenses.len()
        );
        self.replace(books.clone());
        Ok(books)
    }

    /// Current snapshot
    pub fn books(&self) -> Books {
        match self.books.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, books: Books) {
        match self.books.write() {
            Ok(mut guard) => *guard = books,
            Err(poisoned) => *poisoned.into_inner() = books,
        }
    }

    /// Persist `books` and make it the current snapshot.
    ///
    /// The held snapshot only changes once the store accepted the write.
    pub async fn commit(&self, books: Books) -> CoreResult<()> {
        self.store.save(&books).await?;
        self.replace(books);
        Ok(())
    }

    /// Opening cash: the recorded one, otherwise the configured default
    pub fn opening_balance(&self) -> Decimal {
        let configured = parse_money_or_zero(&self.config.ledger.opening_balance);
        self.books().opening_balance_or(configured)
    }

    pub fn money_format(&self) -> MoneyFormat {
        MoneyFormat::from(&self.config.currency)
    }

    pub fn range_spans(&self) -> RangeSpans {
        RangeSpans::from(&self.config.filters)
    }

    /// View filter seeded with the configured default range
    pub fn default_filter(&self, search: impl Into<String>) -> Filter {
        Filter::new(
            search,
            DateFilter::new(self.config.filters.default_range).with_spans(self.range_spans()),
        )
    }

    /// Import a sales CSV into the current books and commit the result
    pub async fn import_csv(&self, path: &Path, today: chrono::NaiveDate) -> CoreResult<ImportReport> {
        let imported = read_sales_csv(path).await?;
        log::debug!(
            "Read {} row(s) from {} (delimiter {:?})",
            imported.rows.len(),
            path.display(),
            imported.delimiter
        );
        let (books, report) = self.books().import_sales(&imported, today)?;
        self.commit(books).await?;
        Ok(report)
    }
}
