//! List filters: free-text search, date criteria and balance-sign modes
//!
//! Filters only select; each view applies its own ordering afterwards.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tillbook_config::QuickRange;

use super::cash::CashLedgerRow;
use super::models::{Expense, Refund, Sale, Supplier, SupplierOrder};
use super::time::DateFilter;
use super::types::BalanceMode;

/// Records that expose a composite search string
pub trait Searchable {
    fn search_text(&self) -> String;
}

/// Records carrying an ISO date
pub trait Dated {
    fn date(&self) -> &str;
}

impl Searchable for Sale {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.customer_name, self.product, self.invoice_no)
    }
}

impl Dated for Sale {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Searchable for Refund {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.customer_name, self.product, self.invoice_no)
    }
}

impl Dated for Refund {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Searchable for Expense {
    fn search_text(&self) -> String {
        format!("{} {}", self.description, self.note)
    }
}

impl Dated for Expense {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Searchable for Supplier {
    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.note)
    }
}

impl Searchable for SupplierOrder {
    fn search_text(&self) -> String {
        format!("{} {}", self.customer_name, self.product)
    }
}

impl Searchable for CashLedgerRow {
    fn search_text(&self) -> String {
        self.description.clone()
    }
}

impl Dated for CashLedgerRow {
    fn date(&self) -> &str {
        &self.date
    }
}

/// Case-insensitive substring match; an empty needle matches everything
pub fn matches_search(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Search text combined with date criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub dates: DateFilter,
}

impl Filter {
    pub fn new(search: impl Into<String>, dates: DateFilter) -> Self {
        Self {
            search: search.into(),
            dates,
        }
    }

    /// Filter with only a quick range
    pub fn quick(range: QuickRange) -> Self {
        Self::new("", DateFilter::new(range))
    }

    /// Check a single record
    pub fn matches<T: Searchable + Dated>(&self, item: &T, today: NaiveDate) -> bool {
        matches_search(&item.search_text(), &self.search) && self.dates.contains(item.date(), today)
    }

    /// Select the matching records, keeping input order
    pub fn apply<'a, T: Searchable + Dated>(&self, items: &'a [T], today: NaiveDate) -> Vec<&'a T> {
        items.iter().filter(|i| self.matches(*i, today)).collect()
    }
}

/// Search text combined with a balance-sign mode, for supplier lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub mode: BalanceMode,
}

impl BalanceFilter {
    pub fn new(search: impl Into<String>, mode: BalanceMode) -> Self {
        Self {
            search: search.into(),
            mode,
        }
    }

    /// Check a record whose balance has already been computed
    pub fn matches<T: Searchable>(&self, item: &T, balance: Decimal) -> bool {
        matches_search(&item.search_text(), &self.search) && self.mode.accepts(balance)
    }
}

impl BalanceMode {
    /// `Credit` keeps positive balances, `Debit` negative ones
    pub fn accepts(&self, balance: Decimal) -> bool {
        match self {
            BalanceMode::All => true,
            BalanceMode::Credit => balance > Decimal::ZERO,
            BalanceMode::Debit => balance < Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn sale(id: u64, date: &str, name: &str, product: &str) -> Sale {
        Sale {
            id,
            invoice_no: format!("INV-{:04}", id),
            customer_no: String::new(),
            date: date.to_string(),
            customer_name: name.to_string(),
            product: product.to_string(),
            total: dec!(10),
            cash: dec!(10),
            note: String::new(),
        }
    }

    #[test]
    fn test_search_is_case_insensitive_over_composite_text() {
        let sales = vec![
            sale(1, "2024-03-10", "Ana", "Chair"),
            sale(2, "2024-03-09", "Ben", "Desk"),
        ];
        let filter = Filter::new("desk", DateFilter::default());
        let found = filter.apply(&sales, today());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);

        let by_invoice = Filter::new("inv-0001", DateFilter::default());
        assert_eq!(by_invoice.apply(&sales, today())[0].id, 1);
    }

    #[test]
    fn test_search_and_dates_are_a_conjunction() {
        let sales = vec![
            sale(1, "2024-03-10", "Ana", "Chair"),
            sale(2, "2024-02-01", "Ana", "Chair"),
        ];
        let filter = Filter::new("ana", DateFilter::new(QuickRange::Week));
        let found = filter.apply(&sales, today());
        assert_eq!(found.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_balance_mode() {
        assert!(BalanceMode::Credit.accepts(dec!(0.01)));
        assert!(!BalanceMode::Credit.accepts(Decimal::ZERO));
        assert!(BalanceMode::Debit.accepts(dec!(-1)));
        assert!(!BalanceMode::Debit.accepts(Decimal::ZERO));
        assert!(BalanceMode::All.accepts(Decimal::ZERO));
    }

    #[test]
    fn test_balance_filter() {
        let supplier = Supplier {
            id: 1,
            name: "Acme Wood".to_string(),
            note: "pine".to_string(),
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
        };
        assert!(BalanceFilter::new("PINE", BalanceMode::Credit).matches(&supplier, dec!(5)));
        assert!(!BalanceFilter::new("oak", BalanceMode::All).matches(&supplier, dec!(5)));
        assert!(!BalanceFilter::new("", BalanceMode::Debit).matches(&supplier, dec!(5)));
    }
}
