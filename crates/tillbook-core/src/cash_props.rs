//! Property-based tests for the cash ledger and outstanding amounts.
//!
//! - Conservation: closing = opening + in - out, under any filter
//! - Ordering: the ledger does not depend on input order
//! - Rounding: outstanding amounts carry at most two decimals

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::outstanding;
use super::cash::{cash_totals_all, compute_running_ledger, CashLedgerRow};
use super::filter::Filter;
use super::time::DateFilter;
use super::types::CashEntryKind;

/// Amounts from 0.00 to 10,000.00 in cents
fn cents() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

/// Amounts with up to four decimals, signed
fn loose_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn kind() -> impl Strategy<Value = CashEntryKind> {
    prop_oneof![
        Just(CashEntryKind::Sale),
        Just(CashEntryKind::Refund),
        Just(CashEntryKind::SupplierPayment),
        Just(CashEntryKind::SupplierRefund),
        Just(CashEntryKind::Expense),
    ]
}

/// Rows with unique ids over a handful of dates in March 2024
fn ledger_rows() -> impl Strategy<Value = Vec<CashLedgerRow>> {
    prop::collection::vec((1u32..=20, kind(), cents(), any::<bool>()), 0..40).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, (day, kind, amount, incoming))| CashLedgerRow {
                id: format!("row-{}", i),
                date: format!("2024-03-{:02}", day),
                kind,
                description: format!("entry {}", i),
                amount_in: if incoming { amount } else { Decimal::ZERO },
                amount_out: if incoming { Decimal::ZERO } else { amount },
            })
            .collect()
    })
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Closing balance equals opening plus inflows minus outflows, and the
    /// newest row carries the closing balance.
    #[test]
    fn prop_ledger_conserves_cash(rows in ledger_rows(), opening in cents()) {
        let ledger = cash_totals_all(&rows, opening);

        prop_assert_eq!(ledger.closing_balance, opening + ledger.total_in - ledger.total_out);
        prop_assert_eq!(ledger.rows.len(), rows.len());
        if let Some(newest) = ledger.rows.first() {
            prop_assert_eq!(newest.balance, ledger.closing_balance);
        }
    }

    /// Conservation holds for the filtered subset as well.
    #[test]
    fn prop_filtered_ledger_conserves_cash(
        rows in ledger_rows(),
        opening in cents(),
        from_day in 1u32..=20,
        span in 0u32..10,
    ) {
        let from = format!("2024-03-{:02}", from_day);
        let to = format!("2024-03-{:02}", (from_day + span).min(28));
        let filter = Filter::new("", DateFilter::between(Some(from.clone()), Some(to.clone())));

        let ledger = compute_running_ledger(&rows, opening, &filter, today());
        prop_assert_eq!(ledger.closing_balance, opening + ledger.total_in - ledger.total_out);
        for row in &ledger.rows {
            prop_assert!(row.row.date >= from && row.row.date <= to);
        }
    }

    /// Shuffling the input never changes the ledger.
    #[test]
    fn prop_ledger_is_order_independent(
        (rows, shuffled) in ledger_rows().prop_flat_map(|rows| {
            let shuffled = Just(rows.clone()).prop_shuffle();
            (Just(rows), shuffled)
        }),
        opening in cents(),
    ) {
        prop_assert_eq!(cash_totals_all(&rows, opening), cash_totals_all(&shuffled, opening));
    }

    /// Display order is newest first: dates never increase down the list.
    #[test]
    fn prop_ledger_displays_newest_first(rows in ledger_rows()) {
        let ledger = cash_totals_all(&rows, Decimal::ZERO);
        for pair in ledger.rows.windows(2) {
            prop_assert!(pair[0].row.date >= pair[1].row.date);
        }
    }

    /// Outstanding amounts have at most two decimals and stay within half a
    /// cent of the exact difference.
    #[test]
    fn prop_outstanding_is_rounded(total in loose_amount(), cash in loose_amount()) {
        let result = outstanding(total, cash);
        prop_assert!(result.scale() <= 2);
        prop_assert!((result - (total - cash)).abs() <= Decimal::new(5, 3));
    }
}
