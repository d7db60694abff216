//! Date handling and the date part of list filters
//!
//! Record dates are ISO `YYYY-MM-DD` strings. Range bounds compare as
//! strings, which orders ISO dates correctly; quick ranges compare calendar
//! days against an explicit `today` so results never depend on the clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tillbook_config::{FilterConfig, QuickRange};

/// Parse an ISO date, `None` when it is not a real calendar day
pub fn parse_iso(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Format a day as ISO `YYYY-MM-DD`
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD` to `DD.MM.YYYY`. Input that does not split into three parts
/// is returned unchanged.
pub fn format_display_date(iso: &str) -> String {
    let parts: Vec<&str> = iso.split('-').collect();
    match parts.as_slice() {
        [y, m, d] if !y.is_empty() && !m.is_empty() && !d.is_empty() => {
            format!("{}.{}.{}", d, m, y)
        }
        _ => iso.to_string(),
    }
}

/// True when `date` lies between `today - days` and `today`, both included.
/// Unparseable and future dates are outside.
pub fn within_last_days(date: &str, days: i64, today: NaiveDate) -> bool {
    match parse_iso(date) {
        Some(d) => {
            let diff = (today - d).num_days();
            diff >= 0 && diff <= days
        }
        None => false,
    }
}

/// Day spans behind the `week` and `month` quick ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpans {
    pub week_days: i64,
    pub month_days: i64,
}

impl Default for RangeSpans {
    fn default() -> Self {
        Self {
            week_days: 7,
            month_days: 31,
        }
    }
}

impl From<&FilterConfig> for RangeSpans {
    fn from(config: &FilterConfig) -> Self {
        Self {
            week_days: config.week_days,
            month_days: config.month_days,
        }
    }
}

/// Date criteria of a list filter: a quick range plus optional bounds.
///
/// Choosing a quick range clears the bounds, and editing a bound resets the
/// quick range to `All`, so the two never fight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateFilter {
    pub range: QuickRange,
    /// Inclusive lower bound, ISO
    pub from: Option<String>,
    /// Inclusive upper bound, ISO
    pub to: Option<String>,
    #[serde(default)]
    pub spans: RangeSpans,
}

impl DateFilter {
    /// Filter on a quick range
    pub fn new(range: QuickRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    /// Filter on explicit bounds
    pub fn between(from: Option<String>, to: Option<String>) -> Self {
        let mut filter = Self::default();
        filter.set_from(from);
        filter.set_to(to);
        filter
    }

    /// Use custom day spans for the week and month ranges
    pub fn with_spans(mut self, spans: RangeSpans) -> Self {
        self.spans = spans;
        self
    }

    /// Select a quick range, dropping any explicit bounds
    pub fn set_range(&mut self, range: QuickRange) {
        self.range = range;
        self.from = None;
        self.to = None;
    }

    /// Set the lower bound, switching the quick range back to `All`
    pub fn set_from(&mut self, from: Option<String>) {
        self.from = from.filter(|d| !d.trim().is_empty());
        self.range = QuickRange::All;
    }

    /// Set the upper bound, switching the quick range back to `All`
    pub fn set_to(&mut self, to: Option<String>) {
        self.to = to.filter(|d| !d.trim().is_empty());
        self.range = QuickRange::All;
    }

    /// Check whether a record date passes both the bounds and the quick range
    pub fn contains(&self, date: &str, today: NaiveDate) -> bool {
        if let Some(ref from) = self.from {
            if date < from.as_str() {
                return false;
            }
        }
        if let Some(ref to) = self.to {
            if date > to.as_str() {
                return false;
            }
        }

        match self.range {
            QuickRange::All => true,
            QuickRange::Today => date == to_iso(today),
            QuickRange::Week => within_last_days(date, self.spans.week_days, today),
            QuickRange::Month => within_last_days(date, self.spans.month_days, today),
        }
    }

    /// Human-readable description of the active criteria
    pub fn description(&self) -> String {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => format!("{} to {}", from, to),
            (Some(from), None) => format!("From {}", from),
            (None, Some(to)) => format!("Until {}", to),
            (None, None) => match self.range {
                QuickRange::All => "All Time".to_string(),
                QuickRange::Today => "Today".to_string(),
                QuickRange::Week => format!("Last {} Days", self.spans.week_days),
                QuickRange::Month => format!("Last {} Days", self.spans.month_days),
            },
        }
    }
}
