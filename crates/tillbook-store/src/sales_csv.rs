//! Sales CSV import
//!
//! Reads spreadsheet exports with a header row. Amounts are handed back as
//! raw text; coercion to money happens in the core.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const NAME_HEADERS: &[&str] = &["name", "customer", "customername"];
const PRODUCT_HEADERS: &[&str] = &["product"];
const TOTAL_HEADERS: &[&str] = &["totalamount", "total"];
const CASH_HEADERS: &[&str] = &["cash"];
const UNPAID_HEADERS: &[&str] = &["unpaid", "outstanding"];
const DATE_HEADERS: &[&str] = &["datum", "date", "salesdate"];

/// One non-blank body row of a sales import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedSaleRow {
    /// 1-based line number in the source file
    pub line: usize,
    /// ISO date, when the row carried a readable one
    pub date: Option<String>,
    pub customer_name: String,
    pub product: String,
    pub total: String,
    pub cash: String,
    /// Present only when the file has an unpaid/outstanding column
    pub unpaid: Option<String>,
}

/// Result of parsing a sales import file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedSales {
    pub rows: Vec<ImportedSaleRow>,
    /// Delimiter detected from the header line
    pub delimiter: char,
}

/// Column positions resolved from the header
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    product: usize,
    total: usize,
    cash: Option<usize>,
    unpaid: Option<usize>,
    date: Option<usize>,
}

/// Parser for sales CSV exports
pub struct SalesCsvParser;

type BodyRecord = (usize, Vec<String>);

impl SalesCsvParser {
    /// Parse CSV text into import rows
    pub fn parse(content: &str) -> Result<ImportedSales, StoreError> {
        let text = content.trim_start_matches('\u{FEFF}');
        let Some(header_line) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return Err(StoreError::Empty);
        };
        let delimiter = if header_line.contains(';') { ';' } else { ',' };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut records: Vec<BodyRecord> = Vec::new();
        for result in reader.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Skipping malformed CSV record: {}", e);
                    continue;
                }
            };
            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line() as usize).unwrap_or_default();
            records.push((line, fields));
        }

        let Some((header, body)) = records.split_first() else {
            return Err(StoreError::Empty);
        };
        let header = &header.1;

        let columns = Self::resolve_columns(header, body)?;

        let cell = |cols: &[String], idx: usize| cols.get(idx).cloned().unwrap_or_default();

        let rows = body
            .iter()
            .map(|(line, cols)| ImportedSaleRow {
                line: *line,
                date: columns
                    .date
                    .map(|idx| cell(cols, idx))
                    .and_then(|raw| parse_dmy_to_iso(&raw)),
                customer_name: cell(cols, columns.name),
                product: cell(cols, columns.product),
                total: cell(cols, columns.total),
                cash: columns.cash.map(|idx| cell(cols, idx)).unwrap_or_default(),
                unpaid: columns.unpaid.map(|idx| cell(cols, idx)),
            })
            .collect();

        Ok(ImportedSales { rows, delimiter })
    }

    fn resolve_columns(
        header: &[String],
        body: &[BodyRecord],
    ) -> Result<Columns, StoreError> {
        let find = |aliases: &[&str]| {
            header
                .iter()
                .position(|h| aliases.contains(&normalise_header_name(h).as_str()))
        };

        let name = find(NAME_HEADERS);
        let product = find(PRODUCT_HEADERS);
        let total = find(TOTAL_HEADERS);

        let (Some(name), Some(product), Some(total)) = (name, product, total) else {
            let mut missing = Vec::new();
            if name.is_none() {
                missing.push("name".to_string());
            }
            if product.is_none() {
                missing.push("product".to_string());
            }
            if total.is_none() {
                missing.push("total amount".to_string());
            }
            return Err(StoreError::MissingColumns { columns: missing });
        };

        let date = find(DATE_HEADERS).or_else(|| Self::detect_date_column(header.len(), body));

        Ok(Columns {
            name,
            product,
            total,
            cash: find(CASH_HEADERS),
            unpaid: find(UNPAID_HEADERS),
            date,
        })
    }

    /// Pick the first column whose first non-empty value looks like `d.m.y`
    fn detect_date_column(width: usize, body: &[BodyRecord]) -> Option<usize> {
        static DMY_PATTERN: once_cell::sync::OnceCell<regex::Regex> =
            once_cell::sync::OnceCell::new();
        let dmy = DMY_PATTERN
            .get_or_init(|| regex::Regex::new(r"^\d{1,2}[./-]\d{1,2}[./-]\d{2,4}$").unwrap());

        (0..width).find(|&col| {
            body.iter()
                .filter_map(|(_, cols)| cols.get(col))
                .find(|v| !v.is_empty())
                .map(|v| dmy.is_match(v))
                .unwrap_or(false)
        })
    }
}

/// Lowercase and strip whitespace so `Total Amount` matches `totalamount`
pub fn normalise_header_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Convert a `d.m.y` style date or an Excel serial day number to ISO `YYYY-MM-DD`.
///
/// `-` and `/` are accepted as separators. Two-digit years of 70 and above
/// land in the 1900s, the rest in the 2000s. Returns `None` for anything that
/// does not name a real calendar day.
pub fn parse_dmy_to_iso(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    static SERIAL_PATTERN: once_cell::sync::OnceCell<regex::Regex> =
        once_cell::sync::OnceCell::new();
    let serial_regex =
        SERIAL_PATTERN.get_or_init(|| regex::Regex::new(r"^(\d+)(\.0+)?$").unwrap());

    if let Some(caps) = serial_regex.captures(trimmed) {
        let serial: i64 = caps.get(1)?.as_str().parse().ok()?;
        let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        let date = base.checked_add_signed(Duration::days(serial))?;
        return Some(date.format("%Y-%m-%d").to_string());
    }

    let normalised = trimmed.replace(['-', '/'], ".");
    let parts: Vec<&str> = normalised
        .split('.')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }

    let (day, month, year) = (parts[0], parts[1], parts[2]);
    let year = if year.len() == 2 {
        let yy: u32 = year.parse().ok()?;
        if yy >= 70 {
            format!("19{}", year)
        } else {
            format!("20{}", year)
        }
    } else {
        year.to_string()
    };

    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    Some(date.format("%Y-%m-%d").to_string())
}
