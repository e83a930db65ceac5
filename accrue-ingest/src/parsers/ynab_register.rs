//! YNAB register export parser (CSV)
//!
//! Register exports carry one row per ledger transaction:
//! "Account","Flag","Date","Payee","Category Group/Category","Category Group",
//! "Category","Memo","Outflow","Inflow","Cleared"
//!
//! Columns are located by header name, so extra or reordered columns are
//! tolerated. Amounts are currency strings ("$1,234.56"); dates are
//! MM/DD/YYYY or ISO.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;

use crate::types::{Cleared, RegisterRow};

struct Columns {
    account: usize,
    date: usize,
    outflow: usize,
    inflow: usize,
    flag: Option<usize>,
    payee: Option<usize>,
    memo: Option<usize>,
    cleared: Option<usize>,
}

fn position(record: &csv::StringRecord, name: &str) -> Option<usize> {
    record
        .iter()
        .position(|h| h.trim().trim_matches('"').eq_ignore_ascii_case(name))
}

impl Columns {
    /// Detects the header row; `None` means this record is not the header.
    fn detect(record: &csv::StringRecord) -> Option<Columns> {
        Some(Columns {
            account: position(record, "Account")?,
            date: position(record, "Date")?,
            outflow: position(record, "Outflow")?,
            inflow: position(record, "Inflow")?,
            flag: position(record, "Flag"),
            payee: position(record, "Payee"),
            memo: position(record, "Memo"),
            cleared: position(record, "Cleared"),
        })
    }
}

fn parse_register_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Currency string to milliunits: "$1,234.56" -> 1_234_560.
fn parse_milliunits(raw: &str, scrub: &Regex) -> i64 {
    let cleaned = scrub.replace_all(raw.trim(), "");
    let value: f64 = cleaned.parse().unwrap_or(0.0);
    (value * 1000.0).round() as i64
}

fn parse_records<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<RegisterRow>> {
    // Strips currency symbols and group separators, keeps digits/dot/minus.
    let scrub = Regex::new(r"[^0-9.\-]")?;

    let mut columns: Option<Columns> = None;
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let cols = match &columns {
            None => {
                columns = Columns::detect(&record);
                continue;
            }
            Some(cols) => cols,
        };

        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let account = field(Some(cols.account));
        if account.is_empty() {
            continue;
        }
        let date = match parse_register_date(field(Some(cols.date))) {
            Some(d) => d,
            None => continue, // skip unparseable rows
        };

        let outflow = parse_milliunits(field(Some(cols.outflow)), &scrub);
        let inflow = parse_milliunits(field(Some(cols.inflow)), &scrub);

        let flag = {
            let raw = field(cols.flag);
            if raw.is_empty() {
                None
            } else {
                Some(raw.to_ascii_lowercase())
            }
        };

        rows.push(RegisterRow {
            account: account.to_string(),
            date,
            payee: field(cols.payee).to_string(),
            memo: field(cols.memo).to_string(),
            flag,
            amount_milliunits: inflow - outflow,
            cleared: Cleared::from_register(field(cols.cleared)),
        });
    }

    if columns.is_none() {
        bail!("no register header row found");
    }
    Ok(rows)
}

/// Parse register CSV text, returning all valid rows.
/// Rows with a missing account or unparseable date are skipped.
pub fn parse_register(text: &str) -> Result<Vec<RegisterRow>> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());
    parse_records(rdr)
}

/// Parse a register CSV file.
pub fn parse_register_csv(path: impl AsRef<Path>) -> Result<Vec<RegisterRow>> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_records(rdr).with_context(|| format!("parsing {}", path.as_ref().display()))
}
