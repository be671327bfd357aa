//! Customer spreadsheet parsing.
//!
//! The spreadsheet is a CSV export of a shared sheet maintained by hand, so
//! column names vary. Columns are located by case-insensitive substring
//! matches against the header row and rows are keyed by the digits of their
//! order number.
//!
//! The parser is deliberately small: double quotes group a field but escaped
//! quotes (`""`) and newlines inside quotes are not supported.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing a spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// The payload had no header row.
    #[error("spreadsheet export is empty")]
    Empty,

    /// No header looked like an order identifier.
    #[error("no order column found in headers: {0:?}")]
    MissingOrderColumn(Vec<String>),
}

/// Customer and address fields for one order, as typed into the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Column positions detected from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetColumns {
    pub order: usize,
    pub email: Option<usize>,
    pub phone: Option<usize>,
    pub first_name: Option<usize>,
    pub last_name: Option<usize>,
    pub address1: Option<usize>,
    pub address2: Option<usize>,
    pub city: Option<usize>,
    pub province: Option<usize>,
    pub zip: Option<usize>,
    pub country: Option<usize>,
}

impl SheetColumns {
    /// Locate columns in a header row.
    ///
    /// The order column is the first header containing `id`, `number` or
    /// `name`. A sheet with `First Name` before `Order Number` therefore keys
    /// rows by first name; first match wins.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::MissingOrderColumn`] when no header qualifies.
    pub fn from_headers(headers: &[String]) -> Result<Self, SheetError> {
        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let find = |pred: &dyn Fn(&str) -> bool| lowered.iter().position(|h| pred(h.as_str()));

        let order = find(&|h| h.contains("id") || h.contains("number") || h.contains("name"))
            .ok_or_else(|| SheetError::MissingOrderColumn(headers.to_vec()))?;

        Ok(Self {
            order,
            email: find(&|h| h.contains("email")),
            phone: find(&|h| h.contains("phone")),
            first_name: find(&|h| h.contains("first")),
            last_name: find(&|h| h.contains("last")),
            address1: find(&|h| {
                h.contains("address") && !h.contains("email") && !h.contains('2')
            }),
            address2: find(&|h| {
                (h.contains("address") && !h.contains("email") && h.contains('2'))
                    || h.contains("apartment")
                    || h.contains("suite")
            }),
            city: find(&|h| h.contains("city")),
            province: find(&|h| h.contains("province") || h.contains("state")),
            zip: find(&|h| h.contains("zip") || h.contains("postal")),
            country: find(&|h| h.contains("country")),
        })
    }

    fn entry_from(&self, fields: &[String]) -> SheetEntry {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| fields.get(i))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        SheetEntry {
            first_name: cell(self.first_name),
            last_name: cell(self.last_name),
            email: cell(self.email),
            phone: cell(self.phone),
            address1: cell(self.address1),
            address2: cell(self.address2),
            city: cell(self.city),
            province: cell(self.province),
            zip: cell(self.zip),
            country: cell(self.country),
        }
    }
}

/// Result of parsing a spreadsheet export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSheet {
    /// Header row as exported.
    pub headers: Vec<String>,
    /// Detected column positions.
    pub columns: SheetColumns,
    /// Entries keyed by normalized order number.
    pub entries: HashMap<String, SheetEntry>,
    /// Data rows dropped because their order number had no digits.
    pub skipped_rows: usize,
}

impl ParsedSheet {
    /// Look up an entry by any spelling of an order number.
    #[must_use]
    pub fn get(&self, order_number: &str) -> Option<&SheetEntry> {
        self.entries.get(&normalize_order_number(order_number))
    }
}

/// Parse a CSV export into entries keyed by normalized order number.
///
/// Blank lines are ignored and `\r\n` line endings are accepted. When two rows
/// share an order number the later row wins.
///
/// # Errors
///
/// Returns [`SheetError::Empty`] for a payload without a header row and
/// [`SheetError::MissingOrderColumn`] when no order column can be found.
pub fn parse_customer_sheet(csv: &str) -> Result<ParsedSheet, SheetError> {
    let mut lines = csv
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let headers = lines.next().map(split_csv_line).ok_or(SheetError::Empty)?;
    let columns = SheetColumns::from_headers(&headers)?;

    let mut entries = HashMap::new();
    let mut skipped_rows = 0;

    for line in lines {
        let fields = split_csv_line(line);
        let key = fields
            .get(columns.order)
            .map(|raw| normalize_order_number(raw))
            .unwrap_or_default();

        if key.is_empty() {
            skipped_rows += 1;
            continue;
        }

        entries.insert(key, columns.entry_from(&fields));
    }

    Ok(ParsedSheet {
        headers,
        columns,
        entries,
        skipped_rows,
    })
}

/// Split one CSV line into trimmed fields.
///
/// Commas inside double quotes do not split; the quotes themselves are
/// dropped.
#[must_use]
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Normalize an order number to its digits.
///
/// `#1033`, `1033` and `Order 1033` all become `1033`.
#[must_use]
pub fn normalize_order_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
