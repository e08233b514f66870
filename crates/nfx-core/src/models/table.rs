//! Output table model.

use serde::{Deserialize, Serialize};

/// Column names of the output table, in order.
pub const COLUMNS: [&str; 7] = [
    "NF",
    "OS",
    "CODIGO",
    "DESCRICAO",
    "QUANT.",
    "V. UNIT.",
    "V. TOTAL.",
];

/// One line item of an invoice, rendered for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
    /// Invoice code, taken from the source filename.
    #[serde(rename = "NF")]
    pub invoice_code: String,

    /// Work-order code, taken from the document footer.
    #[serde(rename = "OS")]
    pub work_order: String,

    /// Product code.
    #[serde(rename = "CODIGO")]
    pub code: String,

    /// Free-text description.
    #[serde(rename = "DESCRICAO")]
    pub description: String,

    /// Quantity (compact format).
    #[serde(rename = "QUANT.")]
    pub quantity: String,

    /// Unit price (two decimals).
    #[serde(rename = "V. UNIT.")]
    pub unit_price: String,

    /// Total price (two decimals).
    #[serde(rename = "V. TOTAL.")]
    pub total_price: String,
}

impl Row {
    /// Field values in `COLUMNS` order.
    pub fn values(&self) -> [&str; 7] {
        [
            self.invoice_code.as_str(),
            self.work_order.as_str(),
            self.code.as_str(),
            self.description.as_str(),
            self.quantity.as_str(),
            self.unit_price.as_str(),
            self.total_price.as_str(),
        ]
    }
}

/// An ordered sequence of rows with the fixed `COLUMNS` schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in document order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Column names, identical for every table.
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Move all rows of `other` to the end of this table.
    pub fn append(&mut self, other: Table) {
        self.rows.extend(other.rows);
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
