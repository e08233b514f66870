//! Column classification of line tokens.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::codes::CodeMatcher;
use super::inference::Amounts;
use super::lines::Line;
use super::numbers::parse_number;
use crate::models::config::LayoutConfig;
use crate::pdf::Token;

lazy_static! {
    static ref STARTS_WITH_DIGIT: Regex = Regex::new(r"^\d").unwrap();
    static ref STARTS_NUMERIC: Regex = Regex::new(r"^[\d.,]").unwrap();
}

/// Semantic column of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Product code.
    Code,
    /// Quantity.
    Quantity,
    /// Unit price.
    UnitPrice,
    /// Total price.
    TotalPrice,
    /// Free-text description.
    Description,
}

/// Semantic record of one text line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItem {
    /// Recognized product code.
    pub code: Option<String>,
    /// Description tokens joined with single spaces.
    pub description: String,
    /// Parsed and completed numeric fields.
    pub amounts: Amounts,
}

impl LineItem {
    /// Only lines with a code and at least one number are table rows;
    /// anything else is header or footer noise.
    pub fn is_row(&self) -> bool {
        self.code.as_deref().is_some_and(|c| !c.is_empty()) && self.amounts.any_present()
    }
}

/// Assigns tokens to columns from their position and text.
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    layout: LayoutConfig,
    codes: CodeMatcher,
}

impl ColumnClassifier {
    /// Create a classifier for a layout and a compiled code vocabulary.
    pub fn new(layout: LayoutConfig, codes: CodeMatcher) -> Self {
        Self { layout, codes }
    }

    /// Classify a single token. The first matching rule wins; `None` means
    /// the token is ignored.
    pub fn classify(&self, token: &Token) -> Option<Column> {
        let text = token.text.trim();
        let x0 = token.x0;
        let layout = &self.layout;

        if (layout.code.contains(x0) && self.codes.contains_code(text))
            || self.codes.is_code(text)
            || self.codes.is_family_code(text)
        {
            Some(Column::Code)
        } else if layout.quantity.contains(x0) && STARTS_WITH_DIGIT.is_match(text) {
            Some(Column::Quantity)
        } else if layout.unit_price.contains(x0) && STARTS_NUMERIC.is_match(text) {
            Some(Column::UnitPrice)
        } else if layout.total_price.contains(x0) && STARTS_NUMERIC.is_match(text) {
            Some(Column::TotalPrice)
        } else if layout.description.contains(x0) {
            Some(Column::Description)
        } else {
            None
        }
    }

    /// Build the line item of a line.
    ///
    /// For the single-valued columns the last token in encounter order wins;
    /// description tokens accumulate.
    pub fn classify_line(&self, line: &Line<'_>) -> LineItem {
        let mut code: Option<&str> = None;
        let mut quantity: Option<&str> = None;
        let mut unit_price: Option<&str> = None;
        let mut total_price: Option<&str> = None;
        let mut description: Vec<&str> = Vec::new();

        for token in &line.tokens {
            let text = token.text.trim();
            match self.classify(token) {
                Some(Column::Code) => code = Some(text),
                Some(Column::Quantity) => quantity = Some(text),
                Some(Column::UnitPrice) => unit_price = Some(text),
                Some(Column::TotalPrice) => total_price = Some(text),
                Some(Column::Description) => description.push(text),
                None => trace!("Ignoring token {:?} at x0={}", text, token.x0),
            }
        }

        let amounts = Amounts::new(
            quantity.and_then(parse_number),
            unit_price.and_then(parse_number),
            total_price.and_then(parse_number),
        )
        .infer();

        LineItem {
            code: code.map(str::to_string),
            description: description.join(" ").trim().to_string(),
            amounts,
        }
    }
}
