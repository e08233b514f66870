//! Document identifiers: work-order code (from the page footer) and invoice
//! code (from the filename).

use regex::Regex;

use crate::error::{NfxError, Result};
use crate::models::config::{InvoiceCodeConfig, WorkOrderConfig};
use crate::pdf::Token;

/// Best work-order candidate seen so far.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    page_index: usize,
    top: f64,
    code: String,
}

/// Tracks the work-order code across the pages of one document.
///
/// A candidate is a bare 4–6 digit token near the left margin and near the
/// bottom of the page. The first page holding a candidate decides; within
/// it the bottom-most candidate wins.
#[derive(Debug, Clone)]
pub struct WorkOrderLocator {
    config: WorkOrderConfig,
    pattern: Regex,
    best: Option<Candidate>,
}

impl WorkOrderLocator {
    /// Create a locator for one document.
    pub fn new(config: &WorkOrderConfig) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"^\d{{{},{}}}$",
            config.min_digits, config.max_digits
        ))
        .map_err(|e| NfxError::Config(format!("invalid work-order digit range: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            pattern,
            best: None,
        })
    }

    /// Whether a token qualifies as a work-order candidate.
    pub fn is_candidate(&self, token: &Token) -> bool {
        token.x0 < self.config.max_x0
            && token.top > self.config.min_top
            && self.pattern.is_match(token.text.trim())
    }

    /// Feed the tokens of the page at `page_index` (pages in order).
    ///
    /// Once a page produced a candidate, later pages are ignored.
    pub fn observe_page(&mut self, page_index: usize, tokens: &[Token]) {
        for token in tokens {
            if !self.is_candidate(token) {
                continue;
            }
            let better = match &self.best {
                None => true,
                Some(best) => page_index == best.page_index && token.top > best.top,
            };
            if better {
                self.best = Some(Candidate {
                    page_index,
                    top: token.top,
                    code: token.text.trim().to_string(),
                });
            }
        }
    }

    /// The selected code, or an empty string when nothing qualified.
    pub fn code(&self) -> &str {
        self.best.as_ref().map(|c| c.code.as_str()).unwrap_or("")
    }

    /// Consume the locator and return the selected code.
    pub fn into_code(self) -> String {
        self.best.map(|c| c.code).unwrap_or_default()
    }
}

/// Extracts the invoice code from a source filename.
#[derive(Debug, Clone)]
pub struct InvoiceCodeLocator {
    pattern: Regex,
}

impl InvoiceCodeLocator {
    /// Create a locator for the configured minimum digit run.
    pub fn new(config: &InvoiceCodeConfig) -> Result<Self> {
        let pattern = Regex::new(&format!(r"\d{{{},}}", config.min_digits))
            .map_err(|e| NfxError::Config(format!("invalid invoice code length: {}", e)))?;
        Ok(Self { pattern })
    }

    /// First run of at least `min_digits` digits in `filename`, or an empty
    /// string.
    pub fn find(&self, filename: &str) -> String {
        self.pattern
            .find(filename)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}
