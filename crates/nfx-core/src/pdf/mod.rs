//! PDF processing module.
//!
//! Turns raw document bytes into pages of positioned word tokens. Everything
//! downstream only sees [`Token`]s, so the extraction pipeline can be driven
//! by any [`TokenSource`].

mod extractor;

pub use extractor::PdfExtractor;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// A positioned word on a page.
///
/// Coordinates are in PDF user units with the origin at the top-left corner
/// of the page; `top` and `bottom` increase downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Word text.
    pub text: String,
    /// Left edge.
    pub x0: f64,
    /// Right edge.
    pub x1: f64,
    /// Upper edge.
    pub top: f64,
    /// Lower edge.
    pub bottom: f64,
}

impl Token {
    /// Create a token; the right edge is derived from the text length.
    pub fn new(text: impl Into<String>, x0: f64, top: f64, bottom: f64) -> Self {
        let text = text.into();
        let x1 = x0 + text.chars().count() as f64 * (bottom - top) * 0.5;
        Self {
            text,
            x0,
            x1,
            top,
            bottom,
        }
    }

    /// Vertical center of the bounding box.
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Tokens of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Word tokens in content-stream order.
    pub tokens: Vec<Token>,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of positioned tokens for a document.
pub trait TokenSource {
    /// Decode `data` and return its pages in order.
    fn pages(&self, data: &[u8]) -> Result<Vec<PdfPage>>;
}
