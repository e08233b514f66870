//! Core library for invoice line-item recovery.
//!
//! This crate provides:
//! - PDF token extraction (words with bounding boxes)
//! - Line grouping and column classification for a fixed invoice layout
//! - Locale-aware number parsing, amount inference and formatting
//! - Per-document tables and batch aggregation

pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;

pub use error::{NfxError, PdfError, Result};
pub use extract::{extract_batch, extract_document, DocumentExtractor, SourceDocument};
pub use models::config::NfxConfig;
pub use models::table::{Row, Table, COLUMNS};
pub use pdf::{PdfExtractor, PdfPage, Token, TokenSource};
