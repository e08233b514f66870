//! Line-item recovery from positioned tokens.
//!
//! Pipeline per page: [`lines`] groups tokens into text lines,
//! [`classifier`] assigns tokens to columns (using [`codes`] for product
//! codes), [`numbers`] parses the numeric columns and [`inference`] fills a
//! single missing amount. [`document`] assembles rows per document and
//! concatenates documents.

pub mod classifier;
pub mod codes;
pub mod document;
pub mod identifiers;
pub mod inference;
pub mod lines;
pub mod numbers;

pub use classifier::{Column, ColumnClassifier, LineItem};
pub use codes::{normalize, CodeMatcher};
pub use document::{aggregate, extract_batch, extract_document, DocumentExtractor, SourceDocument};
pub use identifiers::{InvoiceCodeLocator, WorkOrderLocator};
pub use inference::Amounts;
pub use lines::{group_lines, Line};
pub use numbers::{format_number, parse_number, NumberStyle};
