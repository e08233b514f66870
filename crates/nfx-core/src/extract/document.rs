//! Per-document row assembly and batch aggregation.

use std::time::Instant;

use tracing::{debug, info, trace};

use super::classifier::{ColumnClassifier, LineItem};
use super::codes::CodeMatcher;
use super::identifiers::{InvoiceCodeLocator, WorkOrderLocator};
use super::lines::group_lines;
use super::numbers::{format_number, NumberStyle};
use crate::error::{NfxError, Result};
use crate::models::config::NfxConfig;
use crate::models::table::{Row, Table};
use crate::pdf::{PdfExtractor, PdfPage, TokenSource};

/// A document submitted for extraction.
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    /// Original filename; only used to look up the invoice code.
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Runs the extraction pipeline over whole documents.
///
/// Pages are processed strictly in order because the work-order code is
/// chosen across all of them. Documents share no mutable state, so one
/// extractor can serve several threads.
#[derive(Debug, Clone)]
pub struct DocumentExtractor<S = PdfExtractor> {
    source: S,
    classifier: ColumnClassifier,
    work_order: WorkOrderLocator,
    invoice_code: InvoiceCodeLocator,
}

impl DocumentExtractor<PdfExtractor> {
    /// Create an extractor with the built-in layout.
    pub fn new() -> Result<Self> {
        Self::from_config(&NfxConfig::default())
    }

    /// Create a PDF extractor for the given configuration.
    pub fn from_config(config: &NfxConfig) -> Result<Self> {
        Self::with_source(PdfExtractor::new(), config)
    }
}

impl<S: TokenSource> DocumentExtractor<S> {
    /// Create an extractor reading tokens from `source`.
    pub fn with_source(source: S, config: &NfxConfig) -> Result<Self> {
        let codes = CodeMatcher::new(&config.vocabulary)?;
        Ok(Self {
            source,
            classifier: ColumnClassifier::new(config.layout.clone(), codes),
            work_order: WorkOrderLocator::new(&config.work_order)?,
            invoice_code: InvoiceCodeLocator::new(&config.invoice_code)?,
        })
    }

    /// Extract the line-item table of one document.
    ///
    /// Fails only when the bytes cannot be decoded; a readable document
    /// without line items yields an empty table.
    pub fn extract_document(&self, bytes: &[u8], filename: &str) -> Result<Table> {
        let start = Instant::now();
        let pages = self
            .source
            .pages(bytes)
            .map_err(|e| NfxError::decode(filename, e))?;

        let table = self.extract_pages(&pages, filename);
        debug!(
            "{}: {} pages -> {} rows in {:?}",
            filename,
            pages.len(),
            table.len(),
            start.elapsed()
        );
        Ok(table)
    }

    /// Extract the line-item table from already tokenized pages.
    pub fn extract_pages(&self, pages: &[PdfPage], filename: &str) -> Table {
        let invoice_code = self.invoice_code.find(filename);
        let mut work_order = self.work_order.clone();
        let mut items: Vec<LineItem> = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            work_order.observe_page(index, &page.tokens);

            for line in group_lines(&page.tokens) {
                let item = self.classifier.classify_line(&line);
                if item.is_row() {
                    items.push(item);
                } else {
                    trace!("Dropping line {} on page {}", line.key, page.number);
                }
            }
        }

        let work_order = work_order.into_code();
        debug!(
            "{}: invoice code {:?}, work order {:?}, {} items",
            filename,
            invoice_code,
            work_order,
            items.len()
        );

        items
            .into_iter()
            .map(|item| build_row(item, &invoice_code, &work_order))
            .collect()
    }

    /// Extract every document and concatenate the results in input order.
    ///
    /// Stops at the first document that cannot be decoded.
    pub fn extract_batch(&self, documents: &[SourceDocument]) -> Result<Table> {
        let mut tables = Vec::with_capacity(documents.len());
        for document in documents {
            tables.push(self.extract_document(&document.bytes, &document.filename)?);
        }

        let table = aggregate(tables);
        info!(
            "Extracted {} rows from {} documents",
            table.len(),
            documents.len()
        );
        Ok(table)
    }
}

fn build_row(item: LineItem, invoice_code: &str, work_order: &str) -> Row {
    Row {
        invoice_code: invoice_code.to_string(),
        work_order: work_order.to_string(),
        code: item.code.unwrap_or_default(),
        description: item.description,
        quantity: format_number(item.amounts.quantity, NumberStyle::Compact),
        unit_price: format_number(item.amounts.unit_price, NumberStyle::Decimal),
        total_price: format_number(item.amounts.total_price, NumberStyle::Decimal),
    }
}

/// Concatenate per-document tables, skipping empty ones.
///
/// All-empty input yields an empty table with the full schema.
pub fn aggregate<I>(tables: I) -> Table
where
    I: IntoIterator<Item = Table>,
{
    let mut combined = Table::new();
    for table in tables {
        if table.is_empty() {
            continue;
        }
        combined.append(table);
    }
    combined
}

/// Extract one PDF with the built-in layout.
pub fn extract_document(bytes: &[u8], filename: &str) -> Result<Table> {
    DocumentExtractor::new()?.extract_document(bytes, filename)
}

/// Extract a batch of PDFs with the built-in layout.
pub fn extract_batch(documents: &[SourceDocument]) -> Result<Table> {
    DocumentExtractor::new()?.extract_batch(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::models::table::COLUMNS;
    use crate::pdf::{self, Token};
    use pretty_assertions::assert_eq;

    /// Token source reading pages serialized as JSON.
    struct JsonSource;

    impl TokenSource for JsonSource {
        fn pages(&self, data: &[u8]) -> pdf::Result<Vec<PdfPage>> {
            serde_json::from_slice(data).map_err(|e| PdfError::Parse(e.to_string()))
        }
    }

    fn extractor() -> DocumentExtractor<JsonSource> {
        DocumentExtractor::with_source(JsonSource, &NfxConfig::default()).unwrap()
    }

    fn page(number: u32, tokens: Vec<Token>) -> PdfPage {
        PdfPage {
            number,
            width: 595.0,
            height: 842.0,
            tokens,
        }
    }

    fn line(top: f64, items: &[(&str, f64)]) -> Vec<Token> {
        items
            .iter()
            .map(|(text, x0)| Token::new(*text, *x0, top, top + 8.0))
            .collect()
    }

    fn invoice_page() -> PdfPage {
        let mut tokens = Vec::new();
        // header noise
        tokens.extend(line(80.0, &[("CODIGO", 65.0), ("DESCRICAO", 110.0), ("QUANT.", 322.0)]));
        tokens.extend(line(
            120.0,
            &[("VR-10", 65.0), ("VIGA", 110.0), ("REFORCADA", 140.0), ("2", 325.0), ("10,50", 345.0)],
        ));
        tokens.extend(line(140.0, &[("PNS", 70.0), ("PAINEL?", 500.0), ("1.500,00", 420.0)]));
        tokens.extend(line(160.0, &[("DG-5", 65.0), ("SEM", 110.0), ("VALORES", 140.0)]));
        tokens.extend(line(180.0, &[("TRELICA", 110.0), ("3", 325.0), ("4,00", 345.0)]));
        tokens.extend(line(750.0, &[("54321", 30.0)]));
        page(1, tokens)
    }

    fn to_bytes(pages: &[PdfPage]) -> Vec<u8> {
        serde_json::to_vec(pages).unwrap()
    }

    #[test]
    fn test_extract_pages_builds_rows() {
        let table = extractor().extract_pages(&[invoice_page()], "NF 123456.pdf");

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0],
            Row {
                invoice_code: "123456".to_string(),
                work_order: "54321".to_string(),
                code: "VR-10".to_string(),
                description: "VIGA REFORCADA".to_string(),
                quantity: "2".to_string(),
                unit_price: "10,50".to_string(),
                total_price: "21,00".to_string(),
            }
        );
        // PAINEL? is classified as a code after PNS and takes the slot
        assert_eq!(table.rows[1].code, "PAINEL?");
        assert_eq!(table.rows[1].quantity, "");
        assert_eq!(table.rows[1].unit_price, "");
        assert_eq!(table.rows[1].total_price, "1.500,00");
    }

    #[test]
    fn test_work_order_selection_prefers_lowest_token() {
        let mut tokens = line(120.0, &[("VR", 65.0), ("1", 325.0)]);
        tokens.extend(line(710.0, &[("1111", 20.0)]));
        tokens.extend(line(780.0, &[("2222", 20.0)]));

        let table = extractor().extract_pages(&[page(1, tokens)], "x.pdf");
        assert_eq!(table.rows[0].work_order, "2222");
        assert_eq!(table.rows[0].invoice_code, "");
    }

    #[test]
    fn test_work_order_spans_pages() {
        let first = page(1, line(120.0, &[("VR", 65.0), ("1", 325.0)]));
        let second = page(2, line(760.0, &[("777777", 10.0)]));

        let table = extractor().extract_pages(&[first, second], "nota 2024.pdf");
        assert_eq!(table.rows[0].work_order, "777777");
        assert_eq!(table.rows[0].invoice_code, "2024");
    }

    #[test]
    fn test_work_order_from_first_page_with_candidate() {
        let mut first = line(120.0, &[("VR", 65.0), ("1", 325.0)]);
        first.extend(line(790.0, &[("1111", 20.0)]));
        let second = page(2, line(705.0, &[("2222", 20.0)]));

        let table = extractor().extract_pages(&[page(1, first), second], "x.pdf");
        assert_eq!(table.rows[0].work_order, "1111");
    }

    #[test]
    fn test_rows_follow_page_order() {
        let first = page(1, line(300.0, &[("VR-1", 65.0), ("1", 325.0)]));
        let second = page(2, line(100.0, &[("VR-2", 65.0), ("2", 325.0)]));

        let table = extractor().extract_pages(&[first, second], "");
        let codes: Vec<&str> = table.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["VR-1", "VR-2"]);
    }

    #[test]
    fn test_decode_error_names_the_file() {
        let err = extractor()
            .extract_document(b"not json", "broken 9999.pdf")
            .unwrap_err();
        assert!(matches!(err, NfxError::DocumentDecode { .. }));
        assert_eq!(err.filename(), Some("broken 9999.pdf"));
    }

    #[test]
    fn test_readable_document_without_items_is_empty() {
        let bytes = to_bytes(&[page(1, line(100.0, &[("OBSERVACOES", 110.0)]))]);
        let table = extractor().extract_document(&bytes, "a.pdf").unwrap();
        assert!(table.is_empty());

        let table = extractor().extract_document(b"[]", "b.pdf").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_batch_skips_empty_documents_in_order() {
        let a = SourceDocument::new("A 1000.pdf", to_bytes(&[invoice_page()]));
        let b = SourceDocument::new("B 2000.pdf", to_bytes(&[page(1, Vec::new())]));

        let table = extractor().extract_batch(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.invoice_code == "1000"));
        assert_eq!(table.rows[0].code, "VR-10");
        assert_eq!(table.rows[1].code, "PAINEL?");

        let table = extractor().extract_batch(&[b, a]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].code, "VR-10");
    }

    #[test]
    fn test_batch_propagates_decode_error() {
        let good = SourceDocument::new("ok.pdf", to_bytes(&[invoice_page()]));
        let bad = SourceDocument::new("bad.pdf", b"%PDF-garbage".to_vec());

        let err = extractor().extract_batch(&[good, bad]).unwrap_err();
        assert_eq!(err.filename(), Some("bad.pdf"));
    }

    #[test]
    fn test_aggregate_of_empty_tables_keeps_schema() {
        let table = aggregate(vec![Table::new(), Table::new()]);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &COLUMNS);
    }

    #[test]
    fn test_pdf_entry_point_rejects_garbage() {
        let err = extract_document(b"garbage", "nota 1234.pdf").unwrap_err();
        assert_eq!(err.filename(), Some("nota 1234.pdf"));
    }
}
