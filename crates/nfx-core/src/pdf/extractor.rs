//! Positioned word extraction using pdf-extract.

use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, trace};

use super::{PdfPage, Result, Token, TokenSource};
use crate::error::PdfError;

/// Horizontal gap, in user units, that still joins two glyphs into one word.
pub const DEFAULT_X_TOLERANCE: f64 = 3.0;

/// Share of the font size that hangs below the baseline.
const DESCENT_RATIO: f64 = 0.2;

/// PDF token extractor built on the pdf-extract content processor.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    x_tolerance: f64,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            x_tolerance: DEFAULT_X_TOLERANCE,
        }
    }

    /// Set the horizontal gap tolerance used when assembling words.
    pub fn with_x_tolerance(mut self, tolerance: f64) -> Self {
        self.x_tolerance = tolerance;
        self
    }

    fn load(&self, data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for PdfExtractor {
    fn pages(&self, data: &[u8]) -> Result<Vec<PdfPage>> {
        let doc = self.load(data)?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            debug!("PDF has no pages");
            return Ok(Vec::new());
        }

        let mut collector = TokenCollector::new(self.x_tolerance);

        // pdf_extract panics on some malformed content streams
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::output_doc(&doc, &mut collector)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                return Err(PdfError::TextExtraction(
                    "text layer processing panicked (malformed PDF)".to_string(),
                ))
            }
        }

        let pages = collector.finish();
        debug!(
            "Extracted {} tokens from {} pages",
            pages.iter().map(|p| p.tokens.len()).sum::<usize>(),
            pages.len()
        );
        Ok(pages)
    }
}

/// Word being assembled from consecutive glyphs.
#[derive(Debug)]
struct PendingWord {
    text: String,
    x0: f64,
    x1: f64,
    baseline: f64,
    size: f64,
}

impl PendingWord {
    fn into_token(self) -> Token {
        let bottom = self.baseline + self.size * DESCENT_RATIO;
        Token {
            text: self.text,
            x0: self.x0,
            x1: self.x1,
            top: bottom - self.size,
            bottom,
        }
    }
}

/// `OutputDev` that turns glyph callbacks into word tokens per page.
struct TokenCollector {
    x_tolerance: f64,
    pages: Vec<PdfPage>,
    current: Option<PdfPage>,
    page_top: f64,
    word: Option<PendingWord>,
}

impl TokenCollector {
    fn new(x_tolerance: f64) -> Self {
        Self {
            x_tolerance,
            pages: Vec::new(),
            current: None,
            page_top: 0.0,
            word: None,
        }
    }

    fn flush_word(&mut self) {
        if let Some(word) = self.word.take() {
            if let Some(page) = self.current.as_mut() {
                page.tokens.push(word.into_token());
            }
        }
    }

    fn flush_page(&mut self) {
        self.flush_word();
        if let Some(page) = self.current.take() {
            trace!("Page {}: {} tokens", page.number, page.tokens.len());
            self.pages.push(page);
        }
    }

    fn finish(mut self) -> Vec<PdfPage> {
        self.flush_page();
        self.pages
    }

    /// Whether a glyph at (`x`, `baseline`) continues the pending word.
    fn continues_word(&self, x: f64, baseline: f64, size: f64) -> bool {
        match &self.word {
            Some(word) => {
                (baseline - word.baseline).abs() <= size * 0.5
                    && x <= word.x1 + self.x_tolerance
                    && x >= word.x1 - size
            }
            None => false,
        }
    }
}

impl OutputDev for TokenCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.flush_page();
        self.page_top = media_box.ury;
        self.current = Some(PdfPage {
            number: page_num,
            width: media_box.urx - media_box.llx,
            height: media_box.ury - media_box.lly,
            tokens: Vec::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_page();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        glyph: &str,
    ) -> std::result::Result<(), OutputError> {
        // Side of the square with the same area as the transformed font box
        let size_x = font_size * (trm.m11 + trm.m21);
        let size_y = font_size * (trm.m12 + trm.m22);
        let size = (size_x * size_y).abs().sqrt();

        let x = trm.m31;
        let baseline = self.page_top - trm.m32;

        if glyph.trim().is_empty() {
            self.flush_word();
            return Ok(());
        }

        if !self.continues_word(x, baseline, size) {
            self.flush_word();
            self.word = Some(PendingWord {
                text: String::new(),
                x0: x,
                x1: x,
                baseline,
                size,
            });
        }

        if let Some(word) = self.word.as_mut() {
            word.text.push_str(glyph);
            word.x1 = word.x1.max(x + width * size);
            word.size = word.size.max(size);
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph_at(x: f64, y: f64) -> Transform {
        Transform::row_major(1.0, 0.0, 0.0, 1.0, x, y)
    }

    fn media_box() -> MediaBox {
        MediaBox {
            llx: 0.0,
            lly: 0.0,
            urx: 595.0,
            ury: 842.0,
        }
    }

    /// One-page Helvetica PDF whose content stream is `content`.
    fn single_page_pdf(content: &str) -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
             /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    /// An invoice line on baseline y=700 and a footer code on y=80, 10pt.
    fn invoice_pdf() -> Vec<u8> {
        single_page_pdf(
            "BT /F1 10 Tf 70 700 Td (VR-10) Tj ET\n\
             BT /F1 10 Tf 325 700 Td (2) Tj ET\n\
             BT /F1 10 Tf 345 700 Td (10,50) Tj ET\n\
             BT /F1 10 Tf 30 80 Td (54321) Tj ET",
        )
    }

    #[test]
    fn test_extracts_tokens_from_pdf() {
        let pages = PdfExtractor::new().pages(&invoice_pdf()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].height, 842.0);

        let texts: Vec<&str> = pages[0].tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["VR-10", "2", "10,50", "54321"]);

        // baseline 842 - 700 = 142, descent 2, font size 10
        let code = &pages[0].tokens[0];
        assert!((code.x0 - 70.0).abs() < 1e-6);
        assert!((code.bottom - 144.0).abs() < 1e-6);
        assert!((code.top - 134.0).abs() < 1e-6);
        assert!(code.x1 > code.x0);

        let footer = &pages[0].tokens[3];
        assert!((footer.x0 - 30.0).abs() < 1e-6);
        assert!(footer.top > 700.0);
    }

    #[test]
    fn test_pdf_runs_through_document_extraction() {
        let table = crate::DocumentExtractor::new()
            .unwrap()
            .extract_document(&invoice_pdf(), "NF 1234.pdf")
            .unwrap();

        assert_eq!(table.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.invoice_code, "1234");
        assert_eq!(row.work_order, "54321");
        assert_eq!(row.code, "VR-10");
        assert_eq!(row.description, "");
        assert_eq!(row.quantity, "2");
        assert_eq!(row.unit_price, "10,50");
        assert_eq!(row.total_price, "21,00");
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let extractor = PdfExtractor::new();
        let result = extractor.pages(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_collector_builds_words() {
        let mut collector = TokenCollector::new(DEFAULT_X_TOLERANCE);
        collector.begin_page(1, &media_box(), None).unwrap();

        // "VR 12" at 10pt on baseline y=742 (top-down: 100)
        for (i, c) in ["V", "R"].iter().enumerate() {
            collector
                .output_character(&glyph_at(70.0 + i as f64 * 6.0, 742.0), 0.6, 0.0, 10.0, c)
                .unwrap();
        }
        collector
            .output_character(&glyph_at(82.0, 742.0), 0.25, 0.0, 10.0, " ")
            .unwrap();
        for (i, c) in ["1", "2"].iter().enumerate() {
            collector
                .output_character(&glyph_at(322.0 + i as f64 * 5.0, 742.0), 0.5, 0.0, 10.0, c)
                .unwrap();
        }
        collector.end_page().unwrap();

        let pages = collector.finish();
        assert_eq!(pages.len(), 1);
        let tokens = &pages[0].tokens;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "VR");
        assert_eq!(tokens[0].x0, 70.0);
        assert_eq!(tokens[1].text, "12");
        assert_eq!(tokens[1].x0, 322.0);
        assert!((tokens[0].bottom - 102.0).abs() < 1e-9);
        assert!((tokens[0].top - 92.0).abs() < 1e-9);
    }

    #[test]
    fn test_collector_splits_on_gap() {
        let mut collector = TokenCollector::new(DEFAULT_X_TOLERANCE);
        collector.begin_page(1, &media_box(), None).unwrap();
        collector
            .output_character(&glyph_at(100.0, 500.0), 0.5, 0.0, 10.0, "A")
            .unwrap();
        collector
            .output_character(&glyph_at(120.0, 500.0), 0.5, 0.0, 10.0, "B")
            .unwrap();

        let pages = collector.finish();
        let texts: Vec<&str> = pages[0].tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B"]);
    }
}
