//! Error types for the nfx-core library.

use thiserror::Error;

/// Main error type for the nfx library.
#[derive(Error, Debug)]
pub enum NfxError {
    /// The document could not be opened or decoded at all.
    ///
    /// This is the only fatal condition of the extraction pipeline; every
    /// other irregularity degrades to absent values or dropped lines.
    #[error("failed to decode document {filename}: {reason}")]
    DocumentDecode { filename: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NfxError {
    /// Wrap a PDF error as a decode failure of `filename`.
    pub fn decode(filename: impl Into<String>, err: PdfError) -> Self {
        NfxError::DocumentDecode {
            filename: filename.into(),
            reason: err.to_string(),
        }
    }

    /// Filename of the offending document, for decode failures.
    pub fn filename(&self) -> Option<&str> {
        match self {
            NfxError::DocumentDecode { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract positioned text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,
}

/// Result type for the nfx library.
pub type Result<T> = std::result::Result<T, NfxError>;
