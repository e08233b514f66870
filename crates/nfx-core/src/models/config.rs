//! Configuration structures for the extraction pipeline.
//!
//! The defaults describe the single invoice layout the heuristics were tuned
//! on. Supporting another layout means shipping another config file, not
//! touching the classifier.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NfxError, Result};

/// Main configuration for the nfx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfxConfig {
    /// Horizontal column bands of the invoice table.
    pub layout: LayoutConfig,

    /// Product-code vocabulary and family markers.
    pub vocabulary: VocabularyConfig,

    /// Positional lookup of the work-order code.
    pub work_order: WorkOrderConfig,

    /// Filename lookup of the invoice code.
    pub invoice_code: InvoiceCodeConfig,
}

/// A horizontal coordinate band on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBand {
    /// Left bound.
    pub min: f64,
    /// Right bound.
    pub max: f64,
    /// Whether the bounds themselves belong to the band.
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,
}

fn default_inclusive() -> bool {
    true
}

impl ColumnBand {
    /// Band including both bounds.
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Self { min, max, inclusive: true }
    }

    /// Band excluding both bounds.
    pub const fn exclusive(min: f64, max: f64) -> Self {
        Self { min, max, inclusive: false }
    }

    /// Check whether `x` falls inside the band.
    pub fn contains(&self, x: f64) -> bool {
        if self.inclusive {
            self.min <= x && x <= self.max
        } else {
            self.min < x && x < self.max
        }
    }
}

/// Column layout of the line-item table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Product code column.
    pub code: ColumnBand,

    /// Quantity column.
    pub quantity: ColumnBand,

    /// Unit price column.
    pub unit_price: ColumnBand,

    /// Total price column.
    pub total_price: ColumnBand,

    /// Description column, between code and quantity.
    pub description: ColumnBand,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            code: ColumnBand::inclusive(60.0, 100.0),
            quantity: ColumnBand::inclusive(320.0, 330.0),
            unit_price: ColumnBand::inclusive(340.0, 370.0),
            total_price: ColumnBand::inclusive(394.0, 460.0),
            description: ColumnBand::exclusive(100.0, 300.0),
        }
    }
}

/// Product-code vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Product family prefixes, in alternation order.
    pub product_keywords: Vec<String>,

    /// Substrings identifying the "laje/painel" family.
    pub laje_painel_markers: Vec<String>,

    /// Substrings identifying the "pre-moldado" family.
    pub pre_moldado_markers: Vec<String>,

    /// Standalone marker word.
    pub ab_marker: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            product_keywords: strings(&[
                "VR",
                "DG",
                "CS",
                "SC",
                "DT",
                "PNS",
                "BORDA",
                "BT",
                "FC",
                "ZD",
                "PL",
                "FG",
                "PLACAS",
                "SAC",
                "EP",
                "PT",
                "BORDA CONCRETADA",
                "PNSTR8X35",
                "LAJE PAINEL",
                "PAINEL",
                "PRE-MOLDADO FORMA",
                "PRE LAJE - AÇO",
                "PRE MOLDADO - AÇO",
                "AB",
            ]),
            laje_painel_markers: strings(&["LAJE PAINEL", "LAJE", "PAINEL"]),
            pre_moldado_markers: strings(&[
                "PRE-MOLDADO FORMA",
                "PRE LAJE - AÇO",
                "PRE MOLDADO - AÇO",
            ]),
            ab_marker: "AB".to_string(),
        }
    }
}

/// Work-order code lookup parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkOrderConfig {
    /// Tokens must start strictly left of this coordinate.
    pub max_x0: f64,

    /// Tokens must sit strictly below this vertical position.
    pub min_top: f64,

    /// Minimum number of digits.
    pub min_digits: usize,

    /// Maximum number of digits.
    pub max_digits: usize,
}

impl Default for WorkOrderConfig {
    fn default() -> Self {
        Self {
            max_x0: 60.0,
            min_top: 700.0,
            min_digits: 4,
            max_digits: 6,
        }
    }
}

/// Invoice code lookup parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceCodeConfig {
    /// Minimum length of the digit run taken from the filename.
    pub min_digits: usize,
}

impl Default for InvoiceCodeConfig {
    fn default() -> Self {
        Self { min_digits: 4 }
    }
}

impl NfxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| NfxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| NfxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
