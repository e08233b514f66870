//! Product-code recognition.
//!
//! A token is a product code when it matches the compiled vocabulary pattern
//! or one of the family predicates. The predicates work on a normalized form
//! of the text (uppercase, common Portuguese accents folded) because the text
//! layer of the source PDFs is inconsistent about accents.

use regex::Regex;

use crate::error::{NfxError, Result};
use crate::models::config::VocabularyConfig;

/// Marker that always identifies a product code, anywhere in the token.
const PNS_MARKER: &str = "PNS";

/// Alternatives that do not depend on the vocabulary.
const FIXED_ALTERNATIVES: &str = r"\d+\s*PLACAS|\d+\s*PNS|PNS\S*";

/// Uppercase `text` and fold accented vowels and cedilla to ASCII.
pub fn normalize(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .map(|c| match c {
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Compiled product-code vocabulary.
#[derive(Debug, Clone)]
pub struct CodeMatcher {
    search: Regex,
    full: Regex,
    laje_painel: Vec<String>,
    pre_moldado: Vec<String>,
    ab_marker: String,
}

impl CodeMatcher {
    /// Compile the vocabulary into a matcher.
    pub fn new(vocabulary: &VocabularyConfig) -> Result<Self> {
        let keywords: Vec<String> = vocabulary
            .product_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| regex::escape(k.trim()))
            .collect();

        let pattern = if keywords.is_empty() {
            FIXED_ALTERNATIVES.to_string()
        } else {
            format!(
                r"\b(?:{})\b[-/]?\d{{0,6}}|{}",
                keywords.join("|"),
                FIXED_ALTERNATIVES
            )
        };

        let search = Regex::new(&format!("(?i){}", pattern))
            .map_err(|e| NfxError::Config(format!("invalid product vocabulary: {}", e)))?;
        let full = Regex::new(&format!("(?i)^(?:{})$", pattern))
            .map_err(|e| NfxError::Config(format!("invalid product vocabulary: {}", e)))?;

        let fold_all = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|m| normalize(m))
                .filter(|m| !m.is_empty())
                .collect()
        };

        Ok(Self {
            search,
            full,
            laje_painel: fold_all(&vocabulary.laje_painel_markers),
            pre_moldado: fold_all(&vocabulary.pre_moldado_markers),
            ab_marker: normalize(&vocabulary.ab_marker),
        })
    }

    /// Whether the vocabulary pattern occurs anywhere in `text`.
    pub fn contains_code(&self, text: &str) -> bool {
        self.search.is_match(text)
    }

    /// Whether the whole of `text` matches the vocabulary pattern.
    pub fn is_code(&self, text: &str) -> bool {
        self.full.is_match(text)
    }

    /// Whether `text` contains the PNS marker, ignoring case.
    pub fn has_pns(&self, text: &str) -> bool {
        text.to_uppercase().contains(PNS_MARKER)
    }

    /// Whether `text` belongs to the "laje/painel" family.
    pub fn is_laje_painel(&self, text: &str) -> bool {
        let folded = normalize(text);
        self.laje_painel.iter().any(|m| folded.contains(m.as_str()))
    }

    /// Whether `text` belongs to the "pre-moldado" family.
    pub fn is_pre_moldado(&self, text: &str) -> bool {
        let folded = normalize(text);
        self.pre_moldado.iter().any(|m| folded.contains(m.as_str()))
    }

    /// Whether `text` carries the standalone AB marker as one of its words.
    pub fn is_ab(&self, text: &str) -> bool {
        if self.ab_marker.is_empty() {
            return false;
        }
        normalize(text)
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == self.ab_marker)
    }

    /// Whether any family predicate recognizes `text`.
    pub fn is_family_code(&self, text: &str) -> bool {
        self.has_pns(text)
            || self.is_laje_painel(text)
            || self.is_pre_moldado(text)
            || self.is_ab(text)
    }
}
