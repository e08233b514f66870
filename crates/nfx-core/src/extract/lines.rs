//! Grouping of page tokens into horizontal text lines.

use std::collections::BTreeMap;

use crate::pdf::Token;

/// Tokens sharing a rounded vertical center.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    /// Rounded vertical center shared by every token of the line.
    pub key: i64,
    /// Tokens in encounter order.
    pub tokens: Vec<&'a Token>,
}

/// Vertical key of a token: its center rounded half-to-even.
pub fn line_key(token: &Token) -> i64 {
    token.center_y().round_ties_even() as i64
}

/// Group the tokens of one page into lines, top of the page first.
///
/// Tokens keep their encounter order inside a line.
pub fn group_lines(tokens: &[Token]) -> Vec<Line<'_>> {
    let mut lines: BTreeMap<i64, Vec<&Token>> = BTreeMap::new();
    for token in tokens {
        lines.entry(line_key(token)).or_default().push(token);
    }

    lines
        .into_iter()
        .map(|(key, tokens)| Line { key, tokens })
        .collect()
}
