//! Language-agnostic extraction trait and shared scanning helpers.
//!
//! `SourceExtractor` is the extension point for adding a language.
//! Implementations are line-oriented and deliberately syntax-light: they
//! recognize import/export statements, call chains, and empty error
//! handlers, nothing more.

use crate::facts::{FileFacts, Language};
use std::path::Path;

/// Trait for language-specific fact extraction.
///
/// Implementations must be pure: same bytes in, same facts out, no side
/// effects. That is what makes unlimited ingestion parallelism safe.
pub trait SourceExtractor: Send + Sync {
    /// Language this extractor handles.
    fn language(&self) -> Language;

    /// Extract facts from source text.
    ///
    /// `deny_calls` is the configured I/O deny-list for this language; a
    /// call chain containing any of the patterns is recorded as an I/O
    /// call site.
    fn extract(&self, path: &Path, source: &str, deny_calls: &[String]) -> FileFacts;
}

/// A call chain found on one line: `(column, dotted chain)`.
pub(crate) type CallChain = (usize, String);

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Scans one sanitized line for dotted identifier chains followed by `(`.
///
/// Single-segment chains matching a keyword (`if`, `while`, ...) are not
/// call sites. The line must already have strings and comments blanked,
/// so false positives inside literals cannot occur.
pub(crate) fn scan_call_chains(line: &str, keywords: &[&str]) -> Vec<CallChain> {
    let chars: Vec<char> = line.chars().collect();
    let mut chains = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !is_ident_start(chars[i]) || (i > 0 && (is_ident_char(chars[i - 1]) || chars[i - 1] == '.'))
        {
            i += 1;
            continue;
        }

        let start = i;
        let mut segments = 1usize;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        while i < chars.len() && chars[i] == '.' {
            let dot = i;
            i += 1;
            if i < chars.len() && is_ident_start(chars[i]) {
                segments += 1;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
            } else {
                i = dot;
                break;
            }
        }

        let chain: String = chars[start..i].iter().collect();
        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        let is_call = j < chars.len() && chars[j] == '(';
        let is_keyword = segments == 1 && keywords.contains(&chain.as_str());
        if is_call && !is_keyword {
            chains.push((byte_col(line, start), chain));
        }
    }

    chains
}

/// Byte column of a char index within a line.
fn byte_col(line: &str, char_idx: usize) -> usize {
    line.char_indices()
        .nth(char_idx)
        .map_or(line.len(), |(byte, _)| byte)
}

/// Byte offsets of every line start, for offset-to-line mapping.
pub(crate) fn line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// 1-indexed line and 0-indexed column of a byte offset.
pub(crate) fn locate(starts: &[usize], offset: usize) -> (usize, usize) {
    let line = match starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i - 1,
    };
    (line + 1, offset - starts[line])
}
