//! Python extractor.
//!
//! Recognizes `import`/`from ... import` statements (absolute and
//! relative), top-level `def`/`class` declarations as exports, call
//! chains, and `except` handlers whose body is only `pass`/`...`.
//!
//! Dotted module specifiers are normalized to path form (`a.b` becomes
//! `a/b`, `from .sibling` becomes `./sibling`) so the graph builder can
//! resolve them with the same rules as every other language.

use std::path::Path;

use crate::extract::{scan_call_chains, SourceExtractor};
use crate::facts::{CallSite, FileFacts, ImportRef, Language};

/// Keywords that look like calls when followed by `(` but are not.
const KEYWORDS: &[&str] = &[
    "if", "elif", "while", "for", "with", "return", "yield", "assert", "del", "not", "and", "or",
    "in", "is", "lambda", "except", "raise", "def", "class",
];

/// Extracts facts from Python source.
pub struct PythonExtractor;

impl SourceExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, path: &Path, source: &str, deny_calls: &[String]) -> FileFacts {
        let mut facts = FileFacts::new(path, Language::Python);
        let clean = sanitize(source);
        let clean_lines: Vec<&str> = clean.lines().collect();

        for (idx, (raw, stripped)) in source.lines().zip(clean.lines()).enumerate() {
            let lineno = idx + 1;

            facts.imports.extend(parse_import_line(stripped, lineno));
            facts.exports.extend(parse_export_line(raw));

            for (column, chain) in scan_call_chains(stripped, KEYWORDS) {
                if is_declaration_site(stripped, column) {
                    continue;
                }
                facts.call_site_count += 1;
                if deny_calls.iter().any(|pattern| chain.contains(pattern)) {
                    facts.io_call_sites.push(CallSite {
                        line: lineno,
                        column,
                        callee: chain,
                    });
                }
            }

            if let Some(site) = empty_except_at(&clean_lines, idx) {
                facts.empty_handler_sites.push(site);
            }
        }

        facts
    }
}

/// Blanks `#` comments and string literals, preserving byte length and
/// newlines (one space per byte of each blanked character, so sanitized
/// offsets stay valid in the raw text). Triple-quoted strings are
/// handled by delimiter matching.
fn sanitize(source: &str) -> String {
    enum State {
        Code,
        Comment,
        /// Inside a string; the delimiter is 1 or 3 quote chars.
        Str { quote: char, triple: bool },
    }

    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Code => match c {
                '#' => {
                    state = State::Comment;
                    out.push(' ');
                }
                '\'' | '"' => {
                    let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                    out.push(c);
                    if triple {
                        out.push(c);
                        out.push(c);
                        i += 2;
                    }
                    state = State::Str { quote: c, triple };
                }
                _ => out.push(c),
            },
            State::Comment => {
                if c == '\n' {
                    state = State::Code;
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
            State::Str { quote, triple } => {
                let closes = if triple {
                    c == quote && chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)
                } else {
                    c == quote
                };
                if c == '\\' && !triple {
                    out.push(' ');
                    if i + 1 < chars.len() {
                        if chars[i + 1] == '\n' {
                            out.push('\n');
                        } else {
                            blank(&mut out, chars[i + 1]);
                        }
                        i += 1;
                    }
                } else if closes {
                    out.push(quote);
                    if triple {
                        out.push(quote);
                        out.push(quote);
                        i += 2;
                    }
                    state = State::Code;
                } else if c == '\n' {
                    if triple {
                        out.push('\n');
                    } else {
                        // Unterminated single-quoted string; resync.
                        out.push('\n');
                        state = State::Code;
                    }
                } else {
                    blank(&mut out, c);
                }
            }
        }
        i += 1;
    }

    out
}

/// One space per byte of the blanked character.
fn blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}

/// Converts a dotted module specifier to path form.
///
/// `a.b` -> `a/b`; `.sib` -> `./sib`; `..pkg.mod` -> `../pkg/mod`.
fn dotted_to_path(spec: &str) -> String {
    let dots = spec.chars().take_while(|&c| c == '.').count();
    let rest = spec[dots..].replace('.', "/");
    match dots {
        0 => rest,
        1 => format!("./{rest}"),
        n => {
            let ups = "../".repeat(n - 1);
            format!("{ups}{rest}")
        }
    }
}

/// Parses `import a.b, c` and `from a.b import x, y` lines.
///
/// `from . import sibling` yields one import per named sibling module.
fn parse_import_line(stripped: &str, line: usize) -> Vec<ImportRef> {
    let trimmed = stripped.trim_start();
    let column = stripped.len() - trimmed.len();

    if let Some(rest) = trimmed.strip_prefix("from ") {
        let Some((module, names)) = rest.split_once(" import ") else {
            return Vec::new();
        };
        let module = module.trim();
        let symbols: Vec<String> = names
            .split(',')
            .filter_map(|entry| {
                let name = entry.trim().split_whitespace().next()?;
                (!name.is_empty() && name != "(").then(|| name.to_string())
            })
            .collect();

        let bare_dots = !module.is_empty() && module.chars().all(|c| c == '.');
        if bare_dots {
            // `from . import order` imports the sibling module `order`.
            return symbols
                .iter()
                .map(|name| ImportRef {
                    specifier: dotted_to_path(&format!("{module}{name}")),
                    line,
                    column,
                    symbols: vec![name.clone()],
                })
                .collect();
        }

        return vec![ImportRef {
            specifier: dotted_to_path(module),
            line,
            column,
            symbols,
        }];
    }

    if let Some(rest) = trimmed.strip_prefix("import ") {
        return rest
            .split(',')
            .filter_map(|entry| {
                let module = entry.trim().split_whitespace().next()?;
                (!module.is_empty()).then(|| ImportRef {
                    specifier: dotted_to_path(module),
                    line,
                    column,
                    symbols: Vec::new(),
                })
            })
            .collect();
    }

    Vec::new()
}

/// Top-level `def`/`class` names are the module's exported symbols.
fn parse_export_line(raw: &str) -> Option<String> {
    let name_after = |prefix: &str| -> Option<String> {
        let rest = raw.strip_prefix(prefix)?;
        let name: String = rest
            .chars()
            .take_while(|&c| c.is_alphanumeric() || c == '_')
            .collect();
        (!name.is_empty() && !name.starts_with('_')).then_some(name)
    };

    name_after("def ")
        .or_else(|| name_after("async def "))
        .or_else(|| name_after("class "))
}

/// A chain directly after `def` is a declaration, not a call.
fn is_declaration_site(line: &str, column: usize) -> bool {
    let prefix = &line[..column];
    matches!(
        prefix.split_whitespace().last(),
        Some("def" | "class" | "lambda")
    )
}

/// Reports an empty handler when line `idx` opens an `except` block whose
/// body is only `pass` or `...`.
fn empty_except_at(clean_lines: &[&str], idx: usize) -> Option<CallSite> {
    let line = clean_lines[idx];
    let trimmed = line.trim_start();
    if !(trimmed == "except:"
        || (trimmed.starts_with("except ") || trimmed.starts_with("except("))
            && trimmed.trim_end().ends_with(':'))
    {
        return None;
    }

    let column = line.len() - trimmed.len();
    let mut body_lines = 0usize;

    for body in clean_lines.iter().skip(idx + 1) {
        let body_trimmed = body.trim();
        if body_trimmed.is_empty() {
            continue;
        }
        let indent = body.len() - body.trim_start().len();
        if indent <= column {
            break;
        }
        if body_trimmed != "pass" && body_trimmed != "..." {
            return None;
        }
        body_lines += 1;
    }

    (body_lines > 0).then_some(CallSite {
        line: idx + 1,
        column,
        callee: "except".to_string(),
    })
}
