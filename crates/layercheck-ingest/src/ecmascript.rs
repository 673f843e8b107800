//! EcmaScript-family extractor (JavaScript, TypeScript, JSX variants).
//!
//! Line-oriented recognition of `import`/`export`/`require` statements,
//! call chains, and empty `catch` blocks. Strings and comments are blanked
//! before scanning so literals cannot produce false statements or call
//! sites; specifier text is then read back from the raw line.

use std::path::Path;

use crate::extract::{line_starts, locate, scan_call_chains, SourceExtractor};
use crate::facts::{CallSite, FileFacts, ImportRef, Language};

/// Keywords that look like calls when followed by `(` but are not.
const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "typeof", "else", "do", "in",
    "of", "new", "throw", "await", "yield", "case", "delete", "void", "instanceof", "super",
];

/// Extracts facts from JavaScript/TypeScript source.
pub struct EcmaScriptExtractor;

impl SourceExtractor for EcmaScriptExtractor {
    fn language(&self) -> Language {
        Language::EcmaScript
    }

    fn extract(&self, path: &Path, source: &str, deny_calls: &[String]) -> FileFacts {
        let mut facts = FileFacts::new(path, Language::EcmaScript);
        let clean = sanitize(source);
        let starts = line_starts(source);

        for (idx, (raw, stripped)) in source.lines().zip(clean.lines()).enumerate() {
            let lineno = idx + 1;

            if let Some(import) = parse_import_line(raw, stripped, lineno) {
                facts.imports.push(import);
            }
            if let Some(import) = parse_require_line(raw, stripped, lineno) {
                facts.imports.push(import);
            }
            facts.exports.extend(parse_export_line(stripped));

            for (column, chain) in scan_call_chains(stripped, KEYWORDS) {
                if is_declaration_site(stripped, column, &chain) {
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
        }

        facts.empty_handler_sites = find_empty_catches(&clean, &starts);
        facts
    }
}

/// Blanks string literals and comments, preserving byte length and
/// newlines. Each blanked character becomes one space per byte it
/// occupied, so an offset found on the sanitized text indexes the raw
/// text at the same character boundary even when a literal holds
/// multibyte characters.
fn sanitize(source: &str) -> String {
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '\'' | '"' | '`' => {
                    state = State::Str(c);
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    state = State::LineComment;
                    out.push(' ');
                }
                '/' if chars.peek() == Some(&'*') => {
                    state = State::BlockComment;
                    out.push(' ');
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
            State::Str(quote) => {
                if c == '\\' {
                    out.push(' ');
                    if let Some(escaped) = chars.next() {
                        if escaped == '\n' {
                            out.push('\n');
                        } else {
                            blank(&mut out, escaped);
                        }
                    }
                } else if c == quote {
                    state = State::Code;
                    out.push(c);
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
        }
    }

    out
}

/// One space per byte of the blanked character.
fn blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}

/// First single- or double-quoted literal on the line.
fn first_quoted(s: &str) -> Option<&str> {
    let open = s.find(|c| c == '\'' || c == '"')?;
    let quote = s[open..].chars().next()?;
    let rest = &s[open + 1..];
    let close = rest.find(quote)?;
    Some(&rest[..close])
}

/// Parses `import`-statement lines, including `export ... from` re-exports.
///
/// Statement shape is detected on the sanitized line; the specifier text
/// is read from the raw line at the same offsets.
fn parse_import_line(raw: &str, stripped: &str, line: usize) -> Option<ImportRef> {
    let trimmed = stripped.trim_start();
    let column = stripped.len() - trimmed.len();

    let is_import = trimmed.starts_with("import ")
        || trimmed.starts_with("import{")
        || trimmed.starts_with("import'")
        || trimmed.starts_with("import\"");
    let is_reexport = trimmed.starts_with("export ") && trimmed.contains(" from ");
    if !is_import && !is_reexport {
        return None;
    }

    let specifier = first_quoted(&raw[column..])?.to_string();
    let clause = match trimmed.find(" from ") {
        Some(at) => &trimmed[..at],
        // `import 'side-effect'` has no clause.
        None => "",
    };

    Some(ImportRef {
        specifier,
        line,
        column,
        symbols: parse_symbol_clause(clause),
    })
}

/// Symbols named between `import`/`export` and `from`.
fn parse_symbol_clause(clause: &str) -> Vec<String> {
    let mut symbols = Vec::new();

    if let (Some(open), Some(close)) = (clause.find('{'), clause.rfind('}')) {
        if open < close {
            for entry in clause[open + 1..close].split(',') {
                let name = entry.trim().trim_start_matches("type ").trim();
                // `a as b` imports `a`; the local alias is irrelevant here.
                let name = name.split_whitespace().next().unwrap_or("");
                if !name.is_empty() {
                    symbols.push(name.to_string());
                }
            }
        }
    }

    let head = clause
        .trim_start()
        .trim_start_matches("import")
        .trim_start_matches("export")
        .trim_start();
    let head = head.trim_start_matches("type ").trim_start();
    if let Some(star) = head.strip_prefix("* as ") {
        if let Some(name) = star.split_whitespace().next() {
            symbols.push(name.to_string());
        }
    } else if let Some(first) = head.split(|c: char| c == ',' || c.is_whitespace()).next() {
        if !first.is_empty() && !first.starts_with('{') && first != "*" {
            symbols.push(first.to_string());
        }
    }

    symbols
}

/// Parses `require('x')` lines, CommonJS style.
fn parse_require_line(raw: &str, stripped: &str, line: usize) -> Option<ImportRef> {
    let at = stripped.find("require(")?;
    let specifier = first_quoted(&raw[at..])?.to_string();
    let symbols = match (stripped.find('{'), stripped.find('}')) {
        (Some(open), Some(close)) if open < close && close < at => stripped[open + 1..close]
            .split(',')
            .map(|s| s.trim().split_whitespace().next().unwrap_or("").to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Some(ImportRef {
        specifier,
        line,
        column: at,
        symbols,
    })
}

/// Declaration keywords a symbol name can follow in an `export` statement.
const EXPORT_DECLS: &[&str] = &[
    "async function*",
    "async function",
    "function*",
    "function",
    "abstract class",
    "class",
    "const",
    "let",
    "var",
    "interface",
    "type",
    "enum",
    "namespace",
];

/// Exported symbol names declared on this line.
fn parse_export_line(stripped: &str) -> Vec<String> {
    let trimmed = stripped.trim_start();

    if trimmed.contains("module.exports") {
        return vec!["default".to_string()];
    }

    let Some(rest) = trimmed.strip_prefix("export ") else {
        return Vec::new();
    };
    let rest = rest.trim_start();

    if rest.starts_with("default") {
        return vec!["default".to_string()];
    }

    if rest.starts_with('{') {
        if let (Some(open), Some(close)) = (rest.find('{'), rest.find('}')) {
            return rest[open + 1..close]
                .split(',')
                .filter_map(|entry| {
                    // `a as b` exports `b`.
                    let entry = entry.trim();
                    let name = match entry.rsplit_once(" as ") {
                        Some((_, alias)) => alias,
                        None => entry,
                    };
                    let name = name.trim();
                    (!name.is_empty()).then(|| name.to_string())
                })
                .collect();
        }
        return Vec::new();
    }

    for decl in EXPORT_DECLS {
        if let Some(after) = rest.strip_prefix(decl) {
            if !after.starts_with(char::is_whitespace) {
                continue;
            }
            if let Some(name) = after
                .trim_start()
                .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .next()
            {
                if !name.is_empty() {
                    return vec![name.to_string()];
                }
            }
        }
    }

    Vec::new()
}

/// Distinguishes declarations from calls.
///
/// `save(order: Order): Promise<void>` and `foo() {` are declarations:
/// the matched parens are followed by `:` or `{`, or the chain follows a
/// `function`/`get`/`set` keyword. A real call statement never is.
fn is_declaration_site(line: &str, column: usize, chain: &str) -> bool {
    let prefix = &line[..column];
    if let Some(last) = prefix.split_whitespace().last() {
        if matches!(last, "function" | "function*" | "get" | "set") {
            return true;
        }
    }

    let after = &line[column + chain.len()..];
    let Some(open) = after.find('(') else {
        return false;
    };
    let bytes = after.as_bytes();
    let mut depth = 0usize;
    let mut close = None;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == b'(' {
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                close = Some(i);
                break;
            }
        }
    }
    let Some(close) = close else {
        return false;
    };
    matches!(
        after[close + 1..].trim_start().as_bytes().first(),
        Some(b':' | b'{')
    )
}

/// Finds `catch` blocks whose body contains no statements.
fn find_empty_catches(clean: &str, starts: &[usize]) -> Vec<CallSite> {
    let bytes = clean.as_bytes();
    let mut sites = Vec::new();
    let mut search = 0;

    while let Some(found) = clean[search..].find("catch") {
        let at = search + found;
        search = at + "catch".len();

        let before_ok = at == 0 || !is_word_byte(bytes[at - 1]);
        let after = at + "catch".len();
        let after_ok = after >= bytes.len() || !is_word_byte(bytes[after]);
        if !before_ok || !after_ok {
            continue;
        }

        let mut i = skip_ws(bytes, after);
        if i < bytes.len() && bytes[i] == b'(' {
            let Some(close) = matching(bytes, i, b'(', b')') else {
                continue;
            };
            i = skip_ws(bytes, close + 1);
        }
        if i >= bytes.len() || bytes[i] != b'{' {
            continue;
        }
        let Some(close) = matching(bytes, i, b'{', b'}') else {
            continue;
        };
        if clean[i + 1..close].trim().is_empty() {
            let (line, column) = locate(starts, at);
            sites.push(CallSite {
                line,
                column,
                callee: "catch".to_string(),
            });
        }
    }

    sites
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Index of the byte closing the bracket opened at `open`.
fn matching(bytes: &[u8], open: usize, open_b: u8, close_b: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_b {
            depth += 1;
        } else if b == close_b {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
