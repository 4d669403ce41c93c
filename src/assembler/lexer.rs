//! Splits physical source lines into logical statements.
//!
//! A physical line is examined in order for: a `# @heap` header
//! directive, a `#` comment (stripped), and zero or more `;`-separated
//! statements. Each statement may open with a `label:` definition and
//! may carry a mnemonic plus one operand token.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a heap-size header directive, e.g. `# @heap 256`.
static HEAP_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s*@heap\b(?:\s+(\S+))?").unwrap());

/// One logical statement: an optional label definition and an optional
/// instruction body. Both may be present, as in `loop: JMP loop`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Stmt {
    pub label: Option<String>,
    pub body: Option<Body>,
}

/// The instruction part of a statement: a mnemonic (not yet checked
/// against the opcode table) and at most one operand token. Tokens past
/// the operand are dropped.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Body {
    pub mnemonic: String,
    pub operand: Option<String>,
}

/// What one physical line contributes to the program.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Line {
    /// A `# @heap` directive. `None` when the value is missing or not a
    /// number in 0..=65535; the caller reports that as a warning and
    /// keeps the previous heap size.
    Heap(Option<u16>),
    /// Zero or more statements. Blank and comment lines yield none.
    Stmts(Vec<Stmt>),
}

pub fn tokenize_line(raw: &str) -> Line {
    let trimmed = raw.trim();

    // The directive check runs before comment stripping, since the
    // directive itself starts with the comment marker.
    if let Some(caps) = HEAP_DIRECTIVE.captures(trimmed) {
        let value = caps.get(1).and_then(|m| m.as_str().parse::<u16>().ok());
        return Line::Heap(value);
    }

    // Everything after the comment marker is discarded.
    let code = trimmed.split('#').next().unwrap_or("");

    Line::Stmts(code.split(';').filter_map(tokenize_stmt).collect())
}

/// Decomposes one `;`-delimited piece into a statement, or `None` if it
/// is empty.
fn tokenize_stmt(text: &str) -> Option<Stmt> {
    let mut text = text.trim();
    if text.is_empty() {
        return None;
    }

    // A label is everything before the first colon.
    let mut label = None;
    if let Some(idx) = text.find(':') {
        label = Some(text[..idx].trim().to_owned());
        text = text[idx + 1..].trim();
    }

    let mut tokens = text.split_whitespace();
    let body = tokens.next().map(|mnemonic| Body {
        mnemonic: mnemonic.to_owned(),
        operand: tokens.next().map(str::to_owned),
    });

    Some(Stmt { label, body })
}

/// Parses an operand literal: `0x`/`0X` hexadecimal, a quoted single
/// character, or decimal, tried in that order. Values up to 32 bits are
/// accepted here; emission truncates them to 16.
pub fn parse_literal(token: &str) -> Option<u32> {
    if token.starts_with("0x") || token.starts_with("0X") {
        return u32::from_str_radix(&token[2..], 16).ok();
    }

    // A character literal is exactly quote, one character, quote. There
    // are no escape sequences: `'\n'` is four characters and falls
    // through to the decimal parse, which rejects it.
    let chars: Vec<char> = token.chars().collect();
    if chars.len() == 3 && chars[0] == '\'' && chars[2] == '\'' {
        return Some(chars[1] as u32);
    }

    u32::from_str_radix(token, 10).ok()
}
