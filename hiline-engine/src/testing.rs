//! Testing utilities
//!
//!     Small helpers shared by the engine's unit tests, its integration tests and the
//!     grammar crates built on top of it.

use crate::tokenizer::{LineTokenizer, Token, TokenizedLine};

/// Shorthand token constructor.
pub fn tok(category: &str, value: &str) -> Token {
    Token::new(category, value)
}

/// Panics unless the tokens of `out` rebuild `line` exactly and none of them is empty.
pub fn assert_lossless(line: &str, out: &TokenizedLine) {
    assert_eq!(out.text(), line, "token values do not rebuild the line");
    if let Some(empty) = out.tokens.iter().find(|t| t.value.is_empty()) {
        panic!("empty token emitted: {empty}");
    }
}

/// Tokenize `lines` in order, threading end states, starting from the initial state.
pub fn tokenize_lines<T: LineTokenizer + ?Sized>(tokenizer: &T, lines: &[&str]) -> Vec<TokenizedLine> {
    let mut state = tokenizer.initial_state();
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let result = tokenizer.tokenize_line(line, &state);
        state = result.end_state.clone();
        out.push(result);
    }
    out
}

/// One token per line as `category: "value"`, followed by the end state. Handy for
/// inline snapshots.
pub fn render(out: &TokenizedLine) -> String {
    let mut rendered = String::new();
    for token in &out.tokens {
        rendered.push_str(&format!("{}: {:?}\n", token.category, token.value));
    }
    rendered.push_str(&format!("=> {}", out.end_state));
    rendered
}

/// `(category, value)` pairs, for compact assertions.
pub fn pairs(out: &TokenizedLine) -> Vec<(&str, &str)> {
    out.tokens
        .iter()
        .map(|t| (t.category.as_str(), t.value.as_str()))
        .collect()
}

/// State the line ends in, for tests that only care about transitions.
pub fn end_state_name(out: &TokenizedLine) -> &str {
    out.end_state.current()
}
