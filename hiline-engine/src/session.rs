//! Document sessions
//!
//!     A [Session] is the per-document side of tokenizing: it owns the lines of one
//!     document and remembers, for every line, the state it was tokenized from and what
//!     came out. The rule table stays shared and untouched.
//!
//! Incremental Updates
//!
//!     Edits only mark the first affected row as stale. When tokens are requested, lines
//!     are re-tokenized from there on, but a cached line is reused as soon as the state
//!     flowing into it equals the state it was last tokenized from. Typing inside a line
//!     therefore usually costs one line, while opening a comment re-tokenizes everything
//!     below it until the comment closes.

use crate::table::RuleTable;
use crate::tokenizer::{LineState, LineTokenizer, Token, TokenizedLine};
use std::ops::Range;

#[derive(Debug, Clone)]
struct Cached {
    start: LineState,
    result: TokenizedLine,
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    cached: Option<Cached>,
}

impl Line {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cached: None,
        }
    }
}

/// Lines of one document plus their cached tokenization.
#[derive(Debug)]
pub struct Session<'t, T: LineTokenizer + ?Sized = RuleTable> {
    tokenizer: &'t T,
    lines: Vec<Line>,
    // rows before this one hold valid results
    first_stale: usize,
}

impl<'t, T: LineTokenizer + ?Sized> Session<'t, T> {
    pub fn new(tokenizer: &'t T) -> Self {
        Self {
            tokenizer,
            lines: Vec::new(),
            first_stale: 0,
        }
    }

    pub fn with_text(tokenizer: &'t T, text: &str) -> Self {
        let mut session = Self::new(tokenizer);
        session.set_text(text);
        session
    }

    /// Replace the whole document. Lines split on `\n`; a trailing `\r` is dropped.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text
            .split('\n')
            .map(|l| Line::new(l.strip_suffix('\r').unwrap_or(l)))
            .collect();
        self.first_stale = 0;
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|l| l.text.as_str())
    }

    /// Replace the text of `row`.
    ///
    /// Panics if `row` is out of bounds.
    pub fn set_line(&mut self, row: usize, text: impl Into<String>) {
        self.lines[row] = Line::new(text);
        self.mark_stale(row);
    }

    /// Insert lines before `row` (`row == line_count()` appends).
    ///
    /// Panics if `row > line_count()`.
    pub fn insert_lines<I, S>(&mut self, row: usize, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines
            .splice(row..row, lines.into_iter().map(Line::new));
        self.mark_stale(row);
    }

    /// Remove a range of rows.
    ///
    /// Panics if the range is out of bounds.
    pub fn remove_lines(&mut self, rows: Range<usize>) {
        let start = rows.start;
        self.lines.drain(rows);
        self.mark_stale(start);
    }

    /// Make every row up to and including `through` current. Returns how many lines had
    /// to be tokenized again.
    pub fn refresh(&mut self, through: usize) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let through = through.min(self.lines.len() - 1);
        if through < self.first_stale {
            return 0;
        }

        let tokenizer = self.tokenizer;
        let mut state = match self.first_stale.checked_sub(1) {
            Some(prev) => self.lines[prev]
                .cached
                .as_ref()
                .map(|c| c.result.end_state.clone())
                .unwrap_or_else(|| tokenizer.initial_state()),
            None => tokenizer.initial_state(),
        };

        let mut retokenized = 0;
        for line in &mut self.lines[self.first_stale..=through] {
            let cached = match line.cached.take() {
                Some(cached) if cached.start == state => cached,
                _ => {
                    retokenized += 1;
                    let result = tokenizer.tokenize_line(&line.text, &state);
                    Cached {
                        start: state,
                        result,
                    }
                }
            };
            state = cached.result.end_state.clone();
            line.cached = Some(cached);
        }

        log::trace!(
            "refreshed rows {}..={}, {} re-tokenized",
            self.first_stale,
            through,
            retokenized
        );
        self.first_stale = through + 1;
        retokenized
    }

    pub fn line_result(&mut self, row: usize) -> Option<&TokenizedLine> {
        if row >= self.lines.len() {
            return None;
        }
        self.refresh(row);
        self.lines[row].cached.as_ref().map(|c| &c.result)
    }

    pub fn tokens(&mut self, row: usize) -> Option<&[Token]> {
        self.line_result(row).map(|r| r.tokens.as_slice())
    }

    pub fn end_state(&mut self, row: usize) -> Option<&LineState> {
        self.line_result(row).map(|r| &r.end_state)
    }

    /// Tokenize the whole document and return every line's result.
    pub fn tokenize_all(&mut self) -> Vec<&TokenizedLine> {
        if let Some(last) = self.lines.len().checked_sub(1) {
            self.refresh(last);
        }
        self.lines
            .iter()
            .filter_map(|l| l.cached.as_ref().map(|c| &c.result))
            .collect()
    }

    fn mark_stale(&mut self, row: usize) {
        self.first_stale = self.first_stale.min(row);
    }
}
