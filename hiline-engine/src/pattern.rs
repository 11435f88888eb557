//! Pattern Compiler
//!
//!     Turns the textual pattern of a rule into a matcher that only ever matches starting
//!     exactly at a given offset of a line. The search is anchored, it never scans forward,
//!     but look-around assertions such as `\b` still see the characters before the offset.
//!
//! Capturing Groups
//!
//!     Patterns must not contain capturing groups. A state's rules are compiled together
//!     into one multi-pattern matcher ([StateMatcher]) that reports which rule won; user
//!     captures would add nothing to that and are rejected up front. Use `(?:...)`.
//!
//! Rule Order
//!
//!     The combined matcher uses leftmost-first semantics: when several rules match at
//!     the offset, the one declared first wins, regardless of match length. This is the
//!     same result as calling [Pattern::match_at] for each rule in order and stopping at
//!     the first hit.

use crate::error::PatternError;
use regex_automata::meta::Regex;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use std::fmt;

/// A single compiled rule pattern.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    case_insensitive: bool,
    regex: Regex,
    min_len: Option<usize>,
}

impl Pattern {
    pub fn new(source: &str, case_insensitive: bool) -> Result<Self, PatternError> {
        // Validate the bare source first so that wrapping cannot rebalance a broken pattern.
        syntax::parse(source).map_err(|e| PatternError::Syntax(e.to_string()))?;

        let wrapped = wrap(source, case_insensitive);
        let hir = syntax::parse(&wrapped).map_err(|e| PatternError::Syntax(e.to_string()))?;
        let count = hir.properties().explicit_captures_len();
        if count > 0 {
            return Err(PatternError::CapturingGroup { count });
        }

        let regex = Regex::new(&wrapped).map_err(|e| PatternError::Syntax(e.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            case_insensitive,
            regex,
            min_len: hir.properties().minimum_len(),
        })
    }

    /// Length in bytes of the match starting exactly at `offset`, if any.
    pub fn match_at(&self, text: &str, offset: usize) -> Option<usize> {
        if offset > text.len() {
            return None;
        }
        let input = Input::new(text).range(offset..).anchored(Anchored::Yes);
        self.regex.search(&input).map(|m| m.len())
    }

    /// True when some input lets this pattern match zero characters.
    pub fn can_match_empty(&self) -> bool {
        self.min_len == Some(0)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub(crate) fn wrapped(&self) -> String {
        wrap(&self.source, self.case_insensitive)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

/// Result of a [StateMatcher] search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    /// Index of the winning rule within its state.
    pub rule: usize,
    /// Match length in bytes; zero for zero-width rules.
    pub len: usize,
}

/// All patterns of one state, compiled into a single anchored alternation.
#[derive(Clone, Debug)]
pub struct StateMatcher {
    regex: Option<Regex>,
}

impl StateMatcher {
    pub fn new(patterns: &[Pattern]) -> Result<Self, PatternError> {
        if patterns.is_empty() {
            return Ok(Self { regex: None });
        }
        let sources: Vec<String> = patterns.iter().map(Pattern::wrapped).collect();
        let regex = Regex::new_many(&sources).map_err(|e| PatternError::Syntax(e.to_string()))?;
        Ok(Self { regex: Some(regex) })
    }

    /// First rule (in declaration order) that matches at `offset`.
    pub fn find_at(&self, text: &str, offset: usize) -> Option<RuleMatch> {
        let regex = self.regex.as_ref()?;
        if offset > text.len() {
            return None;
        }
        let input = Input::new(text).range(offset..).anchored(Anchored::Yes);
        regex.search(&input).map(|m| RuleMatch {
            rule: m.pattern().as_usize(),
            len: m.len(),
        })
    }
}

fn wrap(source: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        format!("(?i:{source})")
    } else {
        format!("(?:{source})")
    }
}
