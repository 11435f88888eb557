//! Tokenizer
//!
//!     The state machine that classifies one line of text. It is a pure function of
//!     `(table, line, start state)`: the table is never modified and no state is kept
//!     between calls. Callers thread the returned [LineState] into the next line.
//!
//! The Scan Loop
//!
//!     Starting at offset 0 in the given state:
//!
//!         1. Try the current state's rules, in declaration order, anchored at the offset.
//!         2. On a match, emit the matched text under the rule's category (a literal, or a
//!            keyword lookup on the text), advance past it and apply the rule's transition.
//!         3. When nothing matches, emit exactly one character under the state's default
//!            token (or `text`) and stay in the state.
//!
//!     Step 3 and the compile-time forward-progress check guarantee termination: every
//!     emitted token holds at least one character. A rule may match zero characters only
//!     if it changes state; such a match emits nothing, and right after it a second
//!     zero-width match at the same offset is not accepted.
//!
//! Losslessness
//!
//!     The values of the emitted tokens, concatenated, are exactly the input line.
//!
//! Multi-line Constructs
//!
//!     Nothing special: a construct left open at the end of a line simply leaves the scanner
//!     in its continuation state, and that state is the line's end state.

use crate::grammar::Next;
use crate::table::RuleTable;
use crate::{DEFAULT_START_STATE, TEXT_CATEGORY};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A classified span of a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub category: String,
    pub value: String,
}

impl Token {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.category, self.value)
    }
}

/// Scanner state between lines: a stack of state names, the last one being current.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineState {
    stack: Vec<String>,
}

impl LineState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            stack: vec![state.into()],
        }
    }

    /// Build from an explicit stack, bottom first. An empty stack means the default
    /// start state.
    pub fn from_stack(stack: Vec<String>) -> Self {
        if stack.is_empty() {
            Self::new(DEFAULT_START_STATE)
        } else {
            Self { stack }
        }
    }

    pub fn current(&self) -> &str {
        self.stack
            .last()
            .map(String::as_str)
            .unwrap_or(DEFAULT_START_STATE)
    }

    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn apply(&mut self, next: &Next, start: &str) {
        match next {
            Next::Goto(state) => match self.stack.last_mut() {
                Some(top) => *top = state.clone(),
                None => self.stack.push(state.clone()),
            },
            Next::Push(state) => self.stack.push(state.clone()),
            Next::Pop => {
                self.stack.pop();
                if self.stack.is_empty() {
                    self.stack.push(start.to_string());
                }
            }
        }
    }
}

impl Default for LineState {
    fn default() -> Self {
        Self::new(DEFAULT_START_STATE)
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stack.join(" > "))
    }
}

/// Output of one [RuleTable::tokenize_line] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedLine {
    pub tokens: Vec<Token>,
    pub end_state: LineState,
}

impl TokenizedLine {
    /// The line text, rebuilt from the token values.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.value.as_str()).collect()
    }
}

/// Anything that tokenizes a document one line at a time.
pub trait LineTokenizer {
    fn initial_state(&self) -> LineState;
    fn tokenize_line(&self, line: &str, start: &LineState) -> TokenizedLine;
}

impl RuleTable {
    pub fn initial_state(&self) -> LineState {
        LineState::new(self.start())
    }

    pub fn tokenize_line(&self, line: &str, start: &LineState) -> TokenizedLine {
        let mut state = if start.stack().iter().all(|s| self.has_state(s)) && start.depth() > 0 {
            start.clone()
        } else {
            log::warn!("unknown start state '{}', resetting to '{}'", start, self.start());
            self.initial_state()
        };

        let mut tokens = Vec::new();
        let mut offset = 0;
        let mut zero_width_at = None;

        while offset < line.len() {
            if self.token_limit.is_some_and(|limit| tokens.len() >= limit) {
                log::warn!(
                    "token limit reached at byte {} of {}, rest of line left unclassified",
                    offset,
                    line.len()
                );
                tokens.push(Token::new(TEXT_CATEGORY, &line[offset..]));
                return TokenizedLine {
                    tokens,
                    end_state: self.initial_state(),
                };
            }

            let Some(compiled) = self.states.get(state.current()) else {
                state = self.initial_state();
                continue;
            };

            let allow_empty = zero_width_at != Some(offset);
            match compiled.find(line, offset, allow_empty) {
                Some(found) => {
                    let rule = &compiled.rules[found.rule];
                    let end = offset + found.len;
                    if found.len > 0 {
                        let text = &line[offset..end];
                        tokens.push(Token::new(rule.action.category(text), text));
                        zero_width_at = None;
                    } else {
                        zero_width_at = Some(offset);
                    }
                    if let Some(next) = &rule.next {
                        let from = state.current().to_string();
                        state.apply(next, self.start());
                        log::trace!("{} -> {} at byte {}", from, state.current(), end);
                    }
                    offset = end;
                }
                None => {
                    let width = line[offset..].chars().next().map_or(1, char::len_utf8);
                    let end = offset + width;
                    let category = compiled.default_token.as_deref().unwrap_or(TEXT_CATEGORY);
                    tokens.push(Token::new(category, &line[offset..end]));
                    offset = end;
                }
            }
        }

        TokenizedLine {
            tokens,
            end_state: state,
        }
    }
}

impl LineTokenizer for RuleTable {
    fn initial_state(&self) -> LineState {
        RuleTable::initial_state(self)
    }

    fn tokenize_line(&self, line: &str, start: &LineState) -> TokenizedLine {
        RuleTable::tokenize_line(self, line, start)
    }
}

/// Functional form of [RuleTable::tokenize_line].
pub fn tokenize_line(table: &RuleTable, line: &str, start: &LineState) -> TokenizedLine {
    table.tokenize_line(line, start)
}

/// Merge neighbouring tokens that share a category.
pub fn coalesce(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match merged.last_mut() {
            Some(last) if last.category == token.category => last.value.push_str(&token.value),
            _ => merged.push(token),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, RuleDef, StateDef};
    use crate::testing::tok;

    fn comments() -> RuleTable {
        Grammar::new()
            .rules(
                "start",
                vec![
                    RuleDef::new(r"\(\*", "comment").goto("comment"),
                    RuleDef::new("[a-z]+", "identifier"),
                    RuleDef::new(r"\s+", "text"),
                ],
            )
            .rules(
                "comment",
                vec![
                    RuleDef::new(r".*?\*\)", "comment").goto("start"),
                    RuleDef::new(".+", "comment"),
                ],
            )
            .compile()
            .unwrap()
    }

    #[test]
    fn empty_line_keeps_state() {
        let table = comments();
        let out = table.tokenize_line("", &LineState::new("comment"));
        assert!(out.tokens.is_empty());
        assert_eq!(out.end_state.current(), "comment");
    }

    #[test]
    fn comment_spans_lines() {
        let table = comments();
        let first = table.tokenize_line("a (* open", &table.initial_state());
        assert_eq!(
            first.tokens,
            vec![
                tok("identifier", "a"),
                tok("text", " "),
                tok("comment", "(*"),
                tok("comment", " open"),
            ]
        );
        assert_eq!(first.end_state.current(), "comment");

        let second = table.tokenize_line("close *) b", &first.end_state);
        assert_eq!(
            second.tokens,
            vec![
                tok("comment", "close *)"),
                tok("text", " "),
                tok("identifier", "b"),
            ]
        );
        assert_eq!(second.end_state.current(), "start");
    }

    #[test]
    fn unmatched_characters_fall_back_one_at_a_time() {
        let table = comments();
        let out = table.tokenize_line("a;;", &table.initial_state());
        assert_eq!(
            out.tokens,
            vec![tok("identifier", "a"), tok("text", ";"), tok("text", ";")]
        );
    }

    #[test]
    fn fallback_uses_default_token() {
        let table = Grammar::new()
            .state(
                "start",
                StateDef::new(vec![RuleDef::new("x", "x")]).with_default_token("string"),
            )
            .compile()
            .unwrap();
        let out = table.tokenize_line("ab", &table.initial_state());
        assert_eq!(out.tokens, vec![tok("string", "a"), tok("string", "b")]);
    }

    #[test]
    fn fallback_never_splits_characters() {
        let table = comments();
        let out = table.tokenize_line("é€", &table.initial_state());
        assert_eq!(out.tokens, vec![tok("text", "é"), tok("text", "€")]);
    }

    #[test]
    fn push_and_pop() {
        let table = Grammar::new()
            .rules(
                "start",
                vec![RuleDef::new(r"\{", "paren").push("block"), RuleDef::new(".", "text")],
            )
            .rules(
                "block",
                vec![
                    RuleDef::new(r"\{", "paren").push("block"),
                    RuleDef::new(r"\}", "paren").pop(),
                    RuleDef::new("[^{}]+", "inner"),
                ],
            )
            .compile()
            .unwrap();

        let out = table.tokenize_line("{a{b}", &table.initial_state());
        // two pushes, one pop
        assert_eq!(out.end_state.stack(), ["start", "block"].map(String::from));
        assert_eq!(out.end_state.depth(), 2);

        let out = table.tokenize_line("}}x", &out.end_state);
        assert_eq!(out.end_state.stack(), ["start".to_string()]);
        assert_eq!(out.tokens.last(), Some(&tok("text", "x")));
    }

    #[test]
    fn popping_the_last_state_returns_to_start() {
        let table = Grammar::new()
            .rules("start", vec![RuleDef::new("x", "x").goto("other")])
            .rules("other", vec![RuleDef::new("y", "y").pop()])
            .compile()
            .unwrap();
        let out = table.tokenize_line("xy", &table.initial_state());
        assert_eq!(out.end_state, LineState::new("start"));
    }

    #[test]
    fn zero_width_transition_then_progress() {
        let table = Grammar::new()
            .rules(
                "start",
                vec![
                    RuleDef::new(r"\b", "boundary").goto("word"),
                    RuleDef::new(r"\s+", "text"),
                ],
            )
            .rules(
                "word",
                vec![
                    RuleDef::new(r"\B|\b", "boundary").goto("start"),
                    RuleDef::new(r"\w+", "word"),
                ],
            )
            .compile()
            .unwrap();
        let out = table.tokenize_line("ab cd", &table.initial_state());
        assert_eq!(out.text(), "ab cd");
        assert!(out.tokens.iter().all(|t| !t.value.is_empty()));
    }

    #[test]
    fn unknown_start_state_is_reset() {
        let table = comments();
        let out = table.tokenize_line("abc", &LineState::new("nowhere"));
        assert_eq!(out.tokens, vec![tok("identifier", "abc")]);
        assert_eq!(out.end_state.current(), "start");
    }

    #[test]
    fn token_limit_truncates_to_text() {
        let table = comments().with_token_limit(2);
        let out = table.tokenize_line("a b (* c", &table.initial_state());
        assert_eq!(
            out.tokens,
            vec![tok("identifier", "a"), tok("text", " "), tok("text", "b (* c")]
        );
        assert_eq!(out.end_state.current(), "start");
    }

    #[test]
    fn coalesce_merges_neighbours() {
        let merged = coalesce(vec![
            tok("text", "a"),
            tok("text", "b"),
            tok("comment", "c"),
            tok("text", "d"),
        ]);
        assert_eq!(
            merged,
            vec![tok("text", "ab"), tok("comment", "c"), tok("text", "d")]
        );
    }

    #[test]
    fn line_state_display() {
        let state = LineState::from_stack(vec!["start".into(), "block".into()]);
        assert_eq!(state.to_string(), "start > block");
        assert_eq!(LineState::from_stack(vec![]), LineState::default());
    }
}
