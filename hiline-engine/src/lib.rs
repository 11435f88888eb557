//! # hiline-engine
//!
//! A line-oriented tokenizer driven by declarative rule tables, built for syntax
//! highlighting rather than compilation.
//!
//! Layout
//!
//!     The engine is split leaf-first:
//!
//!         - [pattern]: compiles rule patterns into anchored matchers.
//!         - [keywords]: closed-vocabulary classification of identifiers.
//!         - [grammar]: uncompiled rule definitions, grammar files and embedding.
//!         - [table]: the compiled, immutable [RuleTable](table::RuleTable).
//!         - [tokenizer]: the state machine that turns one line into tokens.
//!         - [session]: per-document line cache for incremental re-tokenization.
//!
//! Data Flow
//!
//!     A caller builds a [Grammar](grammar::Grammar) (in code or from a grammar file),
//!     compiles it once into a `RuleTable`, and then feeds lines one at a time together
//!     with the [LineState](tokenizer::LineState) returned by the previous line:
//!
//!     ```rust,ignore
//!     let table = grammar.compile()?;
//!     let mut state = table.initial_state();
//!     for line in source.lines() {
//!         let out = table.tokenize_line(line, &state);
//!         paint(&out.tokens);
//!         state = out.end_state;
//!     }
//!     ```
//!
//!     The table holds no per-document state, so any number of documents can share it
//!     across threads.

pub mod error;
pub mod grammar;
pub mod keywords;
pub mod pattern;
pub mod session;
pub mod table;
pub mod testing;
pub mod tokenizer;

pub use error::{ConfigError, PatternError};
pub use grammar::{ExitBinding, Grammar, Next, RuleDef, StateDef, TokenAction};
pub use keywords::{KeywordConfig, KeywordGroup, KeywordMapper};
pub use pattern::{Pattern, StateMatcher};
pub use session::Session;
pub use table::{compile, embed, RuleTable};
pub use tokenizer::{coalesce, tokenize_line, LineState, LineTokenizer, Token, TokenizedLine};

/// Name of the state a grammar starts in unless configured otherwise.
pub const DEFAULT_START_STATE: &str = "start";

/// Category given to unmatched text when the current state has no default token.
pub const TEXT_CATEGORY: &str = "text";
