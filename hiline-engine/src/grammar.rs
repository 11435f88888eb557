//! Grammar definitions
//!
//!     A [Grammar] is the uncompiled description of a tokenizer: a set of named states,
//!     each an ordered list of [RuleDef]s plus an optional default token. It is plain data,
//!     cheap to clone, and can be assembled in code, loaded from a grammar file (see
//!     [loader]) or composed from other grammars (see [embed]).
//!
//!     Compiling a grammar ([Grammar::compile]) validates it and produces the immutable
//!     [RuleTable](crate::table::RuleTable) used for tokenizing.
//!
//! Transitions
//!
//!     A rule may carry a [Next] directive applied after it matches:
//!
//!         - `Goto(state)`: replace the current state.
//!         - `Push(state)`: enter `state`, remembering the current one.
//!         - `Pop`: return to the state active before the most recent push. Popping the
//!           last entry falls back to the start state.

pub mod embed;
pub mod loader;

pub use embed::ExitBinding;

use crate::error::ConfigError;
use crate::keywords::KeywordMapper;
use crate::table::RuleTable;
use crate::DEFAULT_START_STATE;
use std::collections::BTreeMap;
use std::sync::Arc;

/// State change applied after a rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Next {
    Goto(String),
    Push(String),
    Pop,
}

impl Next {
    /// Name of the state this directive refers to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Next::Goto(s) | Next::Push(s) => Some(s),
            Next::Pop => None,
        }
    }

    pub(crate) fn map_target(&self, f: impl Fn(&str) -> String) -> Next {
        match self {
            Next::Goto(s) => Next::Goto(f(s)),
            Next::Push(s) => Next::Push(f(s)),
            Next::Pop => Next::Pop,
        }
    }
}

/// How a rule decides the category of the text it matched.
#[derive(Debug, Clone)]
pub enum TokenAction {
    Literal(String),
    Classify(Arc<KeywordMapper>),
}

impl TokenAction {
    pub fn category<'a>(&'a self, text: &str) -> &'a str {
        match self {
            TokenAction::Literal(category) => category,
            TokenAction::Classify(mapper) => mapper.classify(text),
        }
    }
}

impl PartialEq for TokenAction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TokenAction::Literal(a), TokenAction::Literal(b)) => a == b,
            (TokenAction::Classify(a), TokenAction::Classify(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

/// One pattern/action pair of a state.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDef {
    pub pattern: String,
    pub action: TokenAction,
    pub next: Option<Next>,
    pub case_insensitive: bool,
}

impl RuleDef {
    /// A rule emitting a fixed category.
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action: TokenAction::Literal(category.into()),
            next: None,
            case_insensitive: false,
        }
    }

    /// A rule whose category is looked up from the matched text.
    pub fn classify(pattern: impl Into<String>, mapper: Arc<KeywordMapper>) -> Self {
        Self {
            pattern: pattern.into(),
            action: TokenAction::Classify(mapper),
            next: None,
            case_insensitive: false,
        }
    }

    pub fn goto(mut self, state: impl Into<String>) -> Self {
        self.next = Some(Next::Goto(state.into()));
        self
    }

    pub fn push(mut self, state: impl Into<String>) -> Self {
        self.next = Some(Next::Push(state.into()));
        self
    }

    pub fn pop(mut self) -> Self {
        self.next = Some(Next::Pop);
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}

/// An ordered rule list plus the category used for unmatched characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDef {
    pub rules: Vec<RuleDef>,
    pub default_token: Option<String>,
}

impl StateDef {
    pub fn new(rules: Vec<RuleDef>) -> Self {
        Self {
            rules,
            default_token: None,
        }
    }

    pub fn with_default_token(mut self, category: impl Into<String>) -> Self {
        self.default_token = Some(category.into());
        self
    }
}

/// Named states of a tokenizer, before compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    start: String,
    states: BTreeMap<String, StateDef>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self::with_start(DEFAULT_START_STATE)
    }

    pub fn with_start(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            states: BTreeMap::new(),
        }
    }

    /// Add or replace a state.
    pub fn state(mut self, name: impl Into<String>, state: StateDef) -> Self {
        self.states.insert(name.into(), state);
        self
    }

    /// Shorthand for a state without default token.
    pub fn rules(self, name: impl Into<String>, rules: Vec<RuleDef>) -> Self {
        self.state(name, StateDef::new(rules))
    }

    pub fn insert_state(&mut self, name: impl Into<String>, state: StateDef) -> Option<StateDef> {
        self.states.insert(name.into(), state)
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn get(&self, name: &str) -> Option<&StateDef> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn states(&self) -> impl Iterator<Item = (&str, &StateDef)> {
        self.states.iter().map(|(name, state)| (name.as_str(), state))
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Graft `guest` into a copy of this grammar. See [embed].
    pub fn embed(
        &self,
        guest: &Grammar,
        prefix: &str,
        exits: &[ExitBinding],
    ) -> Result<Grammar, ConfigError> {
        embed::embed(self, guest, prefix, exits)
    }

    pub fn compile(&self) -> Result<RuleTable, ConfigError> {
        RuleTable::new(self.clone())
    }
}
