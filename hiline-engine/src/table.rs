//! Compiled rule tables
//!
//!     [RuleTable] is the validated, compiled form of a [Grammar]. It is immutable once
//!     built and `Send + Sync`, so one table serves every open document.
//!
//! Validation
//!
//!     Compilation fails with a [ConfigError] when:
//!
//!         - the start state is missing,
//!         - a pattern does not compile or contains a capturing group,
//!         - a `Goto`/`Push` names a state that does not exist,
//!         - a rule can match empty text and does not leave its state. Such a rule would
//!           never consume anything and never change anything, so the scanner could not
//!           make progress.

use crate::error::ConfigError;
use crate::grammar::{ExitBinding, Grammar, Next, TokenAction};
use crate::pattern::{Pattern, RuleMatch, StateMatcher};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) pattern: Pattern,
    pub(crate) action: TokenAction,
    pub(crate) next: Option<Next>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledState {
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) matcher: StateMatcher,
    pub(crate) default_token: Option<String>,
}

impl CompiledState {
    /// First rule matching at `offset`. With `allow_empty == false`, zero-width matches
    /// are skipped and the following rules are tried in order.
    pub(crate) fn find(&self, line: &str, offset: usize, allow_empty: bool) -> Option<RuleMatch> {
        let found = self.matcher.find_at(line, offset)?;
        if allow_empty || found.len > 0 {
            return Some(found);
        }
        self.rules
            .iter()
            .enumerate()
            .skip(found.rule + 1)
            .find_map(|(rule, compiled)| match compiled.pattern.match_at(line, offset) {
                Some(len) if len > 0 => Some(RuleMatch { rule, len }),
                _ => None,
            })
    }
}

/// Immutable, shareable tokenizer tables.
#[derive(Debug, Clone)]
pub struct RuleTable {
    grammar: Grammar,
    pub(crate) states: HashMap<String, CompiledState>,
    pub(crate) token_limit: Option<usize>,
}

impl RuleTable {
    pub fn new(grammar: Grammar) -> Result<Self, ConfigError> {
        if !grammar.contains(grammar.start()) {
            return Err(ConfigError::MissingStartState(grammar.start().to_string()));
        }

        let mut states = HashMap::with_capacity(grammar.len());
        let mut rule_count = 0;
        for (name, state) in grammar.states() {
            let mut rules = Vec::with_capacity(state.rules.len());
            for (index, def) in state.rules.iter().enumerate() {
                let pattern = Pattern::new(&def.pattern, def.case_insensitive).map_err(|source| {
                    ConfigError::Pattern {
                        state: name.to_string(),
                        index,
                        source,
                    }
                })?;

                if let Some(target) = def.next.as_ref().and_then(Next::target) {
                    if !grammar.contains(target) {
                        return Err(ConfigError::UnresolvedState {
                            state: name.to_string(),
                            index,
                            target: target.to_string(),
                        });
                    }
                }

                let leaves_state = match &def.next {
                    None => false,
                    Some(Next::Goto(target)) => target != name,
                    Some(Next::Push(_)) | Some(Next::Pop) => true,
                };
                if pattern.can_match_empty() && !leaves_state {
                    return Err(ConfigError::NoProgress {
                        state: name.to_string(),
                        index,
                    });
                }

                rules.push(CompiledRule {
                    pattern,
                    action: def.action.clone(),
                    next: def.next.clone(),
                });
            }

            let patterns: Vec<Pattern> = rules.iter().map(|r| r.pattern.clone()).collect();
            let matcher = StateMatcher::new(&patterns).map_err(|source| ConfigError::Pattern {
                state: name.to_string(),
                index: 0,
                source,
            })?;
            rule_count += rules.len();
            states.insert(
                name.to_string(),
                CompiledState {
                    rules,
                    matcher,
                    default_token: state.default_token.clone(),
                },
            );
        }

        log::debug!(
            "compiled rule table: {} states, {} rules, start '{}'",
            states.len(),
            rule_count,
            grammar.start()
        );
        Ok(Self {
            grammar,
            states,
            token_limit: None,
        })
    }

    /// Cap the number of tokens produced for one line. Once reached, the rest of the
    /// line becomes a single `text` token and the end state resets to the start state.
    pub fn with_token_limit(mut self, limit: usize) -> Self {
        self.token_limit = Some(limit.max(1));
        self
    }

    pub fn token_limit(&self) -> Option<usize> {
        self.token_limit
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn start(&self) -> &str {
        self.grammar.start()
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Embed `guest` into this table under `prefix`, producing a new table.
    pub fn embed(
        &self,
        guest: &RuleTable,
        prefix: &str,
        exits: &[ExitBinding],
    ) -> Result<RuleTable, ConfigError> {
        let merged = self.grammar.embed(&guest.grammar, prefix, exits)?;
        let table = RuleTable::new(merged)?;
        Ok(match self.token_limit {
            Some(limit) => table.with_token_limit(limit),
            None => table,
        })
    }
}

/// Validate and compile `grammar`.
pub fn compile(grammar: &Grammar) -> Result<RuleTable, ConfigError> {
    grammar.compile()
}

/// Functional form of [RuleTable::embed].
pub fn embed(
    host: &RuleTable,
    guest: &RuleTable,
    prefix: &str,
    exits: &[ExitBinding],
) -> Result<RuleTable, ConfigError> {
    host.embed(guest, prefix, exits)
}
