//! Configuration errors
//!
//!     Every error here is raised while building a rule table. Tokenizing a line has no
//!     error path: any text produces some token sequence.

use thiserror::Error;

/// A single pattern could not be turned into a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("invalid regular expression: {0}")]
    Syntax(String),

    #[error("{count} capturing group(s) found, use (?:...) instead")]
    CapturingGroup { count: usize },
}

/// Fatal problem in a grammar, detected before any line is tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("state '{state}', rule {index}: {source}")]
    Pattern {
        state: String,
        index: usize,
        #[source]
        source: PatternError,
    },

    #[error("state '{state}', rule {index}: transition to unknown state '{target}'")]
    UnresolvedState {
        state: String,
        index: usize,
        target: String,
    },

    #[error("state '{state}', rule {index}: can match empty text without leaving the state")]
    NoProgress { state: String, index: usize },

    #[error("grammar has no start state '{0}'")]
    MissingStartState(String),

    #[error("embedding under prefix '{prefix}' collides with existing state '{state}'")]
    StateCollision { prefix: String, state: String },

    #[error("exit binding names unknown guest state '{0}'")]
    UnknownExitState(String),

    #[error("rule {index} in state '{state}' refers to undeclared keyword mapper '{mapper}'")]
    UnknownKeywordMapper {
        state: String,
        index: usize,
        mapper: String,
    },

    #[error("rule {index} in state '{state}' must set exactly one of 'token' or 'keywords'")]
    AmbiguousAction { state: String, index: usize },

    #[error("rule {index} in state '{state}' sets both 'next' and 'push'")]
    AmbiguousTransition { state: String, index: usize },

    #[error("could not read grammar: {0}")]
    Source(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Source(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Source(err.to_string())
    }
}
