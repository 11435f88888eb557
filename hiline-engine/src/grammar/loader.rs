//! Grammar files
//!
//!     Grammars can be written as YAML or JSON documents instead of code. The file format
//!     mirrors the in-memory model:
//!
//!     ```yaml
//!     start: start              # optional, defaults to "start"
//!     keywords:                 # named keyword mappers, referenced by rules
//!       words:
//!         default: identifier
//!         groups:
//!           - category: keyword.control
//!             words: [if, else, while]
//!     states:
//!       start:
//!         rules:
//!           - regex: '\(\*'
//!             token: comment
//!             next: comment
//!           - regex: '[a-zA-Z_]\w*'
//!             keywords: words
//!       comment:
//!         default_token: comment
//!         rules:
//!           - regex: '.*?\*\)'
//!             token: comment
//!             next: pop
//!     ```
//!
//!     `next: pop` is the pop transition; `push: <state>` pushes. Each rule needs exactly
//!     one of `token` and `keywords`. Loading only checks the document shape; pattern and
//!     transition checks happen in [Grammar::compile].

use super::{Grammar, Next, RuleDef, StateDef, TokenAction};
use crate::error::ConfigError;
use crate::keywords::{KeywordConfig, KeywordMapper};
use crate::DEFAULT_START_STATE;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const POP: &str = "pop";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGrammar {
    #[serde(default = "default_start")]
    start: String,
    #[serde(default)]
    keywords: BTreeMap<String, KeywordConfig>,
    states: BTreeMap<String, RawState>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawState {
    #[serde(default)]
    default_token: Option<String>,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    regex: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    push: Option<String>,
    #[serde(default)]
    case_insensitive: bool,
}

fn default_start() -> String {
    DEFAULT_START_STATE.to_string()
}

impl Grammar {
    pub fn from_yaml_str(source: &str) -> Result<Grammar, ConfigError> {
        let raw: RawGrammar = serde_yaml::from_str(source)?;
        raw.into_grammar()
    }

    pub fn from_json_str(source: &str) -> Result<Grammar, ConfigError> {
        let raw: RawGrammar = serde_json::from_str(source)?;
        raw.into_grammar()
    }
}

impl RawGrammar {
    fn into_grammar(self) -> Result<Grammar, ConfigError> {
        let mappers: HashMap<String, Arc<KeywordMapper>> = self
            .keywords
            .into_iter()
            .map(|(name, config)| (name, Arc::new(KeywordMapper::from(config))))
            .collect();

        let mut grammar = Grammar::with_start(self.start);
        for (name, raw_state) in self.states {
            let rules = raw_state
                .rules
                .into_iter()
                .enumerate()
                .map(|(index, raw)| raw.into_rule(&name, index, &mappers))
                .collect::<Result<Vec<_>, _>>()?;
            grammar.insert_state(
                name,
                StateDef {
                    rules,
                    default_token: raw_state.default_token,
                },
            );
        }
        Ok(grammar)
    }
}

impl RawRule {
    fn into_rule(
        self,
        state: &str,
        index: usize,
        mappers: &HashMap<String, Arc<KeywordMapper>>,
    ) -> Result<RuleDef, ConfigError> {
        let action = match (self.token, self.keywords) {
            (Some(category), None) => TokenAction::Literal(category),
            (None, Some(mapper)) => match mappers.get(&mapper) {
                Some(found) => TokenAction::Classify(Arc::clone(found)),
                None => {
                    return Err(ConfigError::UnknownKeywordMapper {
                        state: state.to_string(),
                        index,
                        mapper,
                    })
                }
            },
            _ => {
                return Err(ConfigError::AmbiguousAction {
                    state: state.to_string(),
                    index,
                })
            }
        };

        let next = match (self.next, self.push) {
            (None, None) => None,
            (Some(next), None) if next == POP => Some(Next::Pop),
            (Some(next), None) => Some(Next::Goto(next)),
            (None, Some(push)) => Some(Next::Push(push)),
            (Some(_), Some(_)) => {
                return Err(ConfigError::AmbiguousTransition {
                    state: state.to_string(),
                    index,
                })
            }
        };

        Ok(RuleDef {
            pattern: self.regex,
            action,
            next,
            case_insensitive: self.case_insensitive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
keywords:
  words:
    groups:
      - category: keyword.control
        words: [if, else]
states:
  start:
    rules:
      - regex: '\(\*'
        token: comment
        next: comment
      - regex: '[a-z]+'
        keywords: words
      - regex: '\['
        token: paren
        push: start
  comment:
    default_token: comment
    rules:
      - regex: '.*?\*\)'
        token: comment
        next: pop
"#;

    #[test]
    fn loads_yaml_grammar() {
        let g = Grammar::from_yaml_str(YAML).unwrap();
        assert_eq!(g.start(), "start");
        let start = g.get("start").unwrap();
        assert_eq!(start.rules.len(), 3);
        assert_eq!(start.rules[0].next, Some(Next::Goto("comment".into())));
        assert_eq!(start.rules[1].action.category("else"), "keyword.control");
        assert_eq!(start.rules[1].action.category("elsewhere"), "identifier");
        assert_eq!(start.rules[2].next, Some(Next::Push("start".into())));
        assert_eq!(g.get("comment").unwrap().rules[0].next, Some(Next::Pop));
    }

    #[test]
    fn loads_json_grammar() {
        let g = Grammar::from_json_str(
            r#"{"start": "main", "states": {"main": {"rules": [{"regex": "\\d+", "token": "number"}]}}}"#,
        )
        .unwrap();
        assert_eq!(g.start(), "main");
        assert_eq!(g.get("main").unwrap().rules[0].pattern, r"\d+");
    }

    #[test]
    fn rejects_rule_without_action() {
        let err = Grammar::from_yaml_str("states:\n  start:\n    rules:\n      - regex: a\n")
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::AmbiguousAction {
                state: "start".into(),
                index: 0
            }
        );
    }

    #[test]
    fn rejects_unknown_mapper() {
        let err = Grammar::from_yaml_str(
            "states:\n  start:\n    rules:\n      - regex: a\n        keywords: nope\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKeywordMapper { .. }));
    }

    #[test]
    fn rejects_next_and_push_together() {
        let err = Grammar::from_yaml_str(
            "states:\n  start:\n    rules:\n      - regex: a\n        token: a\n        next: start\n        push: start\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousTransition { .. }));
    }

    #[test]
    fn malformed_documents_are_source_errors() {
        assert!(matches!(
            Grammar::from_yaml_str("states: [1, 2"),
            Err(ConfigError::Source(_))
        ));
        assert!(matches!(
            Grammar::from_yaml_str("states: {}\nbogus: 1\n"),
            Err(ConfigError::Source(_))
        ));
    }
}
