//! Grammar embedding
//!
//!     Embedding grafts every state of a guest grammar into a copy of a host grammar under
//!     a name prefix. A host rule can then jump into the guest (`doc-start`), and exit
//!     bindings bring control back into host territory without the host knowing any other
//!     guest state name.
//!
//!     ```rust,ignore
//!     let merged = host.embed(
//!         &doc_comment,
//!         "doc-",
//!         &[ExitBinding::new(RuleDef::new(r"\*/", "comment.doc").goto("start"))],
//!     )?;
//!     ```
//!
//! Renaming
//!
//!     The prefix is prepended verbatim: guest `start` under `doc-` becomes `doc-start`.
//!     `Goto` and `Push` targets inside guest rules are renamed the same way, `Pop` is left
//!     as is. Exit binding rules are NOT renamed: their targets are host states.
//!
//!     Both inputs are borrowed and never modified, so one guest grammar can be embedded
//!     into many hosts, or several times into one host under different prefixes.

use super::{Grammar, RuleDef, StateDef};
use crate::error::ConfigError;

/// A rule added to guest states so that the guest can hand control back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitBinding {
    pub rule: RuleDef,
    /// Guest state names (before prefixing) that receive the rule; empty means all.
    pub states: Vec<String>,
    /// Add after the guest's own rules instead of before them.
    pub append: bool,
}

impl ExitBinding {
    pub fn new(rule: RuleDef) -> Self {
        Self {
            rule,
            states: Vec::new(),
            append: false,
        }
    }

    pub fn in_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn appended(mut self) -> Self {
        self.append = true;
        self
    }

    fn applies_to(&self, guest_state: &str) -> bool {
        self.states.is_empty() || self.states.iter().any(|s| s == guest_state)
    }
}

/// Merge `guest` into a copy of `host` under `prefix`.
pub fn embed(
    host: &Grammar,
    guest: &Grammar,
    prefix: &str,
    exits: &[ExitBinding],
) -> Result<Grammar, ConfigError> {
    for exit in exits {
        if let Some(missing) = exit.states.iter().find(|s| !guest.contains(s)) {
            return Err(ConfigError::UnknownExitState(missing.clone()));
        }
    }

    let rename = |name: &str| format!("{prefix}{name}");
    let mut merged = host.clone();

    for (name, state) in guest.states() {
        let renamed = rename(name);
        if merged.contains(&renamed) {
            return Err(ConfigError::StateCollision {
                prefix: prefix.to_string(),
                state: renamed,
            });
        }

        let own_rules = state.rules.iter().map(|rule| RuleDef {
            next: rule.next.as_ref().map(|n| n.map_target(rename)),
            ..rule.clone()
        });
        let (before, after): (Vec<&ExitBinding>, Vec<&ExitBinding>) = exits
            .iter()
            .filter(|exit| exit.applies_to(name))
            .partition(|exit| !exit.append);

        let rules = before
            .iter()
            .map(|exit| exit.rule.clone())
            .chain(own_rules)
            .chain(after.iter().map(|exit| exit.rule.clone()))
            .collect();

        merged.insert_state(
            renamed,
            StateDef {
                rules,
                default_token: state.default_token.clone(),
            },
        );
    }

    log::debug!(
        "embedded {} guest states under '{}' ({} exit bindings)",
        guest.len(),
        prefix,
        exits.len()
    );
    Ok(merged)
}
