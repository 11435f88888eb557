//! Embedding tests
//!
//! One guest grammar is grafted twice into the same host, under `a-` and `b-`. Transitions
//! inside each copy must stay inside that copy, and exit bindings must land back in the
//! host.

use hiline_engine::testing::{pairs, tokenize_lines};
use hiline_engine::{ConfigError, ExitBinding, Grammar, LineState, RuleDef, RuleTable, StateDef};
use proptest::prelude::*;

fn guest() -> Grammar {
    Grammar::new()
        .state(
            "start",
            StateDef::new(vec![RuleDef::new(r"\[", "bracket").goto("inner")])
                .with_default_token("guest"),
        )
        .state(
            "inner",
            StateDef::new(vec![
                RuleDef::new(r"\]", "bracket").goto("start"),
                RuleDef::new("x", "mark"),
            ])
            .with_default_token("guest.inner"),
        )
}

fn host() -> Grammar {
    Grammar::new().rules(
        "start",
        vec![
            RuleDef::new("A", "enter.a").goto("a-start"),
            RuleDef::new("B", "enter.b").goto("b-start"),
        ],
    )
}

fn merged() -> RuleTable {
    let exit = ExitBinding::new(RuleDef::new(";", "exit").goto("start"));
    host()
        .embed(&guest(), "a-", std::slice::from_ref(&exit))
        .and_then(|g| g.embed(&guest(), "b-", &[exit]))
        .and_then(|g| g.compile())
        .expect("merged grammar compiles")
}

#[test]
fn each_copy_keeps_its_own_states() {
    let table = merged();
    let out = table.tokenize_line("A[x", &table.initial_state());
    assert_eq!(out.end_state.current(), "a-inner");
    assert_eq!(
        pairs(&out),
        vec![("enter.a", "A"), ("bracket", "["), ("mark", "x")]
    );

    let out = table.tokenize_line("B[x", &table.initial_state());
    assert_eq!(out.end_state.current(), "b-inner");
}

#[test]
fn exit_binding_returns_to_host() {
    let table = merged();
    let lines = tokenize_lines(&table, &["A[x]y", "z;A", "B;"]);
    assert_eq!(lines[0].end_state.current(), "a-start");
    assert_eq!(
        pairs(&lines[0]).last().copied(),
        Some(("guest", "y"))
    );
    assert_eq!(lines[1].end_state.current(), "a-start");
    assert_eq!(pairs(&lines[1])[1], ("exit", ";"));
    // line 2 starts inside a-start: "B" is guest text there, ";" exits
    assert_eq!(pairs(&lines[2]), vec![("guest", "B"), ("exit", ";")]);
    assert_eq!(lines[2].end_state.current(), "start");
}

#[test]
fn exit_applies_inside_nested_guest_state() {
    let table = merged();
    let out = table.tokenize_line("x;x", &LineState::new("b-inner"));
    assert_eq!(
        pairs(&out),
        vec![("mark", "x"), ("exit", ";"), ("text", "x")]
    );
    assert_eq!(out.end_state.current(), "start");
}

#[test]
fn compiled_tables_embed_too() {
    let host = Grammar::new()
        .rules("start", vec![RuleDef::new("x", "x")])
        .compile()
        .unwrap();
    let guest = guest().compile().unwrap();
    let merged = host.embed(&guest, "g-", &[]).unwrap();
    assert!(merged.has_state("g-start"));
    assert!(merged.has_state("g-inner"));
    assert!(!host.has_state("g-start"));
    assert_eq!(guest.state_count(), 2);
}

#[test]
fn same_prefix_twice_collides() {
    let once = host().embed(&guest(), "a-", &[]).unwrap();
    let err = once.embed(&guest(), "a-", &[]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::StateCollision {
            prefix: "a-".into(),
            state: "a-inner".into()
        }
    );
}

proptest! {
    #[test]
    fn no_cross_talk_between_copies(line in "[\\[\\]xyAB]{0,30}") {
        // leaving a copy is only possible through the exit binding
        let table = merged();
        for (prefix, other) in [("a-", "b-"), ("b-", "a-")] {
            let start = LineState::new(format!("{prefix}start"));
            let out = table.tokenize_line(&line, &start);
            for name in out.end_state.stack() {
                prop_assert!(!name.starts_with(other), "{} leaked into {}", prefix, name);
            }
            prop_assert!(out.end_state.current().starts_with(prefix));
        }
    }
}
