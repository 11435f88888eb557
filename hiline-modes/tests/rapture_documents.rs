//! Whole Rapture documents through a session

use hiline_engine::testing::{assert_lossless, end_state_name, pairs};
use hiline_engine::{coalesce, LineState, Session};
use hiline_modes::{rapture, SyntaxRegistry};
use proptest::prelude::*;
use std::path::Path;

const SCRIPT: &str = r#"#include "common.rh"
(* greet everyone
   in the room *)
/**
 * @param who the player
 */
subroutine greet(who)
  local line = "Hello, \
world"
  if (who != this) message(who, line);
end
"#;

#[test]
fn script_end_states() {
    let table = rapture::table();
    let mut session = Session::with_text(&*table, SCRIPT);
    let ends: Vec<String> = session
        .tokenize_all()
        .iter()
        .map(|line| end_state_name(line).to_string())
        .collect();
    assert_eq!(
        ends,
        vec![
            "start", "comment", "start", "doc-start", "doc-start", "start", "start", "qqstring",
            "start", "start", "start", "start",
        ]
    );
}

#[test]
fn closing_a_comment_recovers_the_rest() {
    let table = rapture::table();
    let mut session = Session::with_text(&*table, SCRIPT);
    session.tokenize_all();

    // break the block comment open; everything below becomes comment
    session.set_line(2, "   in the room");
    assert_eq!(session.end_state(10).unwrap().current(), "comment");

    // and close it again: rows after the comment come back unchanged
    session.set_line(2, "   in the room *)");
    let retokenized = session.refresh(session.line_count() - 1);
    assert!(retokenized < session.line_count());
    assert_eq!(session.end_state(10).unwrap().current(), "start");
    assert_eq!(
        pairs(session.line_result(6).unwrap())[0],
        ("storage.type", "subroutine")
    );
}

#[test]
fn registry_picks_rapture_for_headers() {
    let registry = SyntaxRegistry::builtin();
    let syntax = registry.for_path(Path::new("include/common.rh")).unwrap();
    let out = syntax
        .table
        .tokenize_line("local x", &syntax.table.initial_state());
    assert_eq!(pairs(&out)[0], ("storage.type", "local"));
}

#[test]
fn coalesced_comment_line() {
    let table = rapture::table();
    let out = table.tokenize_line("(* a *) (* b", &table.initial_state());
    let merged = coalesce(out.tokens);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[2].value, "(* b");
}

fn any_state() -> impl Strategy<Value = LineState> {
    prop::sample::select(vec![
        "start",
        "comment",
        "qqstring",
        "qstring",
        "directive",
        "doc-start",
    ])
    .prop_map(LineState::new)
}

proptest! {
    #[test]
    fn any_line_is_lossless(line in "\\PC{0,60}", start in any_state()) {
        let table = rapture::table();
        let out = table.tokenize_line(&line, &start);
        assert_lossless(&line, &out);
        prop_assert!(out.tokens.len() <= line.len());
        prop_assert!(table.has_state(out.end_state.current()));
    }

    #[test]
    fn code_like_lines_are_lossless(
        line in "[a-z$@#<>\"'\\\\(){}*/ 0-9.=+-]{0,60}",
        start in any_state(),
    ) {
        let table = rapture::table();
        let out = table.tokenize_line(&line, &start);
        assert_lossless(&line, &out);
    }
}
