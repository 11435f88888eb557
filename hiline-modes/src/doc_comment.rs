//! Documentation comments
//!
//!     A guest grammar for `/** ... */` blocks. It only knows what happens inside the
//!     comment: `@param`-style tags and TODO markers stand out, everything else is
//!     `comment.doc`. Hosts decide how the comment is entered and left:
//!
//!     ```rust,ignore
//!     let host = Grammar::new().rules("start", doc_comment::start_rules("doc-start"));
//!     let merged = host.embed(
//!         &doc_comment::grammar(),
//!         "doc-",
//!         &[doc_comment::end_binding("start")],
//!     )?;
//!     ```

use hiline_engine::{ExitBinding, Grammar, RuleDef, StateDef};

pub const CATEGORY: &str = "comment.doc";
pub const TAG_CATEGORY: &str = "comment.doc.tag";
pub const MARKER_CATEGORY: &str = "comment.doc.tag.storage.type";

/// The guest grammar: a single `start` state.
pub fn grammar() -> Grammar {
    Grammar::new().state(
        "start",
        StateDef::new(vec![
            RuleDef::new(r"@\w+", TAG_CATEGORY),
            RuleDef::new(r"(?-u:\b)(?:TODO|FIXME|XXX|HACK)(?-u:\b)", MARKER_CATEGORY)
                .case_insensitive(),
        ])
        .with_default_token(CATEGORY),
    )
}

/// Host rules that open a doc comment and jump to `next`.
///
/// An empty `/**/` is a complete comment and does not enter the guest.
pub fn start_rules(next: &str) -> Vec<RuleDef> {
    vec![
        RuleDef::new(r"/\*\*/", CATEGORY),
        RuleDef::new(r"/\*\*", CATEGORY).goto(next),
    ]
}

/// Exit binding that closes the comment and returns to `host_state`.
pub fn end_binding(host_state: &str) -> ExitBinding {
    ExitBinding::new(RuleDef::new(r"\*/", CATEGORY).goto(host_state))
}
