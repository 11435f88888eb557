//! Rapture
//!
//!     Highlighting for Rapture scripts (`.r`, `.rh`): a C-flavoured language with
//!     `(* ... *)` comments, preprocessor directives and a large library of builtins whose
//!     names may end in `$` (string result) or `@` (list result).
//!
//! States
//!
//!     start       code
//!     comment     inside `(* ... *)`
//!     qqstring    inside a `"` string that did not close on its line
//!     qstring     same for `'`
//!     directive   the argument of `#include` and friends
//!     doc-*       an embedded `/** ... */` documentation comment
//!
//!     A string that is still open at the end of a line continues on the next one, with or
//!     without a trailing backslash. Directive arguments that end in `\` keep the line after
//!     in the `directive` state.
//!
//!     Word boundaries only count ASCII letters and digits as word characters, so `café`
//!     highlights `caf` as an identifier and leaves `é` as text.

use crate::doc_comment;
use hiline_engine::{ConfigError, Grammar, KeywordMapper, RuleDef, RuleTable, StateDef};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const ID: &str = "rapture";
pub const NAME: &str = "rapture";
pub const CAPTION: &str = "Rapture";
pub const EXTENSIONS: &str = "r|rh";

/// Builtin functions. Plain names are whole words; `name$` and `name@` variants are listed
/// separately since `$` and `@` end a word.
pub const BUILTIN_FUNCTIONS: &str = concat!(
    r"(?-u:\b)(?:(?:alloc|alpha|append_log|atcp_msg|backup|check_tasks",
    r"|clear(?:_(?:game|player|replica|room)_task)?|debugout|decrement_replica_(?:data|var)",
    r"|delete|doverb|expand|fclose|feof|fget_(?:byte|data|memory|variable)|file_(?:length|lines)",
    r"|find_(?:repflag|replica)|fopen|fpos|fput_(?:byte|data|line|memory|string|variable)",
    r"|fremove|frename|fseek(?:_line)?|game_task|game_task_time|input|insert",
    r"|ipwhitelist_(?:add|remove)|length|make_path|mdist|memcpy|memset|message|mfrac|mpow",
    r"|msgstr|msqrt|next_player|node_set_ip|numeric|ord|player_task(?:_time)?|pop|pos",
    r"|profiling_(?:off|on)|push|raise_error|random|realloc|reload|replica_task(?:_time)?",
    r"|reset_profiles|room_task(?:_time)?",
    r"|rsql_(?:cleanup|connect|execute|fetch_row|fetch_row_v|last_insert_id|num_rows|ping|prepare|query_param|release|seek_row)",
    r"|search_(?:object|persona|player|replica|replica_room|room|verb)|send_memory|send_prompt",
    r"|shift|size|stamp2time|system|unshift|val|valid_message|wait_for_input|words)(?-u:\b)",
    r"|(?:ansicolor|chr|fget_line|fget_string|ftempname|join|left|lower|md5|mid|msg|pop",
    r"|profile_result|replace|right|rsql_(?:connection_info|error|row_data)|shift|string",
    r"|time2stamp|upper|words)\$",
    r"|(?:clone|game_tasks|ipwhitelist_list|player_tasks|replica_tasks|room_tasks|splitc?|words)@)",
);

const OPERATORS: &str = concat!(
    r"!|\$|%|&|\*|--|-|\+\+|\+|~|==|=|!=|<=|>=|<<=|>>=|>>>=|<>|<|>|!|&&|\|\||\?:",
    r"|\*=|%=|\+=|-=|&=|\^=|(?-u:\b)(?:in|new|delete|typeof|void)",
);

static TABLE: Lazy<Arc<RuleTable>> = Lazy::new(|| {
    Arc::new(
        grammar()
            .and_then(|g| g.compile())
            .expect("built-in Rapture grammar compiles"),
    )
});

/// The shared, compiled Rapture table.
pub fn table() -> Arc<RuleTable> {
    Arc::clone(&TABLE)
}

/// Identifier classification: control keywords, storage, operators spelled as words,
/// `this` and the boolean constants. Anything else is an `identifier`.
pub fn keywords() -> KeywordMapper {
    KeywordMapper::builder("identifier")
        .category_list(
            "keyword.control",
            "break|case|continue|default|do|else|for|if|in|return|switch|while|then",
        )
        .category_list(
            "storage.type",
            "local|global|subroutine|function|database|dbalias|verb|task",
        )
        .category_list("storage.modifier", "extern")
        .category_list("keyword.operator", "and|or")
        .category_list("variable.language", "this")
        .category_list("constant.language", "TRUE|FALSE")
        .build()
}

/// The full Rapture grammar, doc comments already embedded under `doc-`.
pub fn grammar() -> Result<Grammar, ConfigError> {
    host().embed(
        &doc_comment::grammar(),
        "doc-",
        &[doc_comment::end_binding("start")],
    )
}

fn host() -> Grammar {
    let words = Arc::new(keywords());

    let mut start = doc_comment::start_rules("doc-start");
    start.extend([
        RuleDef::new(r"\(\*", "comment").goto("comment"),
        // strings: closed on the line, continued with `\`, or left open
        RuleDef::new(r#"["](?:(?:\\.)|(?:[^"\\]))*?["]"#, "string"),
        RuleDef::new(r#"["].*\\$"#, "string").goto("qqstring"),
        RuleDef::new(r#"["](?:(?:\\.)|(?:[^"\\]))*$"#, "string").goto("qqstring"),
        RuleDef::new(r"['](?:(?:\\.)|(?:[^'\\]))*?[']", "string"),
        RuleDef::new(r"['].*\\$", "string").goto("qstring"),
        RuleDef::new(r"['](?:(?:\\.)|(?:[^'\\]))*$", "string").goto("qstring"),
        RuleDef::new(
            r"[+-]?[0-9]+(?:(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?)?(?:L|l|UL|ul|u|U|F|f|ll|LL|ull|ULL)?(?-u:\b)",
            "constant.numeric",
        ),
        RuleDef::new(r"#\s*(?:include|import|pragma|line|define|undef)(?-u:\b)", "keyword")
            .goto("directive"),
        RuleDef::new(r"#\s*(?:endif|if|ifdef|else|elif|ifndef)(?-u:\b)", "keyword"),
        RuleDef::new(BUILTIN_FUNCTIONS, "support.function"),
        RuleDef::classify(r"[a-zA-Z_$][a-zA-Z0-9_$]*(?-u:\b)", words),
        RuleDef::new(OPERATORS, "keyword.operator"),
        RuleDef::new(r"\?|:|,|;|\.", "punctuation.operator"),
        RuleDef::new(r"[\[({]", "paren.lparen"),
        RuleDef::new(r"[\])}]", "paren.rparen"),
        RuleDef::new(r"\s+", "text"),
    ]);

    Grammar::new()
        .rules("start", start)
        .rules(
            "comment",
            vec![
                RuleDef::new(r".*?\*\)", "comment").goto("start"),
                RuleDef::new(".+", "comment"),
            ],
        )
        .state(
            "qqstring",
            StateDef::new(vec![
                RuleDef::new(r#"(?:(?:\\.)|(?:[^"\\]))*?""#, "string").goto("start"),
            ])
            .with_default_token("string"),
        )
        .state(
            "qstring",
            StateDef::new(vec![
                RuleDef::new(r"(?:(?:\\.)|(?:[^'\\]))*?'", "string").goto("start"),
            ])
            .with_default_token("string"),
        )
        .rules(
            "directive",
            vec![
                RuleDef::new(r"\\", "constant.other.multiline"),
                RuleDef::new(r".*\\", "constant.other.multiline"),
                RuleDef::new(r"\s*<.+?>", "constant.other").goto("start"),
                RuleDef::new(r#"\s*["](?:(?:\\.)|(?:[^"\\]))*?["]"#, "constant.other")
                    .goto("start"),
                RuleDef::new(r"\s*['](?:(?:\\.)|(?:[^'\\]))*?[']", "constant.other")
                    .goto("start"),
                // `\` continues the directive, `/` may start a comment
                RuleDef::new(r"[^\\/]+", "constant.other").goto("start"),
            ],
        )
}
