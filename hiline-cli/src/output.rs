//! Output formats
//!
//! Renders tokenized lines for the terminal (`simple`), for other tools (`json`), or as
//! class-annotated spans ready to be dropped into a page (`classes`).

use hiline_config::OutputFormat;
use hiline_engine::{coalesce, LineState, Token, TokenizedLine};
use serde::Serialize;

/// Names accepted by `--format`
pub const AVAILABLE_FORMATS: &[&str] = &["simple", "json", "classes"];

pub fn parse_format(name: &str) -> Option<OutputFormat> {
    match name {
        "simple" => Some(OutputFormat::Simple),
        "json" => Some(OutputFormat::Json),
        "classes" => Some(OutputFormat::Classes),
        _ => None,
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    line: usize,
    tokens: &'a [Token],
    end_state: &'a LineState,
}

/// Render every line, optionally merging neighbouring tokens of the same category first.
pub fn render(
    lines: &[&TokenizedLine],
    format: OutputFormat,
    merge: bool,
) -> Result<String, String> {
    let lines: Vec<TokenizedLine> = lines
        .iter()
        .map(|line| TokenizedLine {
            tokens: if merge {
                coalesce(line.tokens.clone())
            } else {
                line.tokens.clone()
            },
            end_state: line.end_state.clone(),
        })
        .collect();

    let mut out = String::new();
    for (row, line) in lines.iter().enumerate() {
        match format {
            OutputFormat::Simple => {
                let tokens: Vec<String> = line.tokens.iter().map(Token::to_string).collect();
                out.push_str(&format!("{}: {}", row + 1, tokens.join(" ")));
                if line.end_state.current() != hiline_engine::DEFAULT_START_STATE
                    || line.end_state.depth() > 1
                {
                    out.push_str(&format!("  => {}", line.end_state));
                }
            }
            OutputFormat::Json => {
                let json = JsonLine {
                    line: row + 1,
                    tokens: &line.tokens,
                    end_state: &line.end_state,
                };
                out.push_str(
                    &serde_json::to_string(&json)
                        .map_err(|e| format!("JSON serialization failed: {}", e))?,
                );
            }
            OutputFormat::Classes => {
                for token in &line.tokens {
                    out.push_str(&span(token));
                }
            }
        }
        out.push('\n');
    }
    Ok(out)
}

fn span(token: &Token) -> String {
    let text = escape(&token.value);
    if token.category == hiline_engine::TEXT_CATEGORY {
        return text;
    }
    format!(
        "<span class=\"{}\">{}</span>",
        token.category.replace('.', " "),
        text
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
