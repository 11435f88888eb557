//! Command-line interface for hiline
//! Tokenizes source files with the built-in syntaxes or a grammar file and prints the
//! tokens in one of several formats.
//!
//! Usage:
//!   hiline tokenize `<path>` [--syntax `<id>`] [--grammar `<file>`] [--format `<format>`]
//!   hiline syntaxes                                   - List the built-in syntaxes
//!   hiline check `<grammar-file>`                     - Validate a grammar file

mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use hiline_config::{HilineConfig, Loader};
use hiline_engine::{Grammar, RuleTable, Session};
use hiline_modes::SyntaxRegistry;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

fn main() {
    let matches = Command::new("hiline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Line-oriented syntax highlighting tokenizer")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (repeat for debug and trace output)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("tokenize")
                .about("Tokenize a file and print its tokens")
                .arg(
                    Arg::new("path")
                        .help("File to tokenize, or - for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("syntax")
                        .long("syntax")
                        .short('s')
                        .help("Syntax id (default: chosen from the file extension)")
                        .conflicts_with("grammar"),
                )
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("YAML or JSON grammar file to use instead of a built-in syntax"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: simple, json or classes (default from config)"),
                )
                .arg(
                    Arg::new("coalesce")
                        .long("coalesce")
                        .help("Merge neighbouring tokens of the same category")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("max-tokens")
                        .long("max-tokens")
                        .help("Stop classifying a line after this many tokens (0: no limit)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                ),
        )
        .subcommand(Command::new("syntaxes").about("List the available syntaxes"))
        .subcommand(
            Command::new("check")
                .about("Load and compile a grammar file, reporting any error")
                .arg(
                    Arg::new("grammar")
                        .help("YAML or JSON grammar file")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("tokenize", sub)) => handle_tokenize_command(sub),
        Some(("syntaxes", _)) => handle_syntaxes_command(),
        Some(("check", sub)) => {
            let path = sub
                .get_one::<String>("grammar")
                .expect("grammar is required");
            handle_check_command(path);
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Handle the tokenize command
fn handle_tokenize_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");

    let config = load_config(matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let table = resolve_table(matches, path, &config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    let table = match config.tokenize.token_limit() {
        Some(limit) => Arc::new((*table).clone().with_token_limit(limit)),
        None => table,
    };

    let source = read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });
    // a final newline ends the last line, it does not open a new one
    let source = source.strip_suffix('\n').unwrap_or(&source);

    let mut session = Session::with_text(&*table, source);
    let lines = session.tokenize_all();
    let formatted = output::render(&lines, config.output.format, config.tokenize.coalesce)
        .unwrap_or_else(|e| {
            eprintln!("Error formatting tokens: {}", e);
            std::process::exit(1);
        });

    print!("{}", formatted);
}

/// Handle the syntaxes command
fn handle_syntaxes_command() {
    let registry = SyntaxRegistry::builtin();
    println!("Available syntaxes:\n");
    for syntax in registry.iter() {
        let descriptor = &syntax.descriptor;
        println!("  {} ({})", descriptor.id, descriptor.caption);
        println!("    extensions: .{}", descriptor.extensions.join(", ."));
        println!();
    }
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let table = load_grammar_file(path).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    println!(
        "{}: ok ({} states, starts in '{}')",
        path,
        table.state_count(),
        table.start()
    );
}

fn load_config(matches: &ArgMatches) -> Result<HilineConfig, String> {
    let mut loader = Loader::new();
    if let Some(file) = matches.get_one::<String>("config") {
        loader = loader.with_file(file);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        if output::parse_format(format).is_none() {
            return Err(format!(
                "unknown format '{}' (available: {})",
                format,
                output::AVAILABLE_FORMATS.join(", ")
            ));
        }
        loader = loader
            .set_override("output.format", format.as_str())
            .map_err(|e| e.to_string())?;
    }
    if matches.get_flag("coalesce") {
        loader = loader
            .set_override("tokenize.coalesce", true)
            .map_err(|e| e.to_string())?;
    }
    if let Some(limit) = matches.get_one::<usize>("max-tokens") {
        loader = loader
            .set_override("tokenize.max_tokens_per_line", *limit as u64)
            .map_err(|e| e.to_string())?;
    }
    loader.build().map_err(|e| e.to_string())
}

fn resolve_table(
    matches: &ArgMatches,
    path: &str,
    config: &HilineConfig,
) -> Result<Arc<RuleTable>, String> {
    if let Some(grammar) = matches.get_one::<String>("grammar") {
        return load_grammar_file(grammar).map(Arc::new);
    }

    let mut registry = SyntaxRegistry::builtin();
    for (id, extensions) in &config.syntax.extensions {
        registry
            .add_extensions(id, extensions)
            .map_err(|e| format!("Configuration error: {}", e))?;
    }

    let syntax = match matches.get_one::<String>("syntax") {
        Some(id) => registry.get(id).ok_or_else(|| {
            let known: Vec<&str> = registry.iter().map(|s| s.descriptor.id.as_str()).collect();
            format!("Unknown syntax '{}' (available: {})", id, known.join(", "))
        })?,
        None => registry.for_path(Path::new(path)).ok_or_else(|| {
            format!(
                "No syntax registered for '{}'; pass --syntax or --grammar",
                path
            )
        })?,
    };
    log::info!("using syntax '{}'", syntax.descriptor.id);
    Ok(Arc::clone(&syntax.table))
}

fn load_grammar_file(path: &str) -> Result<RuleTable, String> {
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path, e))?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let grammar = if is_json {
        Grammar::from_json_str(&source)
    } else {
        Grammar::from_yaml_str(&source)
    };
    grammar
        .and_then(|g| g.compile())
        .map_err(|e| format!("Invalid grammar {}: {}", path, e))
}

fn read_source(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}
