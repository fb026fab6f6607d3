//! Command-line interface for the SECoP transcript lexer
//! This binary tokenizes a transcript (or JSON document) and prints the token stream.
//!
//! Usage:
//!   secop-lex `<path>` [--config `<file>`] [--language `<name>`] [--format `<format>`]
//!   secop-lex - < transcript.txt                               - Read the transcript from stdin
//!   secop-lex --list-languages                                 - List all registered lexers

use std::io::Read;

use clap::{Arg, ArgAction, ArgMatches, Command};
use secop_config::{Loader, SecopConfig};
use secop_lexer::formats::OutputFormat;
use secop_lexer::LexerRegistry;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = Command::new("secop-lex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tokenize SECoP protocol transcripts for highlighting")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the transcript, or '-' for stdin")
                .required_unless_present("list-languages")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the default configuration"),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .short('l')
                .help("Lexer to run (e.g., 'secop', 'json')"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: simple, spans, json or classes"),
        )
        .arg(
            Arg::new("trailing-payload")
                .long("trailing-payload")
                .help("Classify trailing record data as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .help("List registered lexers")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    let registry = LexerRegistry::with_options(&config.lexer).unwrap_or_else(|e| {
        eprintln!("Lexer error: {}", e);
        std::process::exit(1);
    });

    if matches.get_flag("list-languages") {
        handle_list_languages_command(&registry);
        return;
    }

    let path = matches
        .get_one::<String>("path")
        .expect("path is required unless listing languages");
    handle_tokenize_command(&registry, &config, path);
}

/// Layer the user file and command-line overrides over the defaults
fn load_config(matches: &ArgMatches) -> Result<SecopConfig, Box<dyn std::error::Error>> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(language) = matches.get_one::<String>("language") {
        loader = loader.set_override("highlight.language", language.as_str())?;
    }
    if let Some(format) = matches.get_one::<String>("format") {
        // Validate early so the error names the available formats
        let format: OutputFormat = format.parse()?;
        loader = loader.set_override("highlight.format", format.name())?;
    }
    if matches.get_flag("trailing-payload") {
        loader = loader.set_override("lexer.trailing_payload", true)?;
    }
    Ok(loader.build()?)
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

/// Handle the tokenize command
fn handle_tokenize_command(registry: &LexerRegistry, config: &SecopConfig, path: &str) {
    let source = read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    let language = config.highlight.language.as_str();
    let tokens: Vec<_> = registry
        .tokenize(&source, language)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("\nAvailable languages:");
            for name in registry.list_languages() {
                eprintln!("  {}", name);
            }
            std::process::exit(1);
        })
        .collect();
    log::info!("{} tokens from {} bytes of {}", tokens.len(), source.len(), language);

    let output = config.highlight.format.render(&tokens).unwrap_or_else(|e| {
        eprintln!("Error formatting tokens: {}", e);
        std::process::exit(1);
    });
    print!("{}", output);
}

/// Handle the list-languages command
fn handle_list_languages_command(registry: &LexerRegistry) {
    println!("Available languages:\n");

    for name in registry.list_languages() {
        let description = registry.get(&name).map_or("", |lexer| lexer.description());
        println!("  {}", name);
        println!("    {}", description);
    }
}
