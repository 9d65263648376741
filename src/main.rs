mod analysis;
mod cli;
mod engine;
mod error_handling;
mod generator;
mod grammar;
mod ir;
mod parser;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use engine::attributes::Attribute;
use engine::{Engine, Token};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let loaded = match parser::parse_file(&cli.file) {
        Ok(loaded) => loaded,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            return ExitCode::FAILURE;
        }
    };
    // malformed lines were skipped, but the user should hear about them
    for skipped in &loaded.skipped {
        eprintln!("{}", skipped);
    }
    let grammar = loaded.grammar;

    let analysis = match analysis::analyze(&grammar) {
        Ok(analysis) => analysis,
        Err(conflicts) => {
            for conflict in conflicts {
                eprintln!("{}", conflict);
            }
            return ExitCode::FAILURE;
        }
    };

    if cli.print_analysis {
        print!("{}", analysis::report(&grammar, &analysis));
    }

    if let Some(path) = &cli.parser_out {
        if let Err(error) = generator::write_parser(path, &grammar, &analysis) {
            eprintln!("Could not write {}: {}", path.display(), error);
            return ExitCode::FAILURE;
        }
    }

    let engine = Engine::new(&grammar, &analysis);
    let mut last_code = None;
    for path in &cli.input {
        let tokens = match read_tokens(path) {
            Ok(tokens) => tokens,
            Err(error) => {
                eprintln!("Could not read {}: {}", path.display(), error);
                return ExitCode::FAILURE;
            }
        };
        match engine.parse(&tokens) {
            Ok(code) => {
                println!("{}:", path.display());
                print!("{}", code);
                last_code = Some(code);
            }
            Err(error) => {
                eprintln!("{}: {}", path.display(), error);
                return ExitCode::FAILURE;
            }
        }
    }

    if let (Some(path), Some(code)) = (&cli.code_out, &last_code) {
        if let Err(error) = code.save(path) {
            eprintln!("Could not write {}: {}", path.display(), error);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

// A token-stream file is already lexed: each line names a token and,
// optionally, its attribute fields
fn read_tokens(path: &PathBuf) -> io::Result<Vec<Token>> {
    let content = fs::read_to_string(path)?;

    let mut tokens = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        if name.starts_with('#') {
            continue;
        }
        let attr = Attribute {
            value: fields.next().unwrap_or("").to_string(),
            ty: fields.next().unwrap_or("").to_string(),
            extra: fields.next().unwrap_or("").to_string(),
        };
        tokens.push(Token::new(name, attr));
    }

    Ok(tokens)
}
