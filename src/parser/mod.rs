/*
    This module parses grammar description files
*/

mod lexer;
mod verifier;

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use itertools::Itertools;

use crate::error_handling::*;
use crate::grammar::{Grammar, Production, Symbol};
use lexer::Token;
use verifier::verify_rules;

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a production has no arrow
    MissingArrow,
    // An arrow appeared inside a right-hand side
    UnexpectedArrow,
    // The user defines something other than a non-terminal
    MissingNonterminal,
    // A bare `@` with no action name after it
    EmptyActionName,
    // Somehow an alternative still contained the separator
    // This is a problem with llgen, not the grammar
    UnsplitAlternatives,
    // A name is used both as a terminal and as a non-terminal
    SymbolClash(String),
    // A non-terminal is used but never defined
    UndefinedNonterminal(String),
    // The file defines no productions at all
    EmptyGrammar,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        if let CompileErrorType::FileError(a) = self {
            if let CompileErrorType::FileError(b) = other {
                return a.kind() == b.kind();
            }
        }
        return std::mem::discriminant(self) == std::mem::discriminant(other);
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingArrow => write!(f, "Expected `->` after the left-hand side"),
            CompileErrorType::UnexpectedArrow => write!(f, "Unexpected `->` inside a right-hand side"),
            CompileErrorType::MissingNonterminal => write!(f, "Tried to define something other than a non-terminal"),
            CompileErrorType::EmptyActionName => write!(f, "`@` must be followed by an action name"),
            CompileErrorType::UnsplitAlternatives => write!(f, "Alternatives were not fully split (this is a problem with llgen, not the grammar)"),
            CompileErrorType::SymbolClash(name) => write!(f, "`{}` is used both as a terminal and as a non-terminal", name),
            CompileErrorType::UndefinedNonterminal(name) => write!(f, "Could not find a definition for `{}`", name),
            CompileErrorType::EmptyGrammar => write!(f, "No productions found"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location::whole_file(file),
        error: CompileErrorType::FileError(error),
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// A grammar that loaded successfully, along with the malformed lines that
// were skipped on the way. Skipped lines are reported, not fatal.
#[derive(Debug)]
pub struct LoadedGrammar {
    pub grammar: Grammar,
    pub skipped: CompileErrors,
}

#[derive(PartialEq, Debug)]
struct Rule {
    lhs: String,
    alternatives: Vec<Vec<Symbol>>,
    location: Location,
}

fn parse_alternatives(tokens: &[Token]) -> Result<Vec<Vec<Symbol>>> {
    tokens
        .split(|t| *t == Token::Or)
        // an alternative with no symbols at all contributes nothing
        .filter(|alternative| !alternative.is_empty())
        .map(|alternative| {
            alternative
                .iter()
                .map(|token| match token {
                    Token::Arrow => Err(CompileErrorType::UnexpectedArrow),
                    Token::Or => Err(CompileErrorType::UnsplitAlternatives),
                    Token::Symbol(symbol) => Ok(symbol.clone()),
                })
                .collect()
        })
        .collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let lhs = match tokens.first() {
        Some(Token::Symbol(Symbol::Nonterminal(name))) => name.clone(),
        _ => return Err(CompileErrorType::MissingNonterminal),
    };

    if tokens.get(1) != Some(&Token::Arrow) {
        return Err(CompileErrorType::MissingArrow);
    }

    let alternatives = parse_alternatives(&tokens[2..])?;

    return Ok(Rule {
        lhs,
        alternatives,
        location,
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

// Blank lines and `#` comments are not rule lines
fn is_rule_line(line: &String) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

// Returns an iterator over the rule lines of a file, with io errors
// wrapped in CompileError and the line numbers counted from 1
fn file_line_nums<'a>(
    file: File,
    path: &'a PathBuf,
) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.clone())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

fn grammar_from_rules(rules: Vec<Rule>, path: &PathBuf) -> FileResult<Grammar> {
    let productions = rules
        .iter()
        .flat_map(|rule| {
            rule.alternatives.iter().map(|alternative| Production {
                lhs: rule.lhs.clone(),
                rhs: alternative.clone(),
            })
        })
        .collect_vec();

    if productions.is_empty() {
        return Err(vec![CompileError {
            location: Location::whole_file(path.clone()),
            error: CompileErrorType::EmptyGrammar,
        }]);
    }

    verify_rules(&rules)?;

    let mut terminals = BTreeSet::new();
    let mut nonterminals = BTreeSet::new();
    for production in &productions {
        nonterminals.insert(production.lhs.clone());
        for symbol in &production.rhs {
            if let Symbol::Terminal(name) = symbol {
                terminals.insert(name.clone());
            }
        }
    }

    return Ok(Grammar {
        productions,
        terminals,
        nonterminals,
    });
}

pub fn parse_file(path: &PathBuf) -> FileResult<LoadedGrammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.clone())])?;

    let mut rules = Vec::new();
    let mut skipped = Vec::new();
    for (num, line) in file_line_nums(file, path) {
        let line = match line {
            Ok(line) => line,
            Err(error) => return Err(vec![error]),
        };
        match parse_lex_line(&line, Location::at(path.clone(), num)) {
            Ok(rule) => rules.push(rule),
            // a malformed line is skipped, recorded, and the load goes on
            Err(error) => skipped.push(error),
        }
    }

    let grammar = grammar_from_rules(rules, path)?;

    return Ok(LoadedGrammar { grammar, skipped });
}
