use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};
use crate::grammar::Symbol;

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Or,
    Symbol(Symbol),
}

pub fn lex_word(line: &mut impl PeekingNext<Item = char>) -> String {
    line.peeking_take_while(|c| !c.is_whitespace()).collect()
}

// Translates one whitespace-separated word into its tagged form. This is
// the only place the textual conventions (`->`, `|`, `@`, leading case)
// are ever inspected.
pub fn classify(word: &str) -> Result<Token> {
    if word == "->" {
        return Ok(Token::Arrow);
    }
    if word == "|" {
        return Ok(Token::Or);
    }
    if word == "@epsilon" {
        return Ok(Token::Symbol(Symbol::Epsilon));
    }
    if let Some(name) = word.strip_prefix('@') {
        if name.is_empty() {
            return Err(CompileErrorType::EmptyActionName);
        }
        return Ok(Token::Symbol(Symbol::Action(name.to_string())));
    }

    if word.chars().next().is_some_and(char::is_uppercase) {
        Ok(Token::Symbol(Symbol::Nonterminal(word.to_string())))
    } else {
        Ok(Token::Symbol(Symbol::Terminal(word.to_string())))
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if c.is_whitespace() {
            line_chars.next();
        } else {
            tokens.push(classify(&lex_word(&mut line_chars))?);
        }
    }

    return Ok(tokens);
}
