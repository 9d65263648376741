/*
    This module drives the table-based predictive parser
*/

mod actions;
pub mod attributes;

use std::fmt::Display;

use crate::analysis::{Analysis, Lookahead};
use crate::grammar::{Grammar, Symbol};
use crate::ir::IntermediateProgram;
use attributes::{Attribute, FrameStack};

// One element of the pre-lexed input stream
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub name: String,
    pub attr: Attribute,
}

impl Token {
    pub fn new(name: impl Into<String>, attr: Attribute) -> Self {
        Token {
            name: name.into(),
            attr,
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Token::new(name, Attribute::default())
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    // The input ran out while a terminal was still expected
    UnexpectedEnd { expected: String },
    // The next token is not the terminal the grammar demands
    Mismatch { expected: String, found: String, position: usize },
    // No table cell applies to this non-terminal and lookahead
    NoProduction { nonterminal: String, found: String, position: usize },
    // A semantic action read a value nothing ever produced
    MissingAttribute { action: String, what: String },
    // The grammar names an action this interpreter does not know
    UnknownAction { action: String },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnexpectedEnd { expected } => {
                write!(f, "Syntax error: unexpected end of input, expected `{}`", expected)
            }
            ParseError::Mismatch { expected, found, position } => {
                write!(f, "Syntax error at token {}: expected `{}`, found `{}`", position, expected, found)
            }
            ParseError::NoProduction { nonterminal, found, position } => {
                write!(f, "Syntax error at token {}: no production for `{}` on `{}`", position, nonterminal, found)
            }
            ParseError::MissingAttribute { action, what } => {
                write!(f, "Action `@{}` found no attribute for its {}", action, what)
            }
            ParseError::UnknownAction { action } => {
                write!(f, "No handler for action `@{}`", action)
            }
        }
    }
}

// An entry of the parse stack: a grammar symbol tied to the attribute slot
// it must fill, or the end marker pushed underneath everything else
enum StackItem<'a> {
    EndMarker,
    Entry {
        symbol: &'a Symbol,
        frame: usize,
        slot: usize,
    },
}

// The predictive parser. Borrows the grammar and its analysis read-only,
// so one engine (or several) can serve any number of parses; all mutable
// state lives inside a single `parse` call.
pub struct Engine<'g> {
    grammar: &'g Grammar,
    analysis: &'g Analysis,
}

impl<'g> Engine<'g> {
    pub fn new(grammar: &'g Grammar, analysis: &'g Analysis) -> Self {
        Engine { grammar, analysis }
    }

    pub fn parse(&self, input: &[Token]) -> Result<IntermediateProgram, ParseError> {
        let mut code = IntermediateProgram::new();
        let mut frames = FrameStack::root();
        let mut cursor = 0;

        let start = Symbol::Nonterminal(self.grammar.start_symbol().to_string());
        let mut stack = vec![
            StackItem::EndMarker,
            StackItem::Entry {
                symbol: &start,
                frame: 0,
                slot: 0,
            },
        ];

        while let Some(item) = stack.pop() {
            let StackItem::Entry { symbol, frame, slot } = item else {
                // the end marker: the input must be exhausted exactly here
                return match input.get(cursor) {
                    None => Ok(code),
                    Some(token) => Err(ParseError::Mismatch {
                        expected: Lookahead::End.to_string(),
                        found: token.name.clone(),
                        position: cursor,
                    }),
                };
            };

            match symbol {
                Symbol::Epsilon => frames.finish_slot(frame),

                Symbol::Action(name) => {
                    actions::run(name, frames.frame_mut(frame), slot, &mut code)?;
                    frames.finish_slot(frame);
                }

                Symbol::Terminal(expected) => {
                    let Some(token) = input.get(cursor) else {
                        return Err(ParseError::UnexpectedEnd {
                            expected: expected.clone(),
                        });
                    };
                    if token.name != *expected {
                        return Err(ParseError::Mismatch {
                            expected: expected.clone(),
                            found: token.name.clone(),
                            position: cursor,
                        });
                    }
                    frames.write(frame, slot, token.attr.clone());
                    cursor += 1;
                    frames.finish_slot(frame);
                }

                Symbol::Nonterminal(name) => {
                    let lookahead = match input.get(cursor) {
                        Some(token) => Lookahead::Token(token.name.clone()),
                        None => Lookahead::End,
                    };
                    let Some(index) = self.analysis.table.lookup(name, &lookahead) else {
                        return Err(ParseError::NoProduction {
                            nonterminal: name.clone(),
                            found: lookahead.to_string(),
                            position: cursor,
                        });
                    };

                    let production = &self.grammar.productions[index];
                    let child = frames.expand(frame, slot, &production.rhs);
                    // reversed, so the first rhs symbol is handled next
                    for (position, symbol) in production.rhs.iter().enumerate().rev() {
                        stack.push(StackItem::Entry {
                            symbol,
                            frame: child,
                            slot: position,
                        });
                    }
                }
            }
        }

        // the end marker is consulted before the stack can ever drain
        Err(ParseError::UnexpectedEnd {
            expected: Lookahead::End.to_string(),
        })
    }
}
