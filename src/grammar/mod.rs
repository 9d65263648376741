/*
    This module is for storing and querying grammars
*/

use std::collections::BTreeSet;
use std::fmt::Display;

// The base unit in a production. The textual conventions of the grammar
// format (uppercase first letter, `@` prefixes) are translated into this
// tagged form at the loading boundary and never consulted again.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
    Epsilon,
    Action(String),
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(name) => write!(f, "{}", name),
            Symbol::Nonterminal(name) => write!(f, "{}", name),
            Symbol::Epsilon => write!(f, "@epsilon"),
            Symbol::Action(name) => write!(f, "@{}", name),
        }
    }
}

// One alternative of a rewrite rule
#[derive(Debug, PartialEq, Clone)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Production {
    // An empty rhs and a lone epsilon both denote the empty alternative
    pub fn is_empty_alternative(&self) -> bool {
        match self.rhs.as_slice() {
            [] => true,
            [Symbol::Epsilon] => true,
            _ => false,
        }
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct Grammar {
    // Order matters: the first production's lhs is the start symbol
    pub productions: Vec<Production>,
    pub terminals: BTreeSet<String>,
    pub nonterminals: BTreeSet<String>,
}

impl Grammar {
    pub fn start_symbol(&self) -> &str {
        &self.productions[0].lhs
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.contains(name)
    }
}
