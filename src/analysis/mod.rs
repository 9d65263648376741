/*
    This module computes First and Follow sets by fixpoint iteration
*/

pub mod table;

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::fmt::Write;

use crate::grammar::{Grammar, Symbol};
use table::{build_parse_table, Conflict, ParseTable};

// One lookahead position: either a concrete token or the end of the input
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Lookahead {
    Token(String),
    End,
}

impl Display for Lookahead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookahead::Token(name) => write!(f, "{}", name),
            Lookahead::End => write!(f, "$"),
        }
    }
}

// The First set of a symbol or symbol sequence. `empty` is the distinguished
// derives-the-empty-string marker, kept apart from the token universe.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct FirstSet {
    pub tokens: BTreeSet<String>,
    pub empty: bool,
}

impl FirstSet {
    fn of_terminal(name: &str) -> Self {
        FirstSet {
            tokens: BTreeSet::from([name.to_string()]),
            empty: false,
        }
    }

    // Union in another set, reporting whether anything was new
    fn absorb(&mut self, other: FirstSet) -> bool {
        let before = (self.tokens.len(), self.empty);
        self.tokens.extend(other.tokens);
        self.empty |= other.empty;
        (self.tokens.len(), self.empty) != before
    }
}

pub type FirstSets = HashMap<String, FirstSet>;
pub type FollowSets = HashMap<String, BTreeSet<Lookahead>>;

// First of a symbol sequence: walk left to right, stop at the first symbol
// that cannot derive the empty string. Epsilon and semantic actions consume
// no input, so they are transparent here.
pub fn first_of_sequence(sequence: &[Symbol], first: &FirstSets) -> FirstSet {
    let mut result = FirstSet::default();

    for symbol in sequence {
        match symbol {
            Symbol::Epsilon | Symbol::Action(_) => continue,
            Symbol::Terminal(name) => {
                result.tokens.insert(name.clone());
                return result;
            }
            Symbol::Nonterminal(name) => {
                let Some(symbol_first) = first.get(name) else {
                    return result;
                };
                result.tokens.extend(symbol_first.tokens.iter().cloned());
                if !symbol_first.empty {
                    return result;
                }
            }
        }
    }

    // every symbol could derive the empty string (trivially so for an
    // empty sequence)
    result.empty = true;
    return result;
}

pub fn first_sets(grammar: &Grammar) -> FirstSets {
    let mut first = FirstSets::new();

    // terminals are seeded with themselves once and never change
    for terminal in &grammar.terminals {
        first.insert(terminal.clone(), FirstSet::of_terminal(terminal));
    }
    for nonterminal in &grammar.nonterminals {
        first.insert(nonterminal.clone(), FirstSet::default());
    }

    // sets only ever grow and the token universe is finite, so this
    // terminates
    loop {
        let mut updated = false;

        for production in &grammar.productions {
            let contribution = if production.is_empty_alternative() {
                FirstSet {
                    tokens: BTreeSet::new(),
                    empty: true,
                }
            } else {
                first_of_sequence(&production.rhs, &first)
            };
            if let Some(entry) = first.get_mut(&production.lhs) {
                updated |= entry.absorb(contribution);
            }
        }

        if !updated {
            break;
        }
    }

    return first;
}

// Follow sets need finalized First sets, which the signature enforces
pub fn follow_sets(grammar: &Grammar, first: &FirstSets) -> FollowSets {
    let mut follow: FollowSets = grammar
        .nonterminals
        .iter()
        .map(|name| (name.clone(), BTreeSet::new()))
        .collect();

    // only the start symbol can be followed by the end of the input, at
    // least until the fixpoint spreads it around
    if let Some(start) = follow.get_mut(grammar.start_symbol()) {
        start.insert(Lookahead::End);
    }

    loop {
        let mut updated = false;

        for production in &grammar.productions {
            for (position, symbol) in production.rhs.iter().enumerate() {
                let Symbol::Nonterminal(name) = symbol else {
                    continue;
                };

                let rest_first = first_of_sequence(&production.rhs[position + 1..], first);

                let mut additions: BTreeSet<Lookahead> = rest_first
                    .tokens
                    .iter()
                    .map(|token| Lookahead::Token(token.clone()))
                    .collect();
                // when everything to the right can vanish, whatever follows
                // the left-hand side follows this symbol too
                if rest_first.empty {
                    if let Some(lhs_follow) = follow.get(&production.lhs) {
                        additions.extend(lhs_follow.iter().cloned());
                    }
                }

                if let Some(entry) = follow.get_mut(name) {
                    let before = entry.len();
                    entry.extend(additions);
                    updated |= entry.len() != before;
                }
            }
        }

        if !updated {
            break;
        }
    }

    return follow;
}

// Everything derived from one grammar. Immutable once built; conflicted
// grammars never produce a value of this type.
#[derive(Debug)]
pub struct Analysis {
    pub first: FirstSets,
    pub follow: FollowSets,
    pub table: ParseTable,
}

pub fn analyze(grammar: &Grammar) -> Result<Analysis, Vec<Conflict>> {
    let first = first_sets(grammar);
    let follow = follow_sets(grammar, &first);
    let table = build_parse_table(grammar, &first, &follow)?;

    Ok(Analysis {
        first,
        follow,
        table,
    })
}

// Renders First sets, Follow sets and the parse table for human eyes
pub fn report(grammar: &Grammar, analysis: &Analysis) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "First sets:");
    for name in &grammar.nonterminals {
        if let Some(first) = analysis.first.get(name) {
            let mut members = first.tokens.iter().cloned().collect::<Vec<_>>();
            if first.empty {
                members.push("epsilon".to_string());
            }
            let _ = writeln!(out, "  {}: {{ {} }}", name, members.join(" "));
        }
    }

    let _ = writeln!(out, "Follow sets:");
    for name in &grammar.nonterminals {
        if let Some(follow) = analysis.follow.get(name) {
            let members = follow.iter().map(Lookahead::to_string).collect::<Vec<_>>();
            let _ = writeln!(out, "  {}: {{ {} }}", name, members.join(" "));
        }
    }

    let _ = writeln!(out, "Parse table:");
    let mut cells = analysis.table.cells().collect::<Vec<_>>();
    cells.sort();
    for ((nonterminal, lookahead), production) in cells {
        let _ = writeln!(
            out,
            "  ({}, {}) -> {}",
            nonterminal, lookahead, grammar.productions[*production]
        );
    }

    return out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Production;

    fn terminal(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    fn nonterminal(text: &str) -> Symbol {
        Symbol::Nonterminal(text.to_string())
    }

    fn action(text: &str) -> Symbol {
        Symbol::Action(text.to_string())
    }

    fn production(lhs: &str, rhs: Vec<Symbol>) -> Production {
        Production {
            lhs: lhs.to_string(),
            rhs,
        }
    }

    // Derives the symbol registries the loader would have built
    fn grammar_of(productions: Vec<Production>) -> Grammar {
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
        Grammar {
            productions,
            terminals,
            nonterminals,
        }
    }

    // The classic expression grammar, with the semantic actions in place
    pub(super) fn expression_grammar() -> Grammar {
        grammar_of(vec![
            production("E", vec![nonterminal("T"), nonterminal("Etail")]),
            production(
                "Etail",
                vec![terminal("+"), nonterminal("T"), action("add"), nonterminal("Etail")],
            ),
            production("Etail", vec![Symbol::Epsilon]),
            production("T", vec![nonterminal("F"), nonterminal("Ttail")]),
            production(
                "Ttail",
                vec![terminal("*"), nonterminal("F"), action("mul"), nonterminal("Ttail")],
            ),
            production("Ttail", vec![Symbol::Epsilon]),
            production(
                "F",
                vec![terminal("("), nonterminal("E"), terminal(")"), action("value")],
            ),
            production("F", vec![terminal("id"), action("value")]),
        ])
    }

    fn tokens(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn lookaheads(names: &[&str]) -> BTreeSet<Lookahead> {
        names
            .iter()
            .map(|n| match *n {
                "$" => Lookahead::End,
                name => Lookahead::Token(name.to_string()),
            })
            .collect()
    }

    #[test]
    fn first_sets_of_expression_grammar() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);

        assert_eq!(first["E"].tokens, tokens(&["(", "id"]));
        assert!(!first["E"].empty);
        assert_eq!(first["T"].tokens, tokens(&["(", "id"]));
        assert_eq!(first["F"].tokens, tokens(&["(", "id"]));
        assert_eq!(first["Etail"].tokens, tokens(&["+"]));
        assert!(first["Etail"].empty);
        assert_eq!(first["Ttail"].tokens, tokens(&["*"]));
        assert!(first["Ttail"].empty);
    }

    #[test]
    fn terminals_are_their_own_first() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);

        assert_eq!(first["+"], FirstSet::of_terminal("+"));
        assert_eq!(first["id"], FirstSet::of_terminal("id"));
    }

    #[test]
    fn follow_sets_of_expression_grammar() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);
        let follow = follow_sets(&grammar, &first);

        assert_eq!(follow["E"], lookaheads(&["$", ")"]));
        assert_eq!(follow["Etail"], lookaheads(&["$", ")"]));
        assert_eq!(follow["T"], lookaheads(&["+", "$", ")"]));
        assert_eq!(follow["Ttail"], lookaheads(&["+", "$", ")"]));
        assert_eq!(follow["F"], lookaheads(&["*", "+", "$", ")"]));
    }

    #[test]
    fn sequence_first_stops_at_solid_symbols() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);

        // Etail can vanish, so `id` shows through; T cannot, so `)` does not
        let nullable_head = [nonterminal("Etail"), terminal("id")];
        let result = first_of_sequence(&nullable_head, &first);
        assert_eq!(result.tokens, tokens(&["+", "id"]));
        assert!(!result.empty);

        let solid_head = [nonterminal("T"), terminal(")")];
        let result = first_of_sequence(&solid_head, &first);
        assert_eq!(result.tokens, tokens(&["(", "id"]));
        assert!(!result.empty);
    }

    #[test]
    fn sequence_first_of_empty_forms() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);

        assert_eq!(
            first_of_sequence(&[], &first),
            FirstSet { tokens: BTreeSet::new(), empty: true }
        );
        assert_eq!(
            first_of_sequence(&[Symbol::Epsilon], &first),
            FirstSet { tokens: BTreeSet::new(), empty: true }
        );
    }

    #[test]
    fn actions_are_transparent_to_first() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);

        let sequence = [action("value"), terminal("id")];
        assert_eq!(first_of_sequence(&sequence, &first).tokens, tokens(&["id"]));
    }

    #[test]
    fn all_nullable_sequence_keeps_the_marker() {
        let grammar = expression_grammar();
        let first = first_sets(&grammar);

        let sequence = [nonterminal("Etail"), nonterminal("Ttail")];
        let result = first_of_sequence(&sequence, &first);
        assert_eq!(result.tokens, tokens(&["+", "*"]));
        assert!(result.empty);
    }

    #[test]
    fn analyze_bundles_everything() {
        let grammar = expression_grammar();
        let analysis = analyze(&grammar).unwrap();

        assert_eq!(analysis.table.len(), 13);
        assert!(analysis.first["E"].tokens.contains("id"));
    }

    #[test]
    fn report_mentions_all_sections() {
        let grammar = expression_grammar();
        let analysis = analyze(&grammar).unwrap();
        let text = report(&grammar, &analysis);

        assert!(text.contains("First sets:"));
        assert!(text.contains("  Etail: { + epsilon }"));
        assert!(text.contains("Follow sets:"));
        assert!(text.contains("  F: { ) * + $ }"));
        assert!(text.contains("Parse table:"));
        assert!(text.contains("  (F, id) -> F -> id @value"));
    }
}
