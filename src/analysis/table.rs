use std::collections::HashMap;
use std::fmt::Display;

use super::{first_of_sequence, FirstSets, FollowSets, Lookahead};
use crate::grammar::Grammar;

// A cell claimed by two or more productions: the grammar is not LL(1)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Conflict {
    pub nonterminal: String,
    pub lookahead: Lookahead,
    pub productions: Vec<usize>,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Grammar is not LL(1): cell ({}, {}) is claimed by productions {}",
            self.nonterminal,
            self.lookahead,
            self.productions
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(" and ")
        )
    }
}

// The predictive parse table. Each cell holds the index of the single
// production to expand; a value of this type only exists for grammars
// where that uniqueness actually holds.
#[derive(Debug)]
pub struct ParseTable {
    cells: HashMap<(String, Lookahead), usize>,
}

impl ParseTable {
    pub fn lookup(&self, nonterminal: &str, lookahead: &Lookahead) -> Option<usize> {
        self.cells
            .get(&(nonterminal.to_string(), lookahead.clone()))
            .copied()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&(String, Lookahead), &usize)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

// Places every production into its cells while remembering each cell's full
// candidate list, so that conflicts are detected instead of overwritten.
pub fn build_parse_table(
    grammar: &Grammar,
    first: &FirstSets,
    follow: &FollowSets,
) -> Result<ParseTable, Vec<Conflict>> {
    let mut candidates: HashMap<(String, Lookahead), Vec<usize>> = HashMap::new();

    let mut claim = |cell: (String, Lookahead), index: usize| {
        let claimants = candidates.entry(cell).or_default();
        // one production may reach the same cell through First and Follow;
        // only distinct productions conflict
        if !claimants.contains(&index) {
            claimants.push(index);
        }
    };

    for (index, production) in grammar.productions.iter().enumerate() {
        let rhs_first = first_of_sequence(&production.rhs, first);

        for token in &rhs_first.tokens {
            claim((production.lhs.clone(), Lookahead::Token(token.clone())), index);
        }

        // a vanishing right-hand side is predicted by whatever may follow
        if rhs_first.empty {
            if let Some(lhs_follow) = follow.get(&production.lhs) {
                for lookahead in lhs_follow {
                    claim((production.lhs.clone(), lookahead.clone()), index);
                }
            }
        }
    }

    let mut conflicts: Vec<Conflict> = candidates
        .iter()
        .filter(|(_, claimants)| claimants.len() > 1)
        .map(|((nonterminal, lookahead), claimants)| Conflict {
            nonterminal: nonterminal.clone(),
            lookahead: lookahead.clone(),
            productions: claimants.clone(),
        })
        .collect();

    if !conflicts.is_empty() {
        conflicts.sort();
        return Err(conflicts);
    }

    let cells = candidates
        .into_iter()
        .filter_map(|(cell, claimants)| claimants.first().map(|&index| (cell, index)))
        .collect();

    return Ok(ParseTable { cells });
}

#[cfg(test)]
mod tests {
    use super::super::tests::expression_grammar;
    use super::super::{analyze, first_sets, follow_sets};
    use super::*;
    use crate::grammar::{Production, Symbol};
    use std::collections::BTreeSet;

    fn table_of(grammar: &Grammar) -> ParseTable {
        let first = first_sets(grammar);
        let follow = follow_sets(grammar, &first);
        build_parse_table(grammar, &first, &follow).unwrap()
    }

    #[test]
    fn cells_from_first_sets() {
        let grammar = expression_grammar();
        let table = table_of(&grammar);

        // productions predicted by their leading tokens
        assert_eq!(table.lookup("E", &Lookahead::Token("(".to_string())), Some(0));
        assert_eq!(table.lookup("E", &Lookahead::Token("id".to_string())), Some(0));
        assert_eq!(table.lookup("Etail", &Lookahead::Token("+".to_string())), Some(1));
        assert_eq!(table.lookup("F", &Lookahead::Token("(".to_string())), Some(6));
        assert_eq!(table.lookup("F", &Lookahead::Token("id".to_string())), Some(7));
    }

    #[test]
    fn nullable_productions_claim_follow_cells() {
        let grammar = expression_grammar();
        let table = table_of(&grammar);

        // Etail -> @epsilon sits under everything in Follow(Etail)
        assert_eq!(table.lookup("Etail", &Lookahead::Token(")".to_string())), Some(2));
        assert_eq!(table.lookup("Etail", &Lookahead::End), Some(2));
        assert_eq!(table.lookup("Ttail", &Lookahead::Token("+".to_string())), Some(5));
        assert_eq!(table.lookup("Ttail", &Lookahead::End), Some(5));
    }

    #[test]
    fn missing_cells_stay_missing() {
        let grammar = expression_grammar();
        let table = table_of(&grammar);

        assert_eq!(table.lookup("E", &Lookahead::Token("+".to_string())), None);
        assert_eq!(table.lookup("E", &Lookahead::End), None);
        assert_eq!(table.lookup("F", &Lookahead::Token(")".to_string())), None);
    }

    #[test]
    fn expression_grammar_cell_count() {
        let grammar = expression_grammar();

        assert_eq!(table_of(&grammar).len(), 13);
    }

    #[test]
    fn overlapping_lookahead_is_a_conflict() {
        // S -> a B and S -> a c both start with `a`
        let productions = vec![
            Production {
                lhs: "S".to_string(),
                rhs: vec![
                    Symbol::Terminal("a".to_string()),
                    Symbol::Nonterminal("B".to_string()),
                ],
            },
            Production {
                lhs: "S".to_string(),
                rhs: vec![
                    Symbol::Terminal("a".to_string()),
                    Symbol::Terminal("c".to_string()),
                ],
            },
            Production {
                lhs: "B".to_string(),
                rhs: vec![Symbol::Terminal("b".to_string())],
            },
        ];
        let grammar = Grammar {
            productions,
            terminals: BTreeSet::from(["a".to_string(), "b".to_string(), "c".to_string()]),
            nonterminals: BTreeSet::from(["S".to_string(), "B".to_string()]),
        };

        let conflicts = analyze(&grammar).unwrap_err();

        assert_eq!(
            conflicts,
            vec![Conflict {
                nonterminal: "S".to_string(),
                lookahead: Lookahead::Token("a".to_string()),
                productions: vec![0, 1],
            }]
        );
    }

    #[test]
    fn nullable_first_follow_overlap_is_a_conflict() {
        // B can vanish, and `b` is both in First(B) and Follow(B)
        let productions = vec![
            Production {
                lhs: "S".to_string(),
                rhs: vec![
                    Symbol::Nonterminal("B".to_string()),
                    Symbol::Terminal("b".to_string()),
                ],
            },
            Production {
                lhs: "B".to_string(),
                rhs: vec![Symbol::Terminal("b".to_string())],
            },
            Production {
                lhs: "B".to_string(),
                rhs: vec![Symbol::Epsilon],
            },
        ];
        let grammar = Grammar {
            productions,
            terminals: BTreeSet::from(["b".to_string()]),
            nonterminals: BTreeSet::from(["S".to_string(), "B".to_string()]),
        };

        let conflicts = analyze(&grammar).unwrap_err();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].nonterminal, "B");
        assert_eq!(conflicts[0].lookahead, Lookahead::Token("b".to_string()));
        assert_eq!(conflicts[0].productions, vec![1, 2]);
    }

    #[test]
    fn conflict_display_names_the_cell() {
        let conflict = Conflict {
            nonterminal: "S".to_string(),
            lookahead: Lookahead::Token("a".to_string()),
            productions: vec![0, 1],
        };

        assert_eq!(
            conflict.to_string(),
            "Grammar is not LL(1): cell (S, a) is claimed by productions 0 and 1"
        );
    }
}
