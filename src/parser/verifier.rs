use std::collections::BTreeSet;

use super::CompileErrorType::{SymbolClash, UndefinedNonterminal};
use super::{CompileError, CompileErrors, FileResult, Rule};
use crate::grammar::Symbol;

// Names defined by a rule with at least one alternative
fn defined_nonterminals(rules: &[Rule]) -> BTreeSet<&str> {
    rules
        .iter()
        .filter(|rule| !rule.alternatives.is_empty())
        .map(|rule| rule.lhs.as_str())
        .collect()
}

fn rule_offenses(rule: &Rule, defined: &BTreeSet<&str>) -> CompileErrors {
    rule.alternatives
        .iter()
        .flatten()
        .filter_map(|symbol| match symbol {
            // every used non-terminal must have a definition
            Symbol::Nonterminal(name) if !defined.contains(name.as_str()) => {
                Some(UndefinedNonterminal(name.clone()))
            }
            // and no name may be classified both ways
            Symbol::Terminal(name) if defined.contains(name.as_str()) => {
                Some(SymbolClash(name.clone()))
            }
            _ => None,
        })
        .map(|error| CompileError {
            location: rule.location.clone(),
            error,
        })
        .collect()
}

// Checks the structural rules a grammar description must satisfy before a
// Grammar may be built from it. Any offense fails the whole load.
pub fn verify_rules(rules: &[Rule]) -> FileResult<()> {
    let defined = defined_nonterminals(rules);

    let errors: CompileErrors = rules
        .iter()
        .flat_map(|rule| rule_offenses(rule, &defined))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
