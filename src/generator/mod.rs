/*
    This module emits a standalone table-driven parser as Rust source
*/

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::PathBuf;

use itertools::Itertools;

use crate::analysis::Analysis;
use crate::grammar::{Grammar, Symbol};

// Serializes an already-validated parse table into the source text of a
// self-contained recognizer. Semantic actions are left out: the emitted
// parser only answers whether a token stream belongs to the grammar.
// Taking `Analysis` means a conflicted grammar can never get this far.
pub fn parser_source(grammar: &Grammar, analysis: &Analysis) -> String {
    let mut cells = analysis.table.cells().collect_vec();
    cells.sort();

    let nonterminal_patterns = grammar
        .nonterminals
        .iter()
        .map(|name| format!("{:?}", name))
        .join(" | ");

    let mut source = String::new();
    let _ = writeln!(source, "// Generated by llgen. Do not edit.");
    let _ = writeln!(source);
    let _ = writeln!(source, "use std::collections::HashMap;");
    let _ = writeln!(source);
    let _ = writeln!(source, "const END: &str = \"$\";");
    let _ = writeln!(source);
    let _ = writeln!(source, "pub struct Parser {{");
    let _ = writeln!(
        source,
        "    table: HashMap<(&'static str, &'static str), &'static [&'static str]>,"
    );
    let _ = writeln!(source, "}}");
    let _ = writeln!(source);
    let _ = writeln!(source, "impl Parser {{");
    let _ = writeln!(source, "    pub fn new() -> Parser {{");
    let _ = writeln!(
        source,
        "        let mut table: HashMap<(&'static str, &'static str), &'static [&'static str]> ="
    );
    let _ = writeln!(source, "            HashMap::new();");
    for ((nonterminal, lookahead), &index) in cells {
        let rhs = grammar.productions[index]
            .rhs
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Terminal(name) | Symbol::Nonterminal(name) => {
                    Some(format!("{:?}", name))
                }
                Symbol::Epsilon | Symbol::Action(_) => None,
            })
            .join(", ");
        let _ = writeln!(
            source,
            "        table.insert(({:?}, {:?}), &[{}][..]);",
            nonterminal,
            lookahead.to_string(),
            rhs
        );
    }
    let _ = writeln!(source, "        Parser {{ table }}");
    let _ = writeln!(source, "    }}");
    let _ = writeln!(source);
    let _ = writeln!(source, "    fn is_nonterminal(name: &str) -> bool {{");
    let _ = writeln!(source, "        matches!(name, {})", nonterminal_patterns);
    let _ = writeln!(source, "    }}");
    let _ = writeln!(source);
    let _ = writeln!(source, "    pub fn parse(&self, input: &[&'static str]) -> bool {{");
    let _ = writeln!(
        source,
        "        let mut stack = vec![END, {:?}];",
        grammar.start_symbol()
    );
    let _ = writeln!(source, "        let mut position = 0;");
    let _ = writeln!(source, "        while let Some(top) = stack.pop() {{");
    let _ = writeln!(
        source,
        "            let lookahead = *input.get(position).unwrap_or(&END);"
    );
    let _ = writeln!(source, "            if Parser::is_nonterminal(top) {{");
    let _ = writeln!(
        source,
        "                match self.table.get(&(top, lookahead)) {{"
    );
    let _ = writeln!(
        source,
        "                    Some(rhs) => stack.extend(rhs.iter().rev().copied()),"
    );
    let _ = writeln!(source, "                    None => return false,");
    let _ = writeln!(source, "                }}");
    let _ = writeln!(source, "            }} else {{");
    let _ = writeln!(source, "                if top != lookahead {{");
    let _ = writeln!(source, "                    return false;");
    let _ = writeln!(source, "                }}");
    let _ = writeln!(source, "                if top == END {{");
    let _ = writeln!(source, "                    return true;");
    let _ = writeln!(source, "                }}");
    let _ = writeln!(source, "                position += 1;");
    let _ = writeln!(source, "            }}");
    let _ = writeln!(source, "        }}");
    let _ = writeln!(source, "        position == input.len()");
    let _ = writeln!(source, "    }}");
    let _ = writeln!(source, "}}");

    return source;
}

pub fn write_parser(path: &PathBuf, grammar: &Grammar, analysis: &Analysis) -> io::Result<()> {
    fs::write(path, parser_source(grammar, analysis))
}
