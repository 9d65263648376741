/*
    This module is for intermediate code: quadruples and their emission
*/

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::PathBuf;

// One three-address instruction
#[derive(Debug, PartialEq, Clone)]
pub struct Quadruple {
    pub op: String,
    pub arg1: String,
    pub arg2: String,
    pub result: String,
}

impl Display for Quadruple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.op, self.arg1, self.arg2, self.result)
    }
}

// The ordered instruction sequence produced by one parse. Temporary names
// are allocated per instance, so independent compilations never collide.
#[derive(Debug, Default, PartialEq)]
pub struct IntermediateProgram {
    quadruples: Vec<Quadruple>,
    temps: usize,
}

impl IntermediateProgram {
    pub fn new() -> Self {
        IntermediateProgram::default()
    }

    pub fn emit(&mut self, op: &str, arg1: &str, arg2: &str, result: &str) {
        self.quadruples.push(Quadruple {
            op: op.to_string(),
            arg1: arg1.to_string(),
            arg2: arg2.to_string(),
            result: result.to_string(),
        });
    }

    pub fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.temps);
        self.temps += 1;
        name
    }

    pub fn quadruples(&self) -> &[Quadruple] {
        &self.quadruples
    }

    pub fn is_empty(&self) -> bool {
        self.quadruples.is_empty()
    }

    pub fn save(&self, path: &PathBuf) -> io::Result<()> {
        fs::write(path, self.to_string())
    }
}

impl Display for IntermediateProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, quadruple) in self.quadruples.iter().enumerate() {
            writeln!(f, "{}: {}", index, quadruple)?;
        }
        Ok(())
    }
}
