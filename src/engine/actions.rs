use itertools::Itertools;

use super::attributes::{Attribute, Frame};
use super::ParseError;
use crate::grammar::Symbol;
use crate::ir::IntermediateProgram;

// Dispatches one named semantic action against the running production's
// frame. Actions read their siblings' slots by structural position, emit
// at most one quadruple, and leave their result in their own slot, where
// the enclosing production picks it up.
pub(super) fn run(
    name: &str,
    frame: &mut Frame,
    slot: usize,
    code: &mut IntermediateProgram,
) -> Result<(), ParseError> {
    match name {
        "declare" => declare(frame, slot, code),
        "assign" => assign(frame, slot, code),
        "add" => arithmetic(name, "+", frame, slot, code),
        "sub" => arithmetic(name, "-", frame, slot, code),
        "mul" => arithmetic(name, "*", frame, slot, code),
        "div" => arithmetic(name, "/", frame, slot, code),
        "value" => value(frame, slot),
        _ => Err(ParseError::UnknownAction {
            action: name.to_string(),
        }),
    }
}

fn missing(action: &str, what: &str) -> ParseError {
    ParseError::MissingAttribute {
        action: action.to_string(),
        what: what.to_string(),
    }
}

// A declaration production starts with the type and identifier terminals
fn declare(frame: &mut Frame, slot: usize, code: &mut IntermediateProgram) -> Result<(), ParseError> {
    let mut terminals = frame
        .rhs
        .iter()
        .positions(|symbol| matches!(symbol, Symbol::Terminal(_)));

    let ty = terminals
        .next()
        .and_then(|position| frame.slot(position))
        .ok_or_else(|| missing("declare", "type terminal"))?;
    let id = terminals
        .next()
        .and_then(|position| frame.slot(position))
        .ok_or_else(|| missing("declare", "identifier terminal"))?;

    code.emit("declare", &ty.value, "", &id.value);
    frame.slots[slot] = Some(id);
    Ok(())
}

// The target is the first terminal; the value is whatever the expression
// subtree (the last non-terminal before the action) synthesized. A literal
// and a reduced expression arrive through the same slot.
fn assign(frame: &mut Frame, slot: usize, code: &mut IntermediateProgram) -> Result<(), ParseError> {
    let target = frame
        .rhs
        .iter()
        .positions(|symbol| matches!(symbol, Symbol::Terminal(_)))
        .next()
        .and_then(|position| frame.slot(position))
        .ok_or_else(|| missing("assign", "target identifier"))?;

    let value = frame.rhs[..slot]
        .iter()
        .positions(|symbol| matches!(symbol, Symbol::Nonterminal(_)))
        .last()
        .and_then(|position| frame.slot(position))
        .ok_or_else(|| missing("assign", "expression value"))?;

    code.emit("=", &value.value, "", &target.value);
    frame.slots[slot] = Some(target);
    Ok(())
}

// Left operand: the running result inherited from the preceding sibling.
// Right operand: the slot just before the action. The fresh temporary
// becomes the new running result for whatever operator follows.
fn arithmetic(
    action: &str,
    op: &str,
    frame: &mut Frame,
    slot: usize,
    code: &mut IntermediateProgram,
) -> Result<(), ParseError> {
    let left = frame
        .inherited
        .clone()
        .ok_or_else(|| missing(action, "left operand"))?;
    let right = slot
        .checked_sub(1)
        .and_then(|position| frame.slot(position))
        .ok_or_else(|| missing(action, "right operand"))?;

    let temp = code.new_temp();
    code.emit(op, &left.value, &right.value, &temp);
    frame.slots[slot] = Some(Attribute::new(temp));
    Ok(())
}

// Forwards a leaf upward: the inner expression for a parenthesized
// production, the matched literal or identifier otherwise
fn value(frame: &mut Frame, slot: usize) -> Result<(), ParseError> {
    let source = match frame.rhs.first() {
        Some(Symbol::Terminal(name)) if name == "(" => frame
            .rhs
            .iter()
            .positions(|symbol| matches!(symbol, Symbol::Nonterminal(_)))
            .next(),
        _ => Some(0),
    };

    let leaf = source
        .and_then(|position| frame.slot(position))
        .ok_or_else(|| missing("value", "leaf value"))?;

    frame.slots[slot] = Some(leaf);
    Ok(())
}
