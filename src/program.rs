//! The decoded form of a bytecode file: an ordered list of labelled functions.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::bytecode::{BytecodeError, Instruction};
use crate::symboltable::SymbolTable;

/// Function labels are 3 bits wide.
pub const MAX_LABEL: u8 = 0b111;
/// The instruction count of a function is 5 bits wide.
pub const MAX_INSTRUCTIONS: usize = 0b11111;

/**
  A labelled sequence of instructions in program order.

  The symbol table is the only mutable part of a function. It is filled lazily as the function is
  rendered, and a slot keeps its symbol once assigned.
*/
#[derive(Clone, Debug)]
pub struct Function {
  label        : u8,
  instructions : Vec<Instruction>,
  symbols      : RefCell<SymbolTable>
}

impl Function {
  pub fn new(label: u8, instructions: Vec<Instruction>) -> Result<Function, BytecodeError> {
    if label > MAX_LABEL {
      return Err(BytecodeError::InvalidLabel(label));
    }
    if instructions.len() > MAX_INSTRUCTIONS {
      return Err(BytecodeError::TooManyInstructions(instructions.len()));
    }
    Ok(Function {
      label,
      instructions,
      symbols: RefCell::new(SymbolTable::new())
    })
  }

  pub fn label(&self) -> u8 {
    self.label
  }

  pub fn instructions(&self) -> &[Instruction] {
    &self.instructions
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  /// The display symbol of a stack slot, assigned on first request.
  pub fn symbol(&self, slot: u8) -> char {
    self.symbols.borrow_mut().intern(slot)
  }

  /// Number of distinct stack slots the function's operands refer to. A frame for the function
  /// needs this many symbol bytes.
  pub fn stack_symbol_count(&self) -> usize {
    self.instructions
        .iter()
        .flat_map(|instruction| instruction.operands())
        .filter(|operand| operand.operand_type().is_symbolic())
        .map(|operand| operand.value())
        .collect::<HashSet<u8>>()
        .len()
  }
}

// The symbol table is display state and does not take part in equality.
impl PartialEq for Function {
  fn eq(&self, other: &Function) -> bool {
    self.label == other.label && self.instructions == other.instructions
  }
}

impl Eq for Function {}

/// Functions in the order their records appear in the file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
  functions: Vec<Function>
}

impl Program {
  pub fn new(functions: Vec<Function>) -> Program {
    Program { functions }
  }

  pub fn functions(&self) -> &[Function] {
    &self.functions
  }

  /// The first function carrying `label`.
  pub fn function(&self, label: u8) -> Option<&Function> {
    self.functions.iter().find(|function| function.label == label)
  }

  pub fn len(&self) -> usize {
    self.functions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.functions.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Function> {
    self.functions.iter()
  }
}

impl<'p> IntoIterator for &'p Program {
  type Item = &'p Function;
  type IntoIter = std::slice::Iter<'p, Function>;

  fn into_iter(self) -> Self::IntoIter {
    self.functions.iter()
  }
}
