/*!
  The machine's memory: up to 8 call stacks packed into 256 bytes.

  Each stack costs two bytes of bookkeeping (its size and its return address) plus one byte per
  symbol, and the collection itself costs one byte for the stack count:

  ```text
    footprint = 1 + Σ (2 + stack.size)  <=  MAX_RAM
  ```

  Stacks are created and destroyed in LIFO order as functions are called and return. Every
  mutation is checked before anything changes, so a rejected `admit` or `evict` leaves the
  collection exactly as it was.
*/

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use thiserror::Error;
use tracing::{trace, warn};

use crate::address::Pointer;

/// Total memory in bytes.
pub const MAX_RAM: usize = 256;
/// A 3-bit stack selector addresses at most 8 stacks.
pub const MAX_STACKS: usize = 8;

/// Errors raised by the memory model. None of them leave the model modified.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum MemoryError {
  #[error("out of memory: {requested} bytes requested, {available} available")]
  OutOfMemory {
    requested : usize,
    available : usize
  },
  #[error("no stack to remove")]
  EmptyStacks,
  #[error("at most {} stacks can be addressed", MAX_STACKS)]
  TooManyStacks,
  #[error("no stack {0}")]
  InvalidStack(u8),
  #[error("stack {stack} has no slot {slot}")]
  InvalidSlot {
    stack : u8,
    slot  : u8
  },
}

/// One call frame: the symbols of the running function and where to resume its caller.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Stack {
  symbols        : Vec<u8>,
  return_address : u8
}

impl Stack {
  pub fn new(symbols: Vec<u8>, return_address: u8) -> Stack {
    Stack { symbols, return_address }
  }

  /// A stack of `size` zeroed symbols.
  pub fn with_size(size: usize, return_address: u8) -> Stack {
    Stack::new(vec![0; size], return_address)
  }

  pub fn size(&self) -> usize {
    self.symbols.len()
  }

  pub fn return_address(&self) -> u8 {
    self.return_address
  }

  pub fn symbols(&self) -> &[u8] {
    &self.symbols
  }

  /// Bytes this stack takes of the memory budget.
  pub fn footprint(&self) -> usize {
    2 + self.size()
  }

  pub fn get(&self, slot: u8) -> Option<u8> {
    self.symbols.get(slot as usize).copied()
  }

  pub fn get_mut(&mut self, slot: u8) -> Option<&mut u8> {
    self.symbols.get_mut(slot as usize)
  }
}

/// The ordered collection of live stacks. The last stack belongs to the running function.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stacks {
  stacks: Vec<Stack>
}

impl Stacks {
  pub fn new() -> Stacks {
    Stacks { stacks: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.stacks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stacks.is_empty()
  }

  /// Bytes currently used, including the stack count.
  pub fn footprint(&self) -> usize {
    1 + self.stacks.iter().map(Stack::footprint).sum::<usize>()
  }

  /// Bytes still free.
  pub fn available(&self) -> usize {
    MAX_RAM.saturating_sub(self.footprint())
  }

  /**
    Pushes a new stack if it fits in the remaining memory.

    Fails with `OutOfMemory` if the stack's footprint exceeds what is left, and with
    `TooManyStacks` if no stack selector is free. In both cases nothing is added.
  */
  pub fn admit(&mut self, stack: Stack) -> Result<(), MemoryError> {
    let requested = stack.footprint();
    let available = self.available();

    if requested > available {
      warn!(requested, available, "stack rejected: out of memory");
      return Err(MemoryError::OutOfMemory { requested, available });
    }
    if self.stacks.len() >= MAX_STACKS {
      warn!(stacks = self.stacks.len(), "stack rejected: no free selector");
      return Err(MemoryError::TooManyStacks);
    }

    trace!(
      size           = stack.size(),
      return_address = stack.return_address,
      footprint      = self.footprint() + requested,
      "admitting stack"
    );
    self.stacks.push(stack);
    self.trace_table();
    Ok(())
  }

  /**
    Pops the top stack and returns the address to resume at.

    The root stack was created by the entry function and has no caller, so removing the last
    remaining stack returns `0`. Callers tell this apart from a real return address of `0` by
    checking `is_empty()` afterward.
  */
  pub fn evict(&mut self) -> Result<u8, MemoryError> {
    let return_address =
      match self.stacks.len() {
        0 => return Err(MemoryError::EmptyStacks),
        1 => {
          self.stacks.clear();
          0
        }
        _ => match self.stacks.pop() {
          Some(stack) => stack.return_address,
          None        => return Err(MemoryError::EmptyStacks)
        }
      };

    trace!(return_address, stacks = self.stacks.len(), "evicted stack");
    self.trace_table();
    Ok(return_address)
  }

  /// The running function's stack.
  pub fn top(&self) -> Option<&Stack> {
    self.stacks.last()
  }

  pub fn get(&self, selector: u8) -> Option<&Stack> {
    self.stacks.get(selector as usize)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Stack> {
    self.stacks.iter()
  }

  /// Reads the symbol a pointer refers to.
  pub fn read(&self, pointer: Pointer) -> Result<u8, MemoryError> {
    let stack = pointer.stack_selector();
    let slot  = pointer.slot_index();
    self.get(stack)
        .ok_or(MemoryError::InvalidStack(stack))?
        .get(slot)
        .ok_or(MemoryError::InvalidSlot { stack, slot })
  }

  /// Overwrites the symbol a pointer refers to.
  pub fn write(&mut self, pointer: Pointer, value: u8) -> Result<(), MemoryError> {
    let stack = pointer.stack_selector();
    let slot  = pointer.slot_index();
    let symbol =
      self.stacks
          .get_mut(stack as usize)
          .ok_or(MemoryError::InvalidStack(stack))?
          .get_mut(slot)
          .ok_or(MemoryError::InvalidSlot { stack, slot })?;
    *symbol = value;
    Ok(())
  }

  #[cfg(feature = "trace_memory")]
  fn trace_table(&self) {
    trace!("\n{}", self);
  }

  #[cfg(not(feature = "trace_memory"))]
  fn trace_table(&self) {}
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Stacks {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ub->"Stack", ubr->"Size", ubr->"Return", ubl->"Symbols"]);

    for (i, stack) in self.stacks.iter().enumerate() {
      let symbols =
        stack.symbols
             .iter()
             .map(u8::to_string)
             .collect::<Vec<String>>()
             .join(" ");
      let name =
        match i + 1 == self.stacks.len() {
          true  => format!("* --> S[{}]", i),
          false => format!("S[{}]", i)
        };
      table.add_row(row![r->name, r->stack.size(), r->stack.return_address, symbols]);
    }

    write!(f, "Memory: {}/{} bytes\n{}", self.footprint(), MAX_RAM, table)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_collection_costs_one_byte() {
    let stacks = Stacks::new();
    assert_eq!(stacks.footprint(), 1);
    assert_eq!(stacks.available(), 255);
  }

  #[test]
  fn fills_memory_exactly() {
    let mut stacks = Stacks::new();
    stacks.admit(Stack::with_size(100, 0)).unwrap();
    stacks.admit(Stack::with_size(50, 1)).unwrap();
    // 1 + 102 + 52 = 155; 101 bytes left, a stack of 99 symbols fills them.
    stacks.admit(Stack::with_size(99, 2)).unwrap();
    assert_eq!(stacks.footprint(), MAX_RAM);
    assert_eq!(stacks.available(), 0);
  }

  #[test]
  fn rejects_one_byte_too_many() {
    let mut stacks = Stacks::new();
    stacks.admit(Stack::new(vec![1, 2, 3], 0)).unwrap();
    stacks.admit(Stack::with_size(200, 4)).unwrap();
    let before = stacks.clone();

    // 1 + 5 + 202 = 208; a stack of 47 symbols needs 49 bytes and only 48 remain.
    assert_eq!(
      stacks.admit(Stack::with_size(47, 7)),
      Err(MemoryError::OutOfMemory { requested: 49, available: 48 })
    );
    assert_eq!(stacks, before);
    assert_eq!(stacks.len(), 2);

    // The model stays usable.
    stacks.admit(Stack::with_size(46, 7)).unwrap();
    assert_eq!(stacks.footprint(), MAX_RAM);
  }

  #[test]
  fn single_stack_at_capacity() {
    let mut stacks = Stacks::new();
    stacks.admit(Stack::with_size(253, 0)).unwrap();
    assert_eq!(stacks.footprint(), MAX_RAM);
    assert!(Stacks::new().admit(Stack::with_size(254, 0)).is_err());
  }

  #[test]
  fn at_most_eight_stacks() {
    let mut stacks = Stacks::new();
    for i in 0..MAX_STACKS {
      stacks.admit(Stack::with_size(1, i as u8)).unwrap();
    }
    assert_eq!(stacks.admit(Stack::with_size(1, 0)), Err(MemoryError::TooManyStacks));
    assert_eq!(stacks.len(), MAX_STACKS);
  }

  #[test]
  fn evicts_in_lifo_order() {
    let mut stacks = Stacks::new();
    stacks.admit(Stack::with_size(2, 9)).unwrap();
    stacks.admit(Stack::with_size(2, 17)).unwrap();
    stacks.admit(Stack::with_size(2, 33)).unwrap();
    assert_eq!(stacks.evict(), Ok(33));
    assert_eq!(stacks.evict(), Ok(17));
    assert_eq!(stacks.len(), 1);
  }

  #[test]
  fn evicting_root_stack_returns_zero() {
    let mut stacks = Stacks::new();
    // The root's own return address is never reported.
    stacks.admit(Stack::with_size(4, 42)).unwrap();
    assert_eq!(stacks.evict(), Ok(0));
    assert!(stacks.is_empty());
    assert_eq!(stacks.footprint(), 1);
  }

  #[test]
  fn zero_return_address_is_ambiguous_without_context() {
    // A genuine return address of 0 looks like the root sentinel; only `is_empty` tells them apart.
    let mut stacks = Stacks::new();
    stacks.admit(Stack::with_size(1, 5)).unwrap();
    stacks.admit(Stack::with_size(1, 0)).unwrap();
    assert_eq!(stacks.evict(), Ok(0));
    assert!(!stacks.is_empty());
    assert_eq!(stacks.evict(), Ok(0));
    assert!(stacks.is_empty());
  }

  #[test]
  fn evicting_nothing_fails() {
    let mut stacks = Stacks::new();
    assert_eq!(stacks.evict(), Err(MemoryError::EmptyStacks));
    assert_eq!(stacks, Stacks::new());
  }

  #[test]
  fn pointers_resolve_to_slots() {
    let mut stacks = Stacks::new();
    stacks.admit(Stack::new(vec![10, 11, 12], 0)).unwrap();
    stacks.admit(Stack::new(vec![20], 3)).unwrap();

    assert_eq!(stacks.read(Pointer::new(0, 2)), Ok(12));
    assert_eq!(stacks.read(Pointer::new(1, 0)), Ok(20));
    stacks.write(Pointer::new(0, 1), 99).unwrap();
    assert_eq!(stacks.get(0).unwrap().symbols(), &[10, 99, 12]);

    assert_eq!(stacks.read(Pointer::new(2, 0)), Err(MemoryError::InvalidStack(2)));
    assert_eq!(stacks.write(Pointer::new(1, 1), 0), Err(MemoryError::InvalidSlot { stack: 1, slot: 1 }));
  }

  #[test]
  fn table_marks_running_stack() {
    let mut stacks = Stacks::new();
    stacks.admit(Stack::new(vec![1, 2], 0)).unwrap();
    stacks.admit(Stack::new(vec![3], 6)).unwrap();
    let text = stacks.to_string();
    assert!(text.starts_with("Memory: 8/256 bytes\n"));
    assert!(text.contains("* --> S[1]"));
    assert!(text.contains("1 2"));
  }
}
