//! An 8 bit pointer into stack memory, with accessors for its two bit fields.
//!
//! ```text
//!   [stack selector:3][slot index:5]
//! ```
//!
//! The setters mask their argument to the width of the field, so an oversized value is silently
//! truncated. That truncation is part of the pointer's contract: the machine stores pointers in a
//! single byte and never checks the fields.

use std::fmt::{Display, Formatter};

pub const SELECTOR_BITS: u8 = 3;
pub const SLOT_BITS: u8 = 5;

const SELECTOR_MASK: u8 = 0b111;
const SLOT_MASK: u8 = 0b1_1111;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Pointer(u8);

impl Pointer {
  /// Builds a pointer to `slot` of stack `stack`. Both are truncated to their field width.
  pub fn new(stack: u8, slot: u8) -> Pointer {
    let mut pointer = Pointer(0);
    pointer.set_selector(stack);
    pointer.set_slot(slot);
    pointer
  }

  /// The top 3 bits: which of the up to 8 stacks is addressed.
  pub fn stack_selector(&self) -> u8 {
    (self.0 >> SLOT_BITS) & SELECTOR_MASK
  }

  /// The bottom 5 bits: the slot within the addressed stack.
  pub fn slot_index(&self) -> u8 {
    self.0 & SLOT_MASK
  }

  /// Replaces the top 3 bits, keeping the slot index.
  pub fn set_selector(&mut self, stack: u8) -> Pointer {
    self.0 = self.slot_index() | ((stack & SELECTOR_MASK) << SLOT_BITS);
    *self
  }

  /// Replaces the bottom 5 bits, keeping the stack selector.
  pub fn set_slot(&mut self, slot: u8) -> Pointer {
    self.0 = (self.0 & !SLOT_MASK) | (slot & SLOT_MASK);
    *self
  }

  pub fn to_byte(&self) -> u8 {
    self.0
  }
}

impl From<u8> for Pointer {
  fn from(byte: u8) -> Pointer {
    Pointer(byte)
  }
}

impl From<Pointer> for u8 {
  fn from(pointer: Pointer) -> u8 {
    pointer.0
  }
}

impl Display for Pointer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "S[{}][{}]", self.stack_selector(), self.slot_index())
  }
}
