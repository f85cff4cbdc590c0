use thiserror::Error;

use super::{Opcode, OperandType};

/// Errors raised while decoding, encoding or constructing bytecode.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum BytecodeError {
  /// A 3-bit opcode that names no operation.
  #[error("invalid operation code {0:#05b}")]
  InvalidOpcode(u8),
  /// A 2-bit operand type that names no type.
  #[error("invalid operand type {0:#04b}")]
  InvalidOperandType(u8),
  /// An operand value wider than its type allows.
  #[error("value {value} does not fit in a {operand_type} operand")]
  OperandOutOfRange {
    operand_type : OperandType,
    value        : u8
  },
  /// Wrong number of operands for an opcode.
  #[error("{opcode} takes {expected} operands but was given {actual}")]
  ArityMismatch {
    opcode   : Opcode,
    expected : usize,
    actual   : usize
  },
  /// Function labels are 3 bits wide.
  #[error("invalid function label {0}")]
  InvalidLabel(u8),
  /// The instruction count of a function is 5 bits wide.
  #[error("a function holds at most 31 instructions, got {0}")]
  TooManyInstructions(usize),
  /// A field would extend past the first bit of the buffer.
  #[error("unexpected end of bytecode: {wanted} bits wanted at bit index {bit_index}")]
  UnexpectedEndOfBytecode {
    bit_index : isize,
    wanted    : u32
  },
}
