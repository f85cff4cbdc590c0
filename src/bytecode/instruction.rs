use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use super::BytecodeError;

/// Width in bits of an encoded opcode.
pub const OPCODE_BITS: u32 = 3;
/// Width in bits of an encoded operand type.
pub const TYPE_BITS: u32 = 2;

/**
  Opcodes of the virtual machine.

  The discriminants are the 3-bit codes used in the binary format, so the order the variants are
  listed in is significant. The `strum` serializations are the mnemonics used in assembly.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[repr(u8)]
pub enum Opcode {
  #[strum(serialize = "MOV")]
  Move          = 0b000, // MOV( dest, src )
  #[strum(serialize = "CAL")]
  Call          = 0b001, // CAL( label )
  #[strum(serialize = "RET")]
  Return        = 0b010, // RET
  #[strum(serialize = "REF")]
  MakeReference = 0b011, // REF( dest, src )
  #[strum(serialize = "ADD")]
  Add           = 0b100, // ADD( reg, reg )
  #[strum(serialize = "PRINT")]
  Print         = 0b101, // PRINT( src )
  #[strum(serialize = "NOT")]
  Not           = 0b110, // NOT( reg )
  #[strum(serialize = "EQU")]
  Equals        = 0b111, // EQU( reg )
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Decodes a 3-bit opcode.
  pub fn from_code(code: u8) -> Result<Opcode, BytecodeError> {
    Opcode::try_from(code).map_err(|_| BytecodeError::InvalidOpcode(code))
  }

  /// The number of operands the operation takes.
  pub fn arity(&self) -> usize {
    match self {
      Opcode::Return => 0,

      | Opcode::Move
      | Opcode::MakeReference
      | Opcode::Add => 2,

      _ => 1
    }
  }
}

/**
  Operand types. The type of an operand decides both how its value is interpreted and how many
  bits encode the value.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[repr(u8)]
pub enum OperandType {
  /// An immediate byte.
  #[strum(serialize = "VAL")]
  Value    = 0b00,
  /// One of the 8 registers.
  #[strum(serialize = "REG")]
  Register = 0b01,
  /// A slot of the current stack frame.
  #[strum(serialize = "STK")]
  Stack    = 0b10,
  /// A slot of the current stack frame holding a pointer.
  #[strum(serialize = "PTR")]
  Pointer  = 0b11,
}

impl OperandType {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Decodes a 2-bit operand type.
  pub fn from_code(code: u8) -> Result<OperandType, BytecodeError> {
    OperandType::try_from(code).map_err(|_| BytecodeError::InvalidOperandType(code))
  }

  /// Number of bits used to encode a value of this type.
  pub fn width(&self) -> u32 {
    match self {
      OperandType::Value    => 8,
      OperandType::Register => 3,
      OperandType::Stack    => 5,
      OperandType::Pointer  => 5,
    }
  }

  /// The largest value representable in `self.width()` bits.
  pub fn max_value(&self) -> u8 {
    (((1u16) << self.width()) - 1) as u8
  }

  /// Stack and pointer operands name stack slots and are displayed as symbols.
  pub fn is_symbolic(&self) -> bool {
    matches!(self, OperandType::Stack | OperandType::Pointer)
  }
}

/// A typed operand whose value is known to fit the width of its type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Operand {
  operand_type : OperandType,
  value        : u8
}

impl Operand {
  pub fn new(operand_type: OperandType, value: u8) -> Result<Operand, BytecodeError> {
    if value > operand_type.max_value() {
      return Err(BytecodeError::OperandOutOfRange { operand_type, value });
    }
    Ok(Operand { operand_type, value })
  }

  pub fn operand_type(&self) -> OperandType {
    self.operand_type
  }

  pub fn value(&self) -> u8 {
    self.value
  }
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.operand_type, self.value)
  }
}

/// Holds the decoded components of an instruction, one variant per arity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [OpCode:3][Type:2][Value:W][Type:2][Value:W]
  Binary {
    opcode   : Opcode,
    operand1 : Operand,
    operand2 : Operand
  },
  /// [OpCode:3][Type:2][Value:W]
  Unary {
    opcode  : Opcode,
    operand : Operand
  },
  /// [OpCode:3]
  Nullary(Opcode),
}

impl Instruction {
  /// Builds an instruction, checking that the number of operands matches the opcode's arity.
  pub fn new(opcode: Opcode, operands: &[Operand]) -> Result<Instruction, BytecodeError> {
    if operands.len() != opcode.arity() {
      return Err(BytecodeError::ArityMismatch {
        opcode,
        expected : opcode.arity(),
        actual   : operands.len()
      });
    }

    let instruction =
      match *operands {
        []                   => Instruction::Nullary(opcode),
        [operand]            => Instruction::Unary { opcode, operand },
        [operand1, operand2] => Instruction::Binary { opcode, operand1, operand2 },
        _ => unreachable!("no opcode takes more than two operands")
      };

    Ok(instruction)
  }

  pub fn opcode(&self) -> Opcode {
    match self {
      | Instruction::Binary { opcode, .. }
      | Instruction::Unary { opcode, .. }
      | Instruction::Nullary(opcode) => *opcode
    }
  }

  /// The operands in encoding order.
  pub fn operands(&self) -> Vec<Operand> {
    match self {
      Instruction::Binary { operand1, operand2, .. } => vec![*operand1, *operand2],
      Instruction::Unary { operand, .. }             => vec![*operand],
      Instruction::Nullary(_)                        => vec![],
    }
  }
}

/// Displays raw operand values. Rendering with display symbols is done per function.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.opcode())?;
    for operand in self.operands() {
      write!(f, " {}", operand)?;
    }
    Ok(())
  }
}
