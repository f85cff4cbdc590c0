/*!
  This module is responsible for the encoding and decoding of binary programs.

  Decoding starts at the last bit of the buffer and reads function records toward the start of
  the buffer. Read in that direction, a function record is

  ```text
    [count:5] [instruction] * count [label:3]
  ```

  with the instructions met last-to-first, and an instruction is

  ```text
    [opcode:3] ( [type:2] [value:W] ( [type:2] [value:W] )? )?
  ```

  where `W` is the width of the operand type. The record closest to the start of the buffer is the
  first function of the program.
*/

use tracing::{debug, trace};

use super::bits::{BitIndex, BitReader, BitWriter};
use super::instruction::{OPCODE_BITS, TYPE_BITS};
use super::{BytecodeError, Instruction, Opcode, Operand, OperandType};
use crate::program::{Function, Program};

/// Width in bits of a function's instruction count.
pub const COUNT_BITS: u32 = 5;
/// Width in bits of a function label.
pub const LABEL_BITS: u32 = 3;
/// The smallest useful function is a count, a label and a `RET`. Decoding stops once the cursor
/// drops below this index.
pub const MIN_FUNCTION_BITS: BitIndex = 11;

fn decode_operand(reader: &mut BitReader) -> Result<Operand, BytecodeError> {
  let operand_type = OperandType::from_code(reader.take(TYPE_BITS)?)?;
  let value        = reader.take(operand_type.width())?;
  Operand::new(operand_type, value)
}

/// Decodes one instruction at the reader's cursor.
pub fn decode_instruction(reader: &mut BitReader) -> Result<Instruction, BytecodeError> {
  let opcode = Opcode::from_code(reader.take(OPCODE_BITS)?)?;

  let mut operands = Vec::with_capacity(opcode.arity());
  for _ in 0..opcode.arity() {
    operands.push(decode_operand(reader)?);
  }

  let instruction = Instruction::new(opcode, &operands)?;
  trace!(%instruction, cursor = reader.cursor(), "decoded instruction");
  Ok(instruction)
}

/// Decodes one function record at the reader's cursor.
pub fn decode_function(reader: &mut BitReader) -> Result<Function, BytecodeError> {
  let count = reader.take(COUNT_BITS)? as usize;

  // Instructions are met last-to-first.
  let mut instructions = Vec::with_capacity(count);
  for _ in 0..count {
    instructions.push(decode_instruction(reader)?);
  }
  instructions.reverse();

  let label = reader.take(LABEL_BITS)?;
  Function::new(label, instructions)
}

/**
  Decodes a whole buffer. Bits left over once fewer than `MIN_FUNCTION_BITS` remain are ignored.
  Any invalid field fails the whole decode.
*/
pub fn decode_program(bytes: &[u8]) -> Result<Program, BytecodeError> {
  let mut reader    = BitReader::new(bytes);
  let mut functions = Vec::new();

  while reader.cursor() >= MIN_FUNCTION_BITS {
    let function = decode_function(&mut reader)?;
    debug!(
      label        = function.label(),
      instructions = function.len(),
      cursor       = reader.cursor(),
      "decoded function"
    );
    functions.push(function);
  }

  // The last record decoded is the first in the file.
  functions.reverse();
  Ok(Program::new(functions))
}

pub fn encode_instruction(instruction: &Instruction, writer: &mut BitWriter) {
  writer.put(instruction.opcode().code(), OPCODE_BITS);
  for operand in instruction.operands() {
    writer.put(operand.operand_type().code(), TYPE_BITS);
    writer.put(operand.value(), operand.operand_type().width());
  }
}

pub fn encode_function(function: &Function, writer: &mut BitWriter) {
  writer.put(function.len() as u8, COUNT_BITS);
  for instruction in function.instructions().iter().rev() {
    encode_instruction(instruction, writer);
  }
  writer.put(function.label(), LABEL_BITS);
}

/**
  Encodes a program so that `decode_program` gives it back.

  The padding in front of the first record is chosen so that the decoder still starts that record
  (the cursor must be at least `MIN_FUNCTION_BITS` on entry) but does not try to read a record
  out of the padding.
*/
pub fn encode_program(program: &Program) -> Vec<u8> {
  let mut writer = BitWriter::new();
  let mut first_record_bits = 0;

  for function in program.functions().iter().rev() {
    let start = writer.len();
    encode_function(function, &mut writer);
    first_record_bits = writer.len() - start;
  }

  let min_padding =
    match first_record_bits {
      0    => 0,
      bits => (MIN_FUNCTION_BITS as usize + 1).saturating_sub(bits)
    };
  writer.into_bytes(min_padding)
}
