/*!
  The human readable textual form of bytecode is called assembly. This module leverages the
  `strum` derives of the instruction related enums to render programs as assembly and to parse
  assembly back into programs.

  ```text
  FUNC LABEL 0
      MOV STK A VAL 5
      CAL VAL 1
      RET
  ```

  Stack and pointer operands are shown as symbols, assigned per function in order of first use.
  When parsing, a symbol names the slot with the same index (`A` is slot 0, `f` is slot 31), which
  gives back the rendered text unchanged.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{
    alpha1,
    alphanumeric1,
    char as one_char,
    digit1,
    not_line_ending,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_res, opt, success},
  multi::many0,
  sequence::{delimited, pair, preceded, separated_pair, tuple},
  IResult
};

use crate::bytecode::{Instruction, Opcode, Operand, OperandType};
use crate::error::Error;
use crate::program::{Function, Program};
use crate::symboltable::index_for_symbol;

impl Display for Function {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "FUNC LABEL {}", self.label())?;
    for instruction in self.instructions() {
      write!(f, "    {}", instruction.opcode())?;
      for operand in instruction.operands() {
        write!(f, " {} ", operand.operand_type())?;
        match operand.operand_type().is_symbolic() {
          true  => write!(f, "{}", self.symbol(operand.value()))?,
          false => write!(f, "{}", operand.value())?
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Program {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for function in self {
      write!(f, "{}", function)?;
    }
    Ok(())
  }
}

/// Renders the program as assembly, assigning display symbols as it goes.
pub fn render(program: &Program) -> String {
  program.to_string()
}

// region Parsers

#[derive(Clone)]
enum Line<'a> {
  Header(u8),
  Instruction(Opcode, Vec<(OperandType, &'a str)>),
  Blank
}

fn header(input: &str) -> IResult<&str, u8> {
  preceded(
    tuple((tag("FUNC"), space1, tag("LABEL"), space1)),
    map_res(digit1, |digits: &str| digits.parse::<u8>())
  )(input)
}

fn operand(input: &str) -> IResult<&str, (OperandType, &str)> {
  preceded(
    space1,
    separated_pair(map_res(alpha1, OperandType::from_str), space1, alphanumeric1)
  )(input)
}

fn instruction(input: &str) -> IResult<&str, (Opcode, Vec<(OperandType, &str)>)> {
  pair(map_res(alpha1, Opcode::from_str), many0(operand))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), not_line_ending)(input)
}

fn line(input: &str) -> IResult<&str, Line<'_>> {
  all_consuming(
    delimited(
      space0,
      alt((
        map(header, Line::Header),
        map(instruction, |(opcode, operands)| Line::Instruction(opcode, operands)),
        success(Line::Blank)
      )),
      pair(space0, opt(comment))
    )
  )(input)
}

// endregion

fn assembly_error<E: Display>(line: usize, error: E) -> Error {
  Error::Assembly { line, message: error.to_string() }
}

fn operand_value(operand_type: OperandType, text: &str, line: usize) -> Result<Operand, Error> {
  let value =
    match operand_type.is_symbolic() {
      true => {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
          (Some(symbol), None) => index_for_symbol(symbol).map(|index| index as u8),
          _                    => None
        }
      }
      false => text.parse::<u8>().ok()
    };

  let value = value.ok_or_else(|| {
    assembly_error(line, format!("`{}` is not a valid {} operand", text, operand_type))
  })?;
  Operand::new(operand_type, value).map_err(|e| assembly_error(line, e))
}

struct PendingFunction {
  line         : usize,
  label        : u8,
  instructions : Vec<Instruction>
}

impl PendingFunction {
  fn finish(self) -> Result<Function, Error> {
    let line = self.line;
    Function::new(self.label, self.instructions).map_err(|e| assembly_error(line, e))
  }
}

/**
  Parses assembly into a program. Blank lines and `#` comments are skipped. Every instruction must
  follow a `FUNC LABEL` header.
*/
pub fn parse_assembly(text: &str) -> Result<Program, Error> {
  let mut functions = Vec::new();
  let mut current: Option<PendingFunction> = None;

  for (index, source_line) in text.lines().enumerate() {
    let line_number = index + 1;
    let (_, parsed) = line(source_line).map_err(|_| {
      assembly_error(line_number, format!("cannot parse `{}`", source_line.trim()))
    })?;

    match parsed {
      Line::Blank => {}

      Line::Header(label) => {
        if let Some(pending) = current.take() {
          functions.push(pending.finish()?);
        }
        current = Some(PendingFunction { line: line_number, label, instructions: vec![] });
      }

      Line::Instruction(opcode, operands) => {
        let pending = current.as_mut().ok_or_else(|| {
          assembly_error(line_number, "instruction outside of a function")
        })?;
        let operands =
          operands
            .into_iter()
            .map(|(operand_type, text)| operand_value(operand_type, text, line_number))
            .collect::<Result<Vec<Operand>, Error>>()?;
        let instruction =
          Instruction::new(opcode, &operands).map_err(|e| assembly_error(line_number, e))?;
        pending.instructions.push(instruction);
      }
    }
  }

  if let Some(pending) = current {
    functions.push(pending.finish()?);
  }
  Ok(Program::new(functions))
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn operand(operand_type: OperandType, value: u8) -> Operand {
    Operand::new(operand_type, value).unwrap()
  }

  #[test]
  fn renders_stack_symbols() {
    let program = Program::new(vec![
      Function::new(0, vec![
        Instruction::new(Opcode::Add, &[operand(OperandType::Stack, 0), operand(OperandType::Value, 5)]).unwrap(),
        Instruction::Nullary(Opcode::Return),
      ]).unwrap()
    ]);
    assert_eq!(render(&program), "FUNC LABEL 0\n    ADD STK A VAL 5\n    RET\n");
  }

  #[test]
  fn symbols_follow_first_appearance() {
    let program = Program::new(vec![
      Function::new(1, vec![
        Instruction::new(Opcode::Move, &[operand(OperandType::Stack, 9), operand(OperandType::Register, 2)]).unwrap(),
        Instruction::new(Opcode::MakeReference, &[operand(OperandType::Pointer, 3), operand(OperandType::Stack, 9)]).unwrap(),
        Instruction::new(Opcode::Print, &[operand(OperandType::Pointer, 3)]).unwrap(),
        Instruction::Nullary(Opcode::Return),
      ]).unwrap(),
      Function::new(0, vec![
        Instruction::new(Opcode::Print, &[operand(OperandType::Stack, 3)]).unwrap(),
        Instruction::Nullary(Opcode::Return),
      ]).unwrap(),
    ]);
    let expected = "\
FUNC LABEL 1
    MOV STK A REG 2
    REF PTR B STK A
    PRINT PTR B
    RET
FUNC LABEL 0
    PRINT STK A
    RET
";
    assert_eq!(render(&program), expected);
    // Symbols stick once assigned.
    assert_eq!(render(&program), expected);
  }

  #[test]
  fn parses_rendered_text() {
    let text = "\
FUNC LABEL 2
    MOV STK A VAL 255
    CAL VAL 1
    EQU REG 7
    NOT STK B
    RET
FUNC LABEL 1
    ADD PTR A STK B
    RET
";
    let program = parse_assembly(text).unwrap();
    assert_eq!(program.len(), 2);
    assert_eq!(program.functions()[0].len(), 5);
    assert_eq!(program.functions()[1].instructions()[0],
      Instruction::Binary {
        opcode   : Opcode::Add,
        operand1 : operand(OperandType::Pointer, 0),
        operand2 : operand(OperandType::Stack, 1)
      }
    );
    assert_eq!(render(&program), text);
  }

  #[test]
  fn skips_blank_lines_and_comments() {
    let text = "# entry point\n\nFUNC  LABEL 0   # main\n  RET  \n\n";
    let program = parse_assembly(text).unwrap();
    assert_eq!(program, Program::new(vec![
      Function::new(0, vec![Instruction::Nullary(Opcode::Return)]).unwrap()
    ]));
  }

  #[test]
  fn reports_bad_lines() {
    assert!(matches!(
      parse_assembly("FUNC LABEL 0\n    JMP VAL 1\n"),
      Err(Error::Assembly { line: 2, .. })
    ));
    assert!(matches!(
      parse_assembly("RET\n"),
      Err(Error::Assembly { line: 1, .. })
    ));
    assert!(matches!(
      parse_assembly("FUNC LABEL 0\n    PRINT REG 8\n"),
      Err(Error::Assembly { line: 2, .. })
    ));
    assert!(matches!(
      parse_assembly("FUNC LABEL 0\n    ADD REG 1\n"),
      Err(Error::Assembly { line: 2, .. })
    ));
    assert!(matches!(
      parse_assembly("FUNC LABEL 9\n    RET\n"),
      Err(Error::Assembly { line: 1, .. })
    ));
    assert!(matches!(
      parse_assembly("FUNC LABEL 0\n    PRINT STK AB\n"),
      Err(Error::Assembly { line: 2, .. })
    ));
  }
}
