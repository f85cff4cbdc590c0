/*!

  Programs are stored as a dense bit string with no alignment or delimiters. Fields are read from
  the last bit of the file toward the first, so the whole file has to be in memory before decoding
  starts. The sizes of instruction components are as follows:

    Count:     5 bits
    Label:     3 bits
    Opcode:    3 bits
    Type:      2 bits
    Value:   3-8 bits, depending on the type

  | Type     | Code   | Value bits |
  |----------|--------|------------|
  | `VAL`    | `0b00` | 8          |
  | `REG`    | `0b01` | 3          |
  | `STK`    | `0b10` | 5          |
  | `PTR`    | `0b11` | 5          |

  Decoded instructions keep their fields as ordinary integers checked at construction, so an
  `Operand` holding a `STK` value of 40 cannot exist. The only place where values are truncated to
  fit is the pointer bit field in `crate::address`.

*/

mod assembly;
mod binary;
mod bits;
mod error;
mod instruction;

pub use assembly::{parse_assembly, render};
pub use binary::{decode_function, decode_instruction, decode_program,
                 encode_function, encode_instruction, encode_program,
                 COUNT_BITS, LABEL_BITS, MIN_FUNCTION_BITS};
pub use bits::{read_bit, read_bits, BitIndex, BitReader, BitWriter};
pub use error::BytecodeError;
pub use instruction::{Instruction, Opcode, Operand, OperandType, OPCODE_BITS, TYPE_BITS};
