/*!
  Bit level access to the bytecode buffer.

  Bits are numbered from the start of the buffer, most significant bit first within each byte:
  bit 0 is the high bit of byte 0 and bit `8 * len - 1` is the low bit of the last byte. Decoding
  starts at the last bit and walks toward bit 0. A field of width `n` read at index `k` occupies
  bits `k - n + 1 ..= k`, and the bit at `k` lands in the *low* position of the result:

  ```text
    value = Σ bit(k - i) << i,   i in 0..n
  ```

  `BitWriter` produces buffers in the same layout.
*/

use super::BytecodeError;

/// A signed bit index. The decoding cursor goes negative once the whole buffer is consumed.
pub type BitIndex = isize;

/// Reads the single bit at `bit_index`.
pub fn read_bit(bytes: &[u8], bit_index: usize) -> u8 {
  let shift = 7 - bit_index % 8;
  (bytes[bit_index / 8] >> shift) & 1
}

/**
  Reads an `n` bit field, `n <= 8`, whose first bit is at `bit_index`.

  No bounds checking is done here: `bit_index + 1 >= n` and `bit_index < 8 * bytes.len()` must
  hold. `BitReader::take` is the checked interface.
*/
pub fn read_bits(bytes: &[u8], n: u32, bit_index: usize) -> u8 {
  debug_assert!(n <= 8);
  (0..n as usize).fold(0u8, |value, i| {
    value | (read_bit(bytes, bit_index - i) << i)
  })
}

/// A cursor that consumes fields from the end of a buffer toward its start.
#[derive(Debug, Clone)]
pub struct BitReader<'b> {
  bytes  : &'b [u8],
  cursor : BitIndex
}

impl<'b> BitReader<'b> {
  pub fn new(bytes: &'b [u8]) -> Self {
    BitReader {
      bytes,
      cursor: bytes.len() as BitIndex * 8 - 1
    }
  }

  /// The index of the next bit to be read, or a negative number once the buffer is exhausted.
  pub fn cursor(&self) -> BitIndex {
    self.cursor
  }

  /// Reads an `n` bit field at the cursor and moves the cursor down by `n`.
  pub fn take(&mut self, n: u32) -> Result<u8, BytecodeError> {
    if self.cursor + 1 < n as BitIndex {
      return Err(BytecodeError::UnexpectedEndOfBytecode {
        bit_index : self.cursor,
        wanted    : n
      });
    }
    let value = read_bits(self.bytes, n, self.cursor as usize);
    self.cursor -= n as BitIndex;
    Ok(value)
  }
}

/**
  Accumulates fields in decoding order and lays them out so that a `BitReader` meets them in the
  order they were put.
*/
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
  // `bits[0]` is the last bit of the finished buffer.
  bits: Vec<bool>
}

impl BitWriter {
  pub fn new() -> Self {
    BitWriter::default()
  }

  /// Number of bits written so far.
  pub fn len(&self) -> usize {
    self.bits.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bits.is_empty()
  }

  /// Appends the low `n` bits of `value`, `n <= 8`.
  pub fn put(&mut self, value: u8, n: u32) {
    debug_assert!(n <= 8);
    for i in 0..n {
      self.bits.push((value >> i) & 1 == 1);
    }
  }

  /**
    Finishes the buffer. At least `min_padding` zero bits are placed in front of the written bits,
    and as many more as needed to fill a whole number of bytes.
  */
  pub fn into_bytes(self, min_padding: usize) -> Vec<u8> {
    let unpadded = self.bits.len() + min_padding;
    let total    = unpadded + (8 - unpadded % 8) % 8;
    let mut bytes = vec![0u8; total / 8];

    for (j, bit) in self.bits.iter().enumerate() {
      if *bit {
        let k = total - 1 - j;
        bytes[k / 8] |= 1 << (7 - k % 8);
      }
    }
    bytes
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_bits_are_msb_first() {
    let bytes = [0b1000_0001u8, 0b0100_0000];
    assert_eq!(read_bit(&bytes, 0), 1);
    assert_eq!(read_bit(&bytes, 1), 0);
    assert_eq!(read_bit(&bytes, 7), 1);
    assert_eq!(read_bit(&bytes, 9), 1);
    assert_eq!(read_bit(&bytes, 15), 0);
  }

  #[test]
  fn highest_bit_lands_low() {
    // Bits 0 and 1 are `0` and `1`. Reading downward from bit 1 puts the `1` at position 0.
    assert_eq!(read_bits(&[0b0100_0000], 2, 1), 0b01);
    // Bits 5..=7 of `0b0000_0001` are 0, 0, 1; bit 7 becomes the low bit.
    assert_eq!(read_bits(&[0b0000_0001], 3, 7), 0b001);
    assert_eq!(read_bits(&[0b0000_0100], 3, 7), 0b100);
    // An aligned byte comes back unchanged.
    assert_eq!(read_bits(&[0b1100_1010], 8, 7), 0b1100_1010);
  }

  #[test]
  fn fields_cross_byte_boundaries() {
    // Bits 6..=9 are 1, 1, 0, 1.
    let bytes = [0b0000_0011u8, 0b0100_0000];
    assert_eq!(read_bits(&bytes, 4, 9), 0b1101);
  }

  #[test]
  fn written_fields_read_back() {
    for &n in &[1u32, 3, 5, 8] {
      for k in 0..(1u16 << n) {
        let mut writer = BitWriter::new();
        // Surround the field with set bits so misplaced reads show up.
        writer.put(0b111, 3);
        writer.put(k as u8, n);
        writer.put(0b1, 1);
        let bytes = writer.into_bytes(0);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.take(3).unwrap(), 0b111);
        assert_eq!(reader.take(n).unwrap(), k as u8, "width {} value {}", n, k);
        assert_eq!(reader.take(1).unwrap(), 1);
      }
    }
  }

  #[test]
  fn reader_stops_at_bit_zero() {
    let bytes = [0xFFu8];
    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.cursor(), 7);
    assert_eq!(reader.take(5).unwrap(), 0b11111);
    assert_eq!(reader.cursor(), 2);
    assert_eq!(
      reader.take(5),
      Err(BytecodeError::UnexpectedEndOfBytecode { bit_index: 2, wanted: 5 })
    );
    assert_eq!(reader.take(3).unwrap(), 0b111);
    assert_eq!(reader.cursor(), -1);
  }

  #[test]
  fn empty_buffer() {
    let mut reader = BitReader::new(&[]);
    assert_eq!(reader.cursor(), -1);
    assert!(reader.take(1).is_err());
    assert!(BitWriter::new().into_bytes(0).is_empty());
  }

  #[test]
  fn padding_goes_in_front() {
    let mut writer = BitWriter::new();
    writer.put(0b1, 1);
    // One bit plus seven bits of padding. The written bit is the very last bit.
    assert_eq!(writer.clone().into_bytes(0), vec![0b0000_0001]);
    // Nine bits of padding push the buffer to two bytes.
    assert_eq!(writer.into_bytes(9), vec![0, 0b0000_0001]);
  }
}
