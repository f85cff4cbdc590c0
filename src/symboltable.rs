use bimap::BiMap;

/// Number of distinct display symbols, one per possible stack slot.
pub const SYMBOL_COUNT: usize = 32;

/**
  A symbol table maps the stack slots referenced by a function to the characters they are displayed
  as. Symbols are handed out in order of first use: `A` through `Z`, then `a` onward. A symbol table
  is really just a convenience wrapper around a BiMap.
*/
#[derive(Clone, Debug)]
pub struct SymbolTable {
  table: BiMap<u8, char>
}

impl SymbolTable {

  pub fn new() -> SymbolTable {
    SymbolTable {
      table: BiMap::new()
    }
  }

  pub fn get_symbol(&self, slot: u8) -> Option<char> {
    self.table.get_by_left(&slot).copied()
  }

  pub fn get_slot(&self, symbol: char) -> Option<u8> {
    self.table.get_by_right(&symbol).copied()
  }

  /// Returns the symbol of `slot`, assigning the next free symbol if the slot has none yet.
  pub fn intern(&mut self, slot: u8) -> char {
    if let Some(symbol) = self.get_symbol(slot) {
      return symbol;
    }
    let symbol = symbol_for_index(self.table.len());
    self.table.insert(slot, symbol);
    symbol
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    SymbolTable::new()
  }
}

/// The `index`-th display symbol.
pub fn symbol_for_index(index: usize) -> char {
  debug_assert!(index < SYMBOL_COUNT);
  match index {
    i if i < 26 => (b'A' + i as u8) as char,
    i           => (b'a' + (i - 26) as u8) as char
  }
}

/// Inverse of `symbol_for_index`.
pub fn index_for_symbol(symbol: char) -> Option<usize> {
  match symbol {
    'A'..='Z' => Some(symbol as usize - 'A' as usize),
    'a'..='f' => Some(symbol as usize - 'a' as usize + 26),
    _         => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn symbols_follow_first_use() {
    let mut symbols = SymbolTable::new();
    assert_eq!(symbols.intern(7), 'A');
    assert_eq!(symbols.intern(0), 'B');
    assert_eq!(symbols.intern(7), 'A');
    assert_eq!(symbols.get_slot('B'), Some(0));
    assert_eq!(symbols.get_symbol(3), None);
    assert_eq!(symbols.len(), 2);
  }

  #[test]
  fn all_slots_get_distinct_symbols() {
    let mut symbols = SymbolTable::new();
    let assigned: Vec<char> = (0..SYMBOL_COUNT as u8).rev().map(|slot| symbols.intern(slot)).collect();
    assert_eq!(assigned[0], 'A');
    assert_eq!(assigned[25], 'Z');
    assert_eq!(&assigned[26..], &['a', 'b', 'c', 'd', 'e', 'f']);
  }

  #[test]
  fn index_symbol_inverse() {
    for index in 0..SYMBOL_COUNT {
      assert_eq!(index_for_symbol(symbol_for_index(index)), Some(index));
    }
    assert_eq!(index_for_symbol('g'), None);
    assert_eq!(index_for_symbol('1'), None);
  }
}
