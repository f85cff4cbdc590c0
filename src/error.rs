use std::path::PathBuf;

use thiserror::Error;

use crate::bytecode::BytecodeError;
use crate::memory::MemoryError;

/// Everything that can go wrong between reading a file and running it against the memory model.
#[derive(Debug, Error)]
pub enum Error {
  #[error("unable to open file {}: no such file", .0.display())]
  FileNotFound(PathBuf),
  #[error("unable to read {}: {source}", .path.display())]
  Io {
    path   : PathBuf,
    #[source]
    source : std::io::Error
  },
  #[error(transparent)]
  Bytecode(#[from] BytecodeError),
  #[error(transparent)]
  Memory(#[from] MemoryError),
  #[error("line {line}: {message}")]
  Assembly {
    line    : usize,
    message : String
  },
}
