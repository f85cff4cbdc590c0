//! Reads bytecode files from disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::bytecode::decode_program;
use crate::error::Error;
use crate::program::Program;

/// Reads the whole file into memory. Decoding needs the last byte before it can start.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, Error> {
  let path = path.as_ref();
  let bytes = fs::read(path).map_err(|source| {
    match source.kind() {
      ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
      _                   => Error::Io { path: path.to_path_buf(), source }
    }
  })?;
  debug!(path = %path.display(), bytes = bytes.len(), "loaded bytecode");
  Ok(bytes)
}

/// Loads and decodes a bytecode file. The buffer is dropped once decoding completes.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Program, Error> {
  let bytes = load(path)?;
  Ok(decode_program(&bytes)?)
}
