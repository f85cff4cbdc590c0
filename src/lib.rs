//! Decoder, renderer and memory model for the x2017 bytecode format.
//!
//! ```text
//! bytes -> [`bytecode::decode_program`] -> `Program` -> [`bytecode::render`] -> assembly
//!                                                    -> executor, using [`memory::Stacks`]
//! ```

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod error;
pub mod loader;
pub mod memory;
pub mod program;
pub mod symboltable;

pub use address::Pointer;
pub use error::Error;
pub use memory::{MemoryError, Stack, Stacks};
pub use program::{Function, Program};
