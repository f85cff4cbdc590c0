use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

use x2017::bytecode::{encode_program, parse_assembly, render};
use x2017::loader::load_program;
use x2017::{Error, Stack, Stacks};

#[derive(Parser)]
#[command(name = "x2017", version, about = "Inspect x2017 bytecode")]
struct Cli {
  /// Log decoding and memory operations
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print a bytecode file as assembly
  Objdump {
    file: PathBuf,
  },

  /// Assemble a text file into bytecode
  Asm {
    input: PathBuf,
    output: PathBuf,
  },

  /// Push one stack per function, in program order, and print the memory table
  Frames {
    file: PathBuf,
  },
}

fn objdump(file: PathBuf) -> Result<(), Error> {
  let program = load_program(file)?;
  print!("{}", render(&program));
  Ok(())
}

fn assemble(input: PathBuf, output: PathBuf) -> Result<(), Error> {
  let text = fs::read(&input).map_err(|source| Error::Io { path: input.clone(), source })?;
  let program = parse_assembly(&String::from_utf8_lossy(&text))?;
  let bytes = encode_program(&program);
  fs::write(&output, &bytes).map_err(|source| Error::Io { path: output.clone(), source })?;
  info!(functions = program.len(), bytes = bytes.len(), "assembled {}", output.display());
  Ok(())
}

fn frames(file: PathBuf) -> Result<(), Error> {
  let program = load_program(file)?;
  let mut stacks = Stacks::new();

  for function in &program {
    // Each frame returns to the frame below it.
    let return_address = stacks.len().saturating_sub(1) as u8;
    let stack = Stack::with_size(function.stack_symbol_count(), return_address);
    if let Err(e) = stacks.admit(stack) {
      println!("{}", stacks);
      return Err(e.into());
    }
  }

  println!("{}", stacks);
  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    )
    .with_writer(std::io::stderr)
    .init();

  let result =
    match cli.command {
      Commands::Objdump { file }      => objdump(file),
      Commands::Asm { input, output } => assemble(input, output),
      Commands::Frames { file }       => frames(file),
    };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {}", e);
      ExitCode::FAILURE
    }
  }
}
