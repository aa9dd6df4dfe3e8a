use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use pagedb::{MetaCommand, PrepareError, Statement, Table};

/// A single-table record store with a REPL front end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database file, created if it does not exist
    filename: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

// Raw bytes, so a line that is not UTF-8 is a bad statement rather than
// a failed read.
struct InputBuffer {
    buffer: Vec<u8>,
}

impl InputBuffer {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Read the next line. Returns `false` at end of input.
    fn read_input(&mut self) -> io::Result<bool> {
        self.buffer.clear();
        Ok(io::stdin().lock().read_until(b'\n', &mut self.buffer)? > 0)
    }

    /// The trimmed line, or `None` if it is not valid UTF-8.
    fn line(&self) -> Option<&str> {
        std::str::from_utf8(&self.buffer).ok().map(str::trim)
    }
}

enum InputType {
    Meta(MetaCommand),
    Statement(Result<Statement, PrepareError>),
}

impl InputType {
    fn parse(input: &str) -> InputType {
        if let Some(meta) = MetaCommand::parse(input) {
            InputType::Meta(meta)
        } else {
            InputType::Statement(Statement::prepare(input))
        }
    }
}

fn print_prompt() -> io::Result<()> {
    print!("db > ");
    io::stdout().flush()
}

/// Run one statement. Only fatal storage errors are returned.
fn execute(statement: Statement, table: &mut Table) -> pagedb::Result<()> {
    let result = match statement {
        Statement::Insert(row) => table.append(&row),
        Statement::SelectAll => table.scan().try_for_each(|row| {
            println!("{}", row?);
            Ok(())
        }),
    };

    match result {
        Ok(()) => println!("Executed."),
        Err(e) if !e.is_fatal() => println!("Error: {e}"),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let mut table = pagedb::open(&args.filename)
        .with_context(|| format!("Unable to open file {}", args.filename.display()))?;
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt()?;
        if !input_buffer.read_input().context("Error reading input")? {
            break;
        }

        let input = match input_buffer.line() {
            Some(line) => InputType::parse(line),
            None => InputType::Statement(Err(PrepareError::Syntax)),
        };

        match input {
            InputType::Meta(MetaCommand::Exit) => break,
            InputType::Meta(MetaCommand::Unrecognized(command)) => {
                println!("Unrecognized meta-command: {command}");
            }
            InputType::Statement(Ok(statement)) => execute(statement, &mut table)?,
            InputType::Statement(Err(e)) => println!("{e}"),
        }
    }

    pagedb::close(table).context("Error closing db file.")
}
