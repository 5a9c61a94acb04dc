//! Interactive shell.
//!
//! A line-oriented stand-in for the toolbar window: each line names one
//! action, the table is printed after every change, and the status line
//! follows. A failed action prints its error and the shell keeps going.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::form::{Direction, MovementForm};
use crate::session::Session;
use crate::view::{render_table, Status};

const HELP: &str = "\
Commands:
  in                 record an inbound movement
  out                record an outbound movement
  import <file>      import movements from .xlsx or .csv
  export <file>      export all movements to .xlsx or .csv
  template <file>    write an empty import template
  list               show all movements
  status             show the status line
  help               show this help
  quit               leave the shell";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action<'a> {
    Move(Direction),
    Import(&'a str),
    Export(&'a str),
    Template(&'a str),
    List,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
    MissingPath(&'a str),
}

fn parse(line: &str) -> Action<'_> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "" => Action::Empty,
        "in" | "inbound" => Action::Move(Direction::Inbound),
        "out" | "outbound" => Action::Move(Direction::Outbound),
        "import" | "export" | "template" if rest.is_empty() => Action::MissingPath(command),
        "import" => Action::Import(rest),
        "export" => Action::Export(rest),
        "template" => Action::Template(rest),
        "list" | "ls" => Action::List,
        "status" => Action::Status,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        _ => Action::Unknown(command),
    }
}

/// Run the shell until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails. Errors
/// from individual actions are printed and the loop continues.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "{HELP}")?;
    writeln!(output)?;
    write!(output, "{}", render_table(session.records(), session.labels()))?;
    writeln!(output, "[{}]", session.status())?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let action = parse(&line);
        debug!("Shell action: {:?}", action);

        let outcome: Result<Option<Status>> = match action {
            Action::Empty => continue,
            Action::Quit => break,
            Action::Help => {
                writeln!(output, "{HELP}")?;
                continue;
            }
            Action::List => {
                write!(output, "{}", render_table(session.records(), session.labels()))?;
                continue;
            }
            Action::Status => {
                writeln!(output, "[{}]", session.status())?;
                continue;
            }
            Action::Unknown(command) => {
                writeln!(output, "error: unknown command '{command}' (try 'help')")?;
                continue;
            }
            Action::MissingPath(command) => {
                writeln!(output, "error: '{command}' needs a file path")?;
                continue;
            }
            Action::Move(direction) => session
                .enter(MovementForm::default(), direction, &mut *input, &mut *output)
                .map(|s| Some(s.clone())),
            Action::Import(path) => session.import(Path::new(path)).map(|s| Some(s.clone())),
            Action::Export(path) => session.export(Path::new(path)).map(|_| None),
            Action::Template(path) => session
                .generate_template(Path::new(path))
                .map(|_| None),
        };

        match outcome {
            Ok(reloaded) => {
                if reloaded.is_some() {
                    write!(output, "{}", render_table(session.records(), session.labels()))?;
                }
                writeln!(output, "[{}]", session.status())?;
            }
            Err(e) => print_error(output, &e)?,
        }
    }

    Ok(())
}

fn print_error<W: Write>(output: &mut W, error: &Error) -> Result<()> {
    writeln!(output, "error: {error}")?;
    Ok(())
}
