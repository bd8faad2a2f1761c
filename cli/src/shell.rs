//! Line-oriented interactive loop over a `Session`.

use std::{io, str::FromStr};

use colored::Colorize;
use thiserror::Error;
use todo_core::TodoId;

use crate::session::Session;
use crate::transport::Transport;

const HELP: &str = "\
commands:
  add <title>     create a todo
  toggle <id>     flip completion
  delete <id>     delete a todo
  refresh         re-read the list
  help            show this message
  quit            leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(String),
    Toggle(TodoId),
    Delete(TodoId),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellParseError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a todo id")]
    InvalidId(String),
}

impl FromStr for ShellCommand {
    type Err = ShellParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "add" | "a" => {
                if rest.is_empty() {
                    return Err(ShellParseError::MissingArgument("add"));
                }
                Ok(Self::Add(rest.to_string()))
            }
            "toggle" | "t" => parse_id("toggle", rest).map(Self::Toggle),
            "delete" | "rm" | "d" => parse_id("delete", rest).map(Self::Delete),
            "refresh" | "r" | "list" | "ls" => Ok(Self::Refresh),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ShellParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(command: &'static str, arg: &str) -> Result<TodoId, ShellParseError> {
    if arg.is_empty() {
        return Err(ShellParseError::MissingArgument(command));
    }
    arg.trim_start_matches('#')
        .parse()
        .map_err(|_| ShellParseError::InvalidId(arg.to_string()))
}

/// Runs until `quit` or end of input, rendering the view after each action.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    input: impl io::BufRead,
    out: &mut impl io::Write,
) -> Result<(), Box<dyn std::error::Error>> {
    session.mount();
    session.render(out)?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ShellCommand>() {
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Help) => writeln!(out, "{HELP}")?,
            Ok(ShellCommand::Refresh) => {
                session.refresh();
                session.render(out)?;
            }
            Ok(ShellCommand::Add(title)) => {
                session.add(&title)?;
                session.render(out)?;
            }
            Ok(ShellCommand::Toggle(id)) => match session.toggle(id) {
                Ok(true) => session.render(out)?,
                Ok(false) => writeln!(out, "{} no todo #{id}", "warning:".yellow())?,
                Err(e) => writeln!(out, "{} {e}, try `refresh`", "error:".red())?,
            },
            Ok(ShellCommand::Delete(id)) => {
                session.delete(id);
                session.render(out)?;
            }
            Err(e) => writeln!(out, "{} {e}", "error:".red())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::RecordingTransport;
    use todo_core::{ApiError, HttpMethod, HttpResponse, QueryOptions};

    #[test]
    fn parses_commands() {
        assert_eq!(
            "add  Buy milk ".parse::<ShellCommand>(),
            Ok(ShellCommand::Add("Buy milk".to_string()))
        );
        assert_eq!("toggle 2".parse::<ShellCommand>(), Ok(ShellCommand::Toggle(2)));
        assert_eq!("rm #7".parse::<ShellCommand>(), Ok(ShellCommand::Delete(7)));
        assert_eq!("ls".parse::<ShellCommand>(), Ok(ShellCommand::Refresh));
        assert_eq!("q".parse::<ShellCommand>(), Ok(ShellCommand::Quit));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            "add".parse::<ShellCommand>(),
            Err(ShellParseError::MissingArgument("add"))
        );
        assert_eq!(
            "delete x".parse::<ShellCommand>(),
            Err(ShellParseError::InvalidId("x".to_string()))
        );
        assert_eq!(
            "frobnicate".parse::<ShellCommand>(),
            Err(ShellParseError::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn shell_session_adds_and_quits() {
        colored::control::set_override(false);
        let transport = RecordingTransport::with(vec![
            Ok(HttpResponse::new(200, "[]")),
            Ok(HttpResponse::new(201, r#"{"id":1,"title":"Buy milk","completed":false}"#)),
            Ok(HttpResponse::new(200, r#"[{"id":1,"title":"Buy milk","completed":false}]"#)),
        ]);
        let mut session = Session::new(transport, QueryOptions::no_retry());
        let input = "add Buy milk\nbogus\nquit\nadd never sent\n";
        let mut out = Vec::new();

        run(&mut session, input.as_bytes(), &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("No todos yet"));
        assert!(out.contains("[ ] Buy milk (#1)"));
        assert!(out.contains("1 items left"));
        assert!(out.contains("error: unknown command `bogus`"));
        let calls = session.transport().calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].method, HttpMethod::Post);
    }

    #[test]
    fn toggle_after_failed_read_keeps_shell_running() {
        colored::control::set_override(false);
        let transport = RecordingTransport::with(vec![
            Err(ApiError::TransportError("down".to_string())),
            Ok(HttpResponse::new(200, r#"[{"id":1,"title":"Back","completed":false}]"#)),
        ]);
        let mut session = Session::new(transport, QueryOptions::no_retry());
        let mut out = Vec::new();

        run(&mut session, "toggle 1\nrefresh\n".as_bytes(), &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Error loading todos"));
        assert!(out.contains("error: transport failed: down, try `refresh`"), "{out}");
        assert!(out.contains("[ ] Back (#1)"));
    }
}
