use std::{error::Error, io, path::PathBuf};

use clap::{Parser, Subcommand};
use todo_core::TodoId;
use url::Url;

use crate::config::load_config;
use crate::session::Session;
use crate::shell;
use crate::transport::{Transport, UreqTransport};

/// Command-line interface
#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Manage a todo list served at /api/todos")]
pub struct Cli {
    /// Path to the configuration file (defaults to $TODO_CONFIG)
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin the API is served from, overrides the config file
    #[arg(long, value_name = "URL")]
    pub origin: Option<Url>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// The command to execute, `list` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Show the list
    List,

    /// Add a new todo
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Flip completion of a todo
    Toggle { id: TodoId },

    /// Delete a todo
    #[command(alias = "rm")]
    Delete { id: TodoId },

    /// Interactive shell
    Shell,
}

impl Cli {
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(origin) = self.origin {
            config.origin = origin;
        }
        tracing::debug!(origin = %config.origin, retry = config.retry, "starting");

        let transport = UreqTransport::new(config.origin.clone());
        let mut session = Session::new(transport, config.query_options());
        let command = self.command.unwrap_or(Commands::List);
        dispatch(command, &mut session, io::stdin().lock(), &mut io::stdout().lock())
    }
}

/// Runs one command and prints the resulting view. A list that could not be
/// loaded is printed as such and then reported as an error.
pub fn dispatch<T: Transport>(
    command: Commands,
    session: &mut Session<T>,
    input: impl io::BufRead,
    out: &mut impl io::Write,
) -> Result<(), Box<dyn Error>> {
    let outcome: Result<(), Box<dyn Error>> = match command {
        Commands::Shell => return shell::run(session, input, out),
        Commands::List => {
            session.mount();
            Ok(())
        }
        Commands::Add { title } => {
            session.mount();
            session.add(&title.join(" ")).map_err(Into::into)
        }
        Commands::Toggle { id } => {
            session.mount();
            match session.toggle(id) {
                Ok(true) => Ok(()),
                Ok(false) => Err(format!("no todo #{id}").into()),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Delete { id } => {
            session.mount();
            session.delete(id);
            Ok(())
        }
    };

    session.render(out)?;
    outcome?;
    match session.load_error() {
        Some(e) => Err(e.clone().into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["todo"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
        assert!(cli.origin.is_none());
    }

    #[test]
    fn add_joins_words() {
        let cli = Cli::try_parse_from(["todo", "add", "Buy", "milk"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                title: vec!["Buy".to_string(), "milk".to_string()]
            })
        );
    }

    #[test]
    fn add_requires_title() {
        assert!(Cli::try_parse_from(["todo", "add"]).is_err());
    }

    #[test]
    fn delete_alias_and_origin() {
        let cli =
            Cli::try_parse_from(["todo", "--origin", "http://10.0.0.2:8080", "rm", "4"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Delete { id: 4 }));
        assert_eq!(cli.origin.unwrap().port(), Some(8080));
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["todo", "toggle", "abc"]).is_err());
    }

    mod dispatch_command {
        use super::*;
        use crate::session::tests::RecordingTransport;
        use todo_core::{ApiError, HttpResponse, QueryOptions};

        fn run(
            command: Commands,
            replies: Vec<Result<HttpResponse, ApiError>>,
        ) -> (Result<(), Box<dyn Error>>, String) {
            let mut session =
                Session::new(RecordingTransport::with(replies), QueryOptions::no_retry());
            let mut out = Vec::new();
            let result = dispatch(command, &mut session, io::empty(), &mut out);
            (result, String::from_utf8(out).unwrap())
        }

        fn rejected() -> Vec<Result<HttpResponse, ApiError>> {
            vec![Err(ApiError::TransportError("connection refused".to_string()))]
        }

        #[test]
        fn list_prints_view_and_succeeds() {
            let (result, out) = run(
                Commands::List,
                vec![Ok(HttpResponse::new(200, r#"[{"id":1,"title":"A","completed":false}]"#))],
            );
            assert!(result.is_ok());
            assert!(out.contains("[ ] A (#1)"));
        }

        #[test]
        fn failed_list_prints_error_view_and_fails() {
            let (result, out) = run(Commands::List, rejected());
            assert_eq!(out, "TODO App\nError loading todos\n");
            let err = result.unwrap_err();
            assert!(err.to_string().contains("connection refused"), "{err}");
        }

        #[test]
        fn toggle_after_failed_list_reports_load_error() {
            let (result, out) = run(Commands::Toggle { id: 3 }, rejected());
            assert!(out.contains("Error loading todos"));
            let err = result.unwrap_err().to_string();
            assert!(err.contains("connection refused"), "{err}");
            assert!(!err.contains("no todo"), "{err}");
        }

        #[test]
        fn toggle_unknown_id_fails_after_render() {
            let (result, out) = run(
                Commands::Toggle { id: 3 },
                vec![Ok(HttpResponse::new(200, "[]"))],
            );
            assert!(out.contains("No todos yet"));
            assert_eq!(result.unwrap_err().to_string(), "no todo #3");
        }
    }
}
