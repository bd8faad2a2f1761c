//! Collection view over the todo endpoint.
//!
//! # Design
//! `TodoListView` owns the query cache for `/api/todos` and turns user
//! actions into `Command`s: an `HttpRequest` tagged with the `Action` that
//! produced it. The host executes the request and hands the outcome back to
//! `handle`, which may return a follow-up command (a retry, or the re-read
//! that follows every mutation). The view never edits its copy of the
//! collection; what it shows is always the last list the server returned.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{FetchTicket, Query, QueryOptions, QueryStatus, Settled};
use crate::stats::TodoStats;
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

/// What a request was issued for, so its response can be routed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetch(FetchTicket),
    Create,
    Toggle(TodoId),
    Delete(TodoId),
}

impl Action {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Fetch(_))
    }
}

/// A request the host must execute, followed by `TodoListView::handle`.
/// The host waits `delay` before sending it; only retries carry a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub request: HttpRequest,
    pub delay: Duration,
}

impl Command {
    fn now(action: Action, request: HttpRequest) -> Self {
        Self {
            action,
            request,
            delay: Duration::ZERO,
        }
    }
}

/// The three observable states of the view.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewState<'a> {
    Loading,
    Error(&'a ApiError),
    Success(&'a [Todo]),
}

#[derive(Debug)]
pub struct TodoListView {
    client: TodoClient,
    todos: Query<Vec<Todo>>,
}

impl TodoListView {
    pub fn new(client: TodoClient, options: QueryOptions) -> Self {
        let todos = Query::new(client.todos_path(), options);
        Self { client, todos }
    }

    /// Initial read. Returns `None` if a read is already in flight.
    pub fn mount(&mut self) -> Option<Command> {
        let ticket = self.todos.begin_fetch()?;
        debug!(key = %self.todos.key(), "mounting todo list");
        Some(self.fetch_command(ticket, Duration::ZERO))
    }

    /// Re-reads the collection, superseding any pending read.
    pub fn refresh(&mut self) -> Command {
        let ticket = self.todos.invalidate();
        self.fetch_command(ticket, Duration::ZERO)
    }

    /// Blank titles issue nothing.
    pub fn create(&self, title: &str) -> Result<Option<Command>, ApiError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let input = CreateTodo {
            title: title.to_string(),
            completed: false,
        };
        let request = self.client.build_create_todo(&input)?;
        Ok(Some(Command::now(Action::Create, request)))
    }

    /// Flips the completion flag of a todo in the current collection.
    /// Unknown ids issue nothing.
    pub fn toggle(&self, id: TodoId) -> Result<Option<Command>, ApiError> {
        let Some(todo) = self.todo(id) else {
            debug!(id, "toggle ignored, todo not in collection");
            return Ok(None);
        };
        let input = UpdateTodo {
            title: None,
            completed: Some(!todo.completed),
        };
        let request = self.client.build_update_todo(id, &input)?;
        Ok(Some(Command::now(Action::Toggle(id), request)))
    }

    pub fn delete(&self, id: TodoId) -> Command {
        Command::now(Action::Delete(id), self.client.build_delete_todo(id))
    }

    /// Applies the outcome of a command and returns the next command to run,
    /// if any. Every mutation is followed by a re-read, whether it succeeded
    /// or not.
    pub fn handle(
        &mut self,
        action: Action,
        result: Result<HttpResponse, ApiError>,
    ) -> Option<Command> {
        match action {
            Action::Fetch(ticket) => {
                let parsed = result.and_then(|resp| self.client.parse_list_todos(resp));
                match self.todos.settle(ticket, parsed) {
                    Settled::Retry { ticket, delay } => Some(self.fetch_command(ticket, delay)),
                    Settled::Updated => {
                        debug!(count = self.todos.data().map_or(0, Vec::len), "todos loaded");
                        None
                    }
                    Settled::Superseded | Settled::Failed => None,
                }
            }
            Action::Create => {
                match result.and_then(|resp| self.client.parse_create_todo(resp)) {
                    Ok(todo) => info!(id = todo.id, "todo created"),
                    Err(e) => warn!(error = %e, "create failed"),
                }
                Some(self.refresh())
            }
            Action::Toggle(id) => {
                match result.and_then(|resp| self.client.parse_update_todo(resp)) {
                    Ok(todo) => info!(id, completed = todo.completed, "todo toggled"),
                    Err(e) => warn!(id, error = %e, "toggle failed"),
                }
                Some(self.refresh())
            }
            Action::Delete(id) => {
                match result.and_then(|resp| self.client.parse_delete_todo(resp)) {
                    Ok(()) => info!(id, "todo deleted"),
                    Err(e) => warn!(id, error = %e, "delete failed"),
                }
                Some(self.refresh())
            }
        }
    }

    pub fn state(&self) -> ViewState<'_> {
        match self.todos.status() {
            QueryStatus::Loading => ViewState::Loading,
            QueryStatus::Error(e) => ViewState::Error(e),
            QueryStatus::Success(todos) => ViewState::Success(todos),
        }
    }

    /// Counters for the collection currently held, recomputed on every call.
    pub fn stats(&self) -> Option<TodoStats> {
        match self.state() {
            ViewState::Success(todos) => Some(TodoStats::from_todos(todos)),
            _ => None,
        }
    }

    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.data()?.iter().find(|t| t.id == id)
    }

    fn fetch_command(&self, ticket: FetchTicket, delay: Duration) -> Command {
        Command {
            action: Action::Fetch(ticket),
            request: self.client.build_list_todos(),
            delay,
        }
    }
}
