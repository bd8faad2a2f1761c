//! Client core for a single-page todo list.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the request layer
//! sits a small query cache and the collection view that lists todos, derives
//! the remaining/completed counters and re-reads the collection after every
//! mutation.
//!
//! # Design
//! - `TodoClient` is stateless and only knows the relative API base path;
//!   the host chooses the origin.
//! - `TodoListView` hands out `Command`s and consumes their outcomes, so the
//!   whole view can be driven deterministically from tests.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod render;
pub mod stats;
pub mod types;
pub mod view;

pub use client::{TodoClient, API_BASE_PATH};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{FetchTicket, Query, QueryOptions, QueryStatus, Settled};
pub use render::ViewRenderer;
pub use stats::TodoStats;
pub use types::{CreateTodo, Todo, TodoId, UpdateTodo};
pub use view::{Action, Command, TodoListView, ViewState};
