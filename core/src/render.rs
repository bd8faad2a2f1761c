//! Plain-text rendering of the collection view.

use std::io;

use crate::stats::TodoStats;
use crate::types::Todo;
use crate::view::{TodoListView, ViewState};

pub const HEADING: &str = "TODO App";
pub const ERROR_MESSAGE: &str = "Error loading todos";
pub const EMPTY_MESSAGE: &str = "No todos yet! Add one above.";

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewRenderer;

impl ViewRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Loading shows the heading only.
    pub fn write(&self, w: &mut impl io::Write, view: &TodoListView) -> io::Result<()> {
        writeln!(w, "{HEADING}")?;
        match view.state() {
            ViewState::Loading => Ok(()),
            ViewState::Error(_) => writeln!(w, "{ERROR_MESSAGE}"),
            ViewState::Success([]) => writeln!(w, "{EMPTY_MESSAGE}"),
            ViewState::Success(todos) => {
                for todo in todos {
                    write_item(w, todo)?;
                }
                let stats = TodoStats::from_todos(todos);
                writeln!(
                    w,
                    "{} items left | {} completed",
                    stats.remaining, stats.completed
                )
            }
        }
    }

    pub fn render(&self, view: &TodoListView) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write(&mut buf, view);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn write_item(w: &mut impl io::Write, todo: &Todo) -> io::Result<()> {
    let mark = if todo.completed { 'x' } else { ' ' };
    writeln!(w, "[{mark}] {} (#{})", todo.title, todo.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TodoClient;
    use crate::error::ApiError;
    use crate::http::HttpResponse;
    use crate::query::QueryOptions;

    fn settle(result: Result<HttpResponse, ApiError>) -> TodoListView {
        let mut view = TodoListView::new(TodoClient::default(), QueryOptions::no_retry());
        let cmd = view.mount().unwrap();
        view.handle(cmd.action, result);
        view
    }

    #[test]
    fn loading_shows_heading_only() {
        let mut view = TodoListView::new(TodoClient::default(), QueryOptions::default());
        view.mount();
        assert_eq!(ViewRenderer::new().render(&view), "TODO App\n");
    }

    #[test]
    fn empty_collection_shows_empty_message() {
        let view = settle(Ok(HttpResponse::new(200, "[]")));
        let out = ViewRenderer::new().render(&view);
        assert_eq!(out, "TODO App\nNo todos yet! Add one above.\n");
    }

    #[test]
    fn items_and_footer() {
        let view = settle(Ok(HttpResponse::new(
            200,
            r#"[{"id":1,"title":"Todo 1","completed":false},{"id":2,"title":"Todo 2","completed":true}]"#,
        )));
        let out = ViewRenderer::new().render(&view);
        assert_eq!(
            out,
            "TODO App\n[ ] Todo 1 (#1)\n[x] Todo 2 (#2)\n1 items left | 1 completed\n"
        );
    }

    #[test]
    fn error_replaces_list() {
        let view = settle(Err(ApiError::TransportError("Network error".to_string())));
        let out = ViewRenderer::new().render(&view);
        assert_eq!(out, "TODO App\nError loading todos\n");
    }
}
