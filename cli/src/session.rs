//! Drives a `TodoListView` through a `Transport`.
//!
//! Commands run one at a time on the calling thread; each response is handed
//! back to the view before its follow-up (retry or re-read) is sent. Retries
//! block the thread for their backoff delay.

use std::{io, thread};

use todo_core::{
    ApiError, Command, QueryOptions, TodoClient, TodoId, TodoListView, ViewRenderer, ViewState,
};
use tracing::debug;

use crate::transport::Transport;

pub struct Session<T> {
    view: TodoListView,
    transport: T,
    renderer: ViewRenderer,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, options: QueryOptions) -> Self {
        Self {
            view: TodoListView::new(TodoClient::default(), options),
            transport,
            renderer: ViewRenderer::new(),
        }
    }

    pub fn view(&self) -> &TodoListView {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn mount(&mut self) {
        let cmd = self.view.mount();
        self.drain(cmd);
    }

    pub fn refresh(&mut self) {
        let cmd = self.view.refresh();
        self.drain(Some(cmd));
    }

    pub fn add(&mut self, title: &str) -> Result<(), ApiError> {
        let cmd = self.view.create(title)?;
        self.drain(cmd);
        Ok(())
    }

    /// The error shown in place of the list, if the last read failed.
    pub fn load_error(&self) -> Option<&ApiError> {
        match self.view.state() {
            ViewState::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `false` when the id is not in the current collection, and the
    /// load error when there is no collection to look in.
    pub fn toggle(&mut self, id: TodoId) -> Result<bool, ApiError> {
        if let Some(e) = self.load_error() {
            return Err(e.clone());
        }
        let Some(cmd) = self.view.toggle(id)? else {
            return Ok(false);
        };
        self.drain(Some(cmd));
        Ok(true)
    }

    pub fn delete(&mut self, id: TodoId) {
        let cmd = self.view.delete(id);
        self.drain(Some(cmd));
    }

    pub fn render(&self, w: &mut impl io::Write) -> io::Result<()> {
        self.renderer.write(w, &self.view)
    }

    fn drain(&mut self, first: Option<Command>) {
        let mut next = first;
        while let Some(cmd) = next {
            if !cmd.delay.is_zero() {
                debug!(delay_ms = cmd.delay.as_millis() as u64, "waiting before retry");
                thread::sleep(cmd.delay);
            }
            let outcome = self.transport.execute(&cmd.request);
            next = self.view.handle(cmd.action, outcome);
        }
    }
}
