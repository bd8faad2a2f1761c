//! Single-entry query cache for one endpoint.
//!
//! # Design
//! A `Query` tracks the last successful data, the last error and the fetch
//! currently in flight for one key. Every fetch is identified by a
//! `FetchTicket`; only the result for the current ticket is applied, so a
//! fresh fetch started by `invalidate` supersedes whatever was pending.
//! Data already held stays visible while a background refetch runs.
//!
//! Failed fetches are retried with an exponential delay: the base delay,
//! doubled per attempt, capped at `MAX_RETRY_DELAY`. The query only computes
//! the delay; waiting is the host's job.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ApiError;

/// Number of automatic retries after a failed fetch when not configured.
pub const DEFAULT_RETRY: u32 = 3;

/// Delay before the first retry when not configured.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on the delay between two attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Extra attempts made after a failed fetch before the error is shown.
    pub retry: u32,
    /// Delay before the first retry, doubled for each following one.
    pub retry_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            retry: DEFAULT_RETRY,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl QueryOptions {
    /// Failed fetches are shown immediately.
    pub fn no_retry() -> Self {
        Self {
            retry: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (starting at 1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_delay
            .checked_mul(factor)
            .map_or(MAX_RETRY_DELAY, |d| d.min(MAX_RETRY_DELAY))
    }
}

/// Identifies one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

/// Observable state of a query.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryStatus<'a, T> {
    Loading,
    Error(&'a ApiError),
    Success(&'a T),
}

/// Outcome of `Query::settle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The result was stored.
    Updated,
    /// The result belonged to a fetch that is no longer current.
    Superseded,
    /// The fetch failed; another attempt must be made with `ticket` once
    /// `delay` has passed.
    Retry { ticket: FetchTicket, delay: Duration },
    /// The fetch failed with no retries left; the error was stored.
    Failed,
}

#[derive(Debug)]
pub struct Query<T> {
    key: String,
    options: QueryOptions,
    data: Option<T>,
    error: Option<ApiError>,
    next_ticket: u64,
    in_flight: Option<FetchTicket>,
    failures: u32,
}

impl<T> Query<T> {
    pub fn new(key: impl Into<String>, options: QueryOptions) -> Self {
        Self {
            key: key.into(),
            options,
            data: None,
            error: None,
            next_ticket: 0,
            in_flight: None,
            failures: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Starts a fetch unless one is already running for this key.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            debug!(key = %self.key, "fetch already in flight");
            return None;
        }
        Some(self.issue())
    }

    /// Starts a fetch that supersedes any pending one.
    pub fn invalidate(&mut self) -> FetchTicket {
        self.failures = 0;
        if let Some(pending) = self.in_flight {
            debug!(key = %self.key, ticket = pending.0, "superseding pending fetch");
        }
        self.issue()
    }

    pub fn settle(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> Settled {
        if self.in_flight != Some(ticket) {
            debug!(key = %self.key, ticket = ticket.0, "dropping superseded result");
            return Settled::Superseded;
        }

        match result {
            Ok(data) => {
                self.in_flight = None;
                self.data = Some(data);
                self.error = None;
                self.failures = 0;
                Settled::Updated
            }
            Err(e) if self.failures < self.options.retry => {
                self.failures += 1;
                let delay = self.options.delay_for(self.failures);
                warn!(
                    key = %self.key,
                    attempt = self.failures,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "fetch failed, retrying"
                );
                Settled::Retry {
                    ticket: self.issue(),
                    delay,
                }
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "fetch failed");
                self.in_flight = None;
                self.error = Some(e);
                self.failures = 0;
                Settled::Failed
            }
        }
    }

    pub fn status(&self) -> QueryStatus<'_, T> {
        if let Some(e) = &self.error {
            return QueryStatus::Error(e);
        }
        match &self.data {
            Some(data) => QueryStatus::Success(data),
            None => QueryStatus::Loading,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    fn issue(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        ticket
    }
}
