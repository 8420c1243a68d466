//! Relays a job's remote log lines to the local log.
//!
//! A training job writes one stream per instance (`<job>/algo-1-…`). Streams are
//! discovered by the job's prefix and every stream keeps its own [`LogCursor`].
//! A line is handed out at most once: the cursor only moves after a page was read
//! and its lines were buffered, so a failed or interrupted fetch just repeats the
//! same request next time.

use crate::call::timed;

use osprey_core::prelude::*;

use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

/// The `tracing` target remote log lines are emitted on.
pub const JOB_LOG_TARGET: &str = "osprey::job_log";

// Caps how much of a chatty stream is read in a single tick.
const MAX_PAGES_PER_TICK: usize = 32;

/// Position in a single log stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogCursor {
    token: Option<String>,
    read: usize,
}

impl LogCursor {
    /// [`None`] until the first page was read.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Lines read through this cursor so far.
    pub fn read(&self) -> usize {
        self.read
    }
}

/// Reads the page following `cursor` and returns it with the advanced cursor.
///
/// `cursor` itself is left untouched, so a caller that fails half way can retry
/// with it. A stream that does not exist (yet) has no new lines.
pub async fn fetch<L: LogService>(
    logs: &L,
    group: &str,
    stream: &str,
    cursor: &LogCursor,
) -> Result<(Vec<LogEvent>, LogCursor), ServiceError> {
    let page = match logs.fetch_events(group, stream, cursor.token()).await {
        Ok(page) => page,
        Err(ServiceError::NotFound(_)) => return Ok((Vec::new(), cursor.clone())),
        Err(err) => return Err(err),
    };

    let next = LogCursor {
        token: page.next_token.or_else(|| cursor.token.clone()),
        read: cursor.read + page.events.len(),
    };
    Ok((page.events, next))
}

/// Lines collected by [`LogRelay::fetch_new`], in stream order.
#[derive(Debug, Default)]
pub struct RelayBatch {
    /// `(stream, event)` pairs.
    pub lines: Vec<(String, LogEvent)>,
    /// Failures this round. Affected streams resume from their last cursor.
    pub errors: Vec<ServiceError>,
}

#[derive(Debug, Default)]
struct StreamState {
    cursor: LogCursor,
    // Read but not handed out yet.
    pending: Vec<LogEvent>,
}

/// Follows every log stream of one job.
#[derive(Debug)]
pub struct LogRelay {
    group: String,
    prefix: String,
    call_timeout: Duration,
    streams: BTreeMap<String, StreamState>,
}

impl LogRelay {
    pub fn new(group: impl Into<String>, job: &JobIdentity, call_timeout: Duration) -> Self {
        Self {
            group: group.into(),
            prefix: format!("{job}/"),
            call_timeout,
            streams: BTreeMap::new(),
        }
    }

    pub fn cursor(&self, stream: &str) -> Option<&LogCursor> {
        self.streams.get(stream).map(|s| &s.cursor)
    }

    /// Discovers new streams and reads everything written since the last call.
    pub async fn fetch_new<L: LogService>(&mut self, logs: &L) -> RelayBatch {
        let mut batch = RelayBatch::default();

        match timed(self.call_timeout, logs.list_streams(&self.group, &self.prefix)).await {
            Ok(names) => {
                for name in names {
                    self.streams.entry(name).or_default();
                }
            }
            Err(ServiceError::NotFound(_)) => {}
            Err(err) => batch.errors.push(err),
        }

        let group = self.group.as_str();
        let limit = self.call_timeout;
        let drains = self
            .streams
            .iter_mut()
            .map(|(name, state)| drain(logs, group, name, state, limit));
        batch.errors.extend(join_all(drains).await.into_iter().flatten());

        for (name, state) in self.streams.iter_mut() {
            batch
                .lines
                .extend(state.pending.drain(..).map(|event| (name.clone(), event)));
        }

        batch
    }

    /// Emits new lines on [`JOB_LOG_TARGET`] and returns how many were emitted.
    ///
    /// Fetch failures are logged and retried on the next call.
    pub async fn relay<L: LogService>(&mut self, logs: &L) -> usize {
        let batch = self.fetch_new(logs).await;

        for err in &batch.errors {
            warn!(%err, "Failed to fetch job logs, retrying on next poll");
        }

        for (stream, event) in &batch.lines {
            info!(
                target: JOB_LOG_TARGET,
                "[{}] {}",
                self.label(stream),
                event.message.trim_end()
            );
        }

        batch.lines.len()
    }

    fn label<'a>(&self, stream: &'a str) -> &'a str {
        stream.strip_prefix(&self.prefix).unwrap_or(stream)
    }
}

/// Reads pages until the stream has nothing new, buffering them in `state`.
async fn drain<L: LogService>(
    logs: &L,
    group: &str,
    stream: &str,
    state: &mut StreamState,
    limit: Duration,
) -> Option<ServiceError> {
    for _ in 0..MAX_PAGES_PER_TICK {
        let (events, next) = match timed(limit, fetch(logs, group, stream, &state.cursor)).await {
            Ok(page) => page,
            Err(err) => return Some(err),
        };

        let caught_up = events.is_empty() || next.token == state.cursor.token;
        state.pending.extend(events);
        state.cursor = next;

        if caught_up {
            break;
        }
    }
    None
}
