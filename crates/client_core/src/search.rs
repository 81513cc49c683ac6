use std::{sync::Arc, time::Duration};

use shared::{
    domain::{EntitySummary, QueryState},
    error::CatalogError,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    controller::{cancellable, AbortOnDrop, CancelHandle, ControllerHandle, Envelope, Settle},
    sequence::{RequestSequence, RequestToken},
    settings::ClientSettings,
    CatalogApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Settled query is empty.
    Idle,
    /// An edit is waiting out the debounce window.
    Debouncing,
    /// A request for the settled query is in flight.
    Searching,
    Settled,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    pub query: QueryState,
    pub results: Arc<Vec<EntitySummary>>,
    pub loading: bool,
    pub error: Option<String>,
    pub phase: SearchPhase,
    acknowledged: u64,
}

impl SearchSnapshot {
    pub fn is_searching(&self) -> bool {
        !self.query.settled_query.trim().is_empty()
    }
}

impl Settle for SearchSnapshot {
    fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    fn is_settled(&self) -> bool {
        !matches!(self.phase, SearchPhase::Debouncing | SearchPhase::Searching)
    }
}

#[derive(Debug)]
enum SearchCommand {
    SetQuery(String),
    ClearSearch,
}

enum SearchEvent {
    TimerFired {
        generation: u64,
    },
    Done {
        token: RequestToken,
        result: Result<Vec<EntitySummary>, CatalogError>,
    },
}

/// Debounced name search.
///
/// Every edit restarts the debounce timer; only the value present when the
/// timer fires becomes the settled query. A newly settled query cancels the
/// request still running for the previous one. Dropping the controller stops
/// the timer and the request.
pub struct SearchController {
    handle: ControllerHandle<SearchCommand, SearchSnapshot>,
}

impl SearchController {
    /// Must be called inside a Tokio runtime.
    pub fn spawn(api: Arc<dyn CatalogApi>, settings: &ClientSettings) -> Self {
        Self::with_window(api, settings.debounce(), settings.search_result_cap)
    }

    pub fn with_window(api: Arc<dyn CatalogApi>, debounce: Duration, result_cap: usize) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SearchSnapshot {
            query: QueryState::default(),
            results: Arc::default(),
            loading: false,
            error: None,
            phase: SearchPhase::Idle,
            acknowledged: 0,
        });
        let worker = SearchWorker {
            api,
            debounce,
            result_cap,
            query: QueryState::default(),
            results: Arc::default(),
            error: None,
            acknowledged: 0,
            timer: None,
            timer_generation: 0,
            in_flight: None,
            sequence: RequestSequence::default(),
            events: event_tx,
            snapshots: snapshot_tx,
        };
        let task = AbortOnDrop::spawn(worker.run(command_rx, event_rx));
        Self {
            handle: ControllerHandle::new(command_tx, snapshot_rx, task),
        }
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.handle.send(SearchCommand::SetQuery(query.into()));
    }

    /// Drops current results and error. The query and any pending timer are
    /// left alone.
    pub fn clear_search(&self) {
        self.handle.send(SearchCommand::ClearSearch);
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.handle.subscribe()
    }

    /// Waits until every edit so far has settled and its search, if any, has
    /// completed.
    pub async fn settled(&self) -> SearchSnapshot {
        self.handle.settled().await
    }
}

struct SearchWorker {
    api: Arc<dyn CatalogApi>,
    debounce: Duration,
    result_cap: usize,
    query: QueryState,
    results: Arc<Vec<EntitySummary>>,
    error: Option<String>,
    acknowledged: u64,
    timer: Option<AbortOnDrop>,
    timer_generation: u64,
    in_flight: Option<CancelHandle>,
    sequence: RequestSequence,
    events: mpsc::UnboundedSender<SearchEvent>,
    snapshots: watch::Sender<SearchSnapshot>,
}

impl SearchWorker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Envelope<SearchCommand>>,
        mut events: mpsc::UnboundedReceiver<SearchEvent>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(envelope) = command else { break };
                    self.apply(envelope);
                }
                Some(event) = events.recv() => self.on_event(event),
            }
        }
        debug!("search: controller stopped");
    }

    fn apply(&mut self, envelope: Envelope<SearchCommand>) {
        self.acknowledged = envelope.seq;
        match envelope.command {
            SearchCommand::SetQuery(raw) => {
                if raw != self.query.raw_query {
                    self.query.raw_query = raw;
                    self.restart_timer();
                }
            }
            SearchCommand::ClearSearch => {
                self.results = Arc::default();
                self.error = None;
            }
        }
        self.publish();
    }

    fn restart_timer(&mut self) {
        self.timer_generation += 1;
        let generation = self.timer_generation;
        let events = self.events.clone();
        let debounce = self.debounce;
        // Replacing the slot aborts the superseded timer.
        self.timer = Some(AbortOnDrop::spawn(async move {
            tokio::time::sleep(debounce).await;
            let _ = events.send(SearchEvent::TimerFired { generation });
        }));
    }

    fn on_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::TimerFired { generation } => {
                if generation != self.timer_generation {
                    return;
                }
                self.timer = None;
                let settled = self.query.raw_query.clone();
                self.settle(settled);
            }
            SearchEvent::Done { token, result } => self.on_done(token, result),
        }
    }

    fn settle(&mut self, settled: String) {
        if settled == self.query.settled_query {
            self.publish();
            return;
        }
        self.query.settled_query = settled;

        if let Some(previous) = self.in_flight.take() {
            debug!("search: cancelling superseded request");
            previous.cancel();
        }

        if self.query.settled_query.trim().is_empty() {
            self.sequence.invalidate();
            self.results = Arc::default();
            self.error = None;
            self.publish();
            return;
        }

        let token = self.sequence.issue();
        self.error = None;

        let api = Arc::clone(&self.api);
        let query = self.query.settled_query.clone();
        let result_cap = self.result_cap;
        debug!(query = %query, "search: issuing request");
        let (cancel, guarded) = cancellable(async move {
            let matches = api.search_references(&query).await?;
            let capped: Vec<_> = matches.into_iter().take(result_cap).collect();
            api.fetch_many_summaries(&capped).await
        });
        self.in_flight = Some(cancel);
        self.publish();

        let events = self.events.clone();
        tokio::spawn(async move {
            let result = guarded.await;
            let _ = events.send(SearchEvent::Done { token, result });
        });
    }

    fn on_done(&mut self, token: RequestToken, result: Result<Vec<EntitySummary>, CatalogError>) {
        if !self.sequence.is_current(token) {
            debug!("search: stale result discarded");
            return;
        }
        self.in_flight = None;
        match result {
            Ok(results) => {
                info!(
                    query = %self.query.settled_query,
                    count = results.len(),
                    "search: results loaded"
                );
                self.results = Arc::new(results);
                self.error = None;
            }
            Err(err) if err.is_aborted() => {
                debug!(query = %self.query.settled_query, "search: request aborted");
            }
            Err(err) => {
                warn!(query = %self.query.settled_query, error = %err, "search: request failed");
                self.results = Arc::default();
                self.error = Some(err.user_message());
            }
        }
        self.publish();
    }

    fn phase(&self) -> SearchPhase {
        if self.timer.is_some() {
            SearchPhase::Debouncing
        } else if self.in_flight.is_some() {
            SearchPhase::Searching
        } else if self.error.is_some() {
            SearchPhase::Failed
        } else if self.query.settled_query.trim().is_empty() {
            SearchPhase::Idle
        } else {
            SearchPhase::Settled
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(SearchSnapshot {
            query: self.query.clone(),
            results: Arc::clone(&self.results),
            loading: self.in_flight.is_some(),
            error: self.error.clone(),
            phase: self.phase(),
            acknowledged: self.acknowledged,
        });
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
