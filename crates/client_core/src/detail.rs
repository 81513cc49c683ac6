use std::sync::Arc;

use shared::{
    domain::{EntitySummary, LocalizationRecord},
    error::CatalogError,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    controller::{AbortOnDrop, ControllerHandle, Envelope, Settle},
    sequence::{RequestSequence, RequestToken},
    CatalogApi,
};

#[derive(Debug, Clone)]
pub struct DetailSnapshot {
    pub key: String,
    pub entity: Option<Arc<EntitySummary>>,
    /// Best effort; `None` whenever the auxiliary record could not be loaded.
    pub localization: Option<Arc<LocalizationRecord>>,
    pub loading: bool,
    pub error: Option<String>,
    acknowledged: u64,
}

impl Settle for DetailSnapshot {
    fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    fn is_settled(&self) -> bool {
        !self.loading
    }
}

#[derive(Debug)]
enum DetailCommand {
    SetKey(String),
    Retry,
}

struct DetailEvent {
    token: RequestToken,
    summary: Result<EntitySummary, CatalogError>,
    localization: Option<LocalizationRecord>,
}

/// Loads one catalog entry, by id or name, together with its localization record.
pub struct DetailController {
    handle: ControllerHandle<DetailCommand, DetailSnapshot>,
}

impl DetailController {
    /// Starts the controller. An empty key leaves it idle. Must be called
    /// inside a Tokio runtime.
    pub fn spawn(api: Arc<dyn CatalogApi>, key: impl Into<String>) -> Self {
        let key = key.into().trim().to_string();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(DetailSnapshot {
            key: key.clone(),
            entity: None,
            localization: None,
            loading: !key.is_empty(),
            error: None,
            acknowledged: 0,
        });
        let worker = DetailWorker {
            api,
            key,
            entity: None,
            localization: None,
            loading: false,
            error: None,
            acknowledged: 0,
            sequence: RequestSequence::default(),
            events: event_tx,
            snapshots: snapshot_tx,
        };
        let task = AbortOnDrop::spawn(worker.run(command_rx, event_rx));
        Self {
            handle: ControllerHandle::new(command_tx, snapshot_rx, task),
        }
    }

    /// Switches to another entry. Results still in flight for the old key are
    /// discarded when they arrive.
    pub fn set_key(&self, key: impl Into<String>) {
        self.handle.send(DetailCommand::SetKey(key.into()));
    }

    pub fn retry(&self) {
        self.handle.send(DetailCommand::Retry);
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.handle.subscribe()
    }

    pub async fn settled(&self) -> DetailSnapshot {
        self.handle.settled().await
    }
}

struct DetailWorker {
    api: Arc<dyn CatalogApi>,
    key: String,
    entity: Option<Arc<EntitySummary>>,
    localization: Option<Arc<LocalizationRecord>>,
    loading: bool,
    error: Option<String>,
    acknowledged: u64,
    sequence: RequestSequence,
    events: mpsc::UnboundedSender<DetailEvent>,
    snapshots: watch::Sender<DetailSnapshot>,
}

impl DetailWorker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Envelope<DetailCommand>>,
        mut events: mpsc::UnboundedReceiver<DetailEvent>,
    ) {
        self.issue_fetch();
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(envelope) = command else { break };
                    self.apply(envelope);
                }
                Some(event) = events.recv() => self.on_event(event),
            }
        }
        debug!(key = %self.key, "detail: controller stopped");
    }

    fn apply(&mut self, envelope: Envelope<DetailCommand>) {
        self.acknowledged = envelope.seq;
        match envelope.command {
            DetailCommand::SetKey(key) => {
                let key = key.trim().to_string();
                if key == self.key {
                    self.publish();
                    return;
                }
                self.key = key;
                self.entity = None;
                self.localization = None;
                self.issue_fetch();
            }
            DetailCommand::Retry => self.issue_fetch(),
        }
    }

    fn issue_fetch(&mut self) {
        if self.key.is_empty() {
            self.sequence.invalidate();
            self.entity = None;
            self.localization = None;
            self.loading = false;
            self.error = None;
            self.publish();
            return;
        }

        let token = self.sequence.issue();
        self.loading = true;
        self.error = None;
        self.publish();

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let key = self.key.clone();
        debug!(key = %key, "detail: fetching entry");
        tokio::spawn(async move {
            let (summary, localization) =
                tokio::join!(api.fetch_summary(&key), api.fetch_localization(&key));
            let _ = events.send(DetailEvent {
                token,
                summary,
                localization: localization.ok(),
            });
        });
    }

    fn on_event(&mut self, event: DetailEvent) {
        if !self.sequence.is_current(event.token) {
            debug!(key = %self.key, "detail: stale result discarded");
            return;
        }
        match event.summary {
            Ok(entity) => {
                info!(key = %self.key, id = entity.id.0, "detail: entry loaded");
                self.entity = Some(Arc::new(entity));
                self.localization = event.localization.map(Arc::new);
                self.error = None;
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "detail: entry fetch failed");
                self.entity = None;
                self.localization = None;
                self.error = Some(err.user_message());
            }
        }
        self.loading = false;
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(DetailSnapshot {
            key: self.key.clone(),
            entity: self.entity.clone(),
            localization: self.localization.clone(),
            loading: self.loading,
            error: self.error.clone(),
            acknowledged: self.acknowledged,
        });
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
