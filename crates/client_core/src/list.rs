use std::sync::Arc;

use shared::{
    domain::{EntitySummary, PageState},
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
pub struct ListSnapshot {
    pub entities: Arc<Vec<EntitySummary>>,
    pub page: PageState,
    pub loading: bool,
    pub error: Option<String>,
    acknowledged: u64,
}

impl ListSnapshot {
    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page.has_prev()
    }

    pub fn has_next(&self) -> bool {
        self.page.has_more
    }
}

impl Settle for ListSnapshot {
    fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    fn is_settled(&self) -> bool {
        !self.loading
    }
}

#[derive(Debug)]
enum ListCommand {
    NextPage,
    PrevPage,
    GoToPage(u32),
    SetPageSize(u32),
    Retry,
}

enum ListEvent {
    Page {
        token: RequestToken,
        total_count: u32,
        has_more: bool,
    },
    Done {
        token: RequestToken,
        result: Result<Vec<EntitySummary>, CatalogError>,
    },
}

/// Paginated browsing over the catalog index.
///
/// Each page change lists one page of references and resolves all of them
/// before the entries are replaced. Controls outside the known page range are
/// no-ops. Dropping the controller stops it.
pub struct ListController {
    handle: ControllerHandle<ListCommand, ListSnapshot>,
}

impl ListController {
    /// Starts the controller and its first page fetch. Must be called inside a
    /// Tokio runtime.
    pub fn spawn(api: Arc<dyn CatalogApi>, page_size: u32) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let page = PageState::new(page_size);
        let (snapshot_tx, snapshot_rx) = watch::channel(ListSnapshot {
            entities: Arc::default(),
            page,
            loading: true,
            error: None,
            acknowledged: 0,
        });
        let worker = ListWorker {
            api,
            page,
            entities: Arc::default(),
            loading: true,
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

    pub fn next_page(&self) {
        self.handle.send(ListCommand::NextPage);
    }

    pub fn prev_page(&self) {
        self.handle.send(ListCommand::PrevPage);
    }

    pub fn go_to_page(&self, page_index: u32) {
        self.handle.send(ListCommand::GoToPage(page_index));
    }

    pub fn set_page_size(&self, page_size: u32) {
        self.handle.send(ListCommand::SetPageSize(page_size));
    }

    /// Re-runs the current page's fetch unconditionally.
    pub fn retry(&self) {
        self.handle.send(ListCommand::Retry);
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.handle.subscribe()
    }

    /// Waits for the first snapshot that reflects every control issued so far
    /// with no fetch outstanding.
    pub async fn settled(&self) -> ListSnapshot {
        self.handle.settled().await
    }
}

struct ListWorker {
    api: Arc<dyn CatalogApi>,
    page: PageState,
    entities: Arc<Vec<EntitySummary>>,
    loading: bool,
    error: Option<String>,
    acknowledged: u64,
    sequence: RequestSequence,
    events: mpsc::UnboundedSender<ListEvent>,
    snapshots: watch::Sender<ListSnapshot>,
}

impl ListWorker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Envelope<ListCommand>>,
        mut events: mpsc::UnboundedReceiver<ListEvent>,
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
        debug!("list: controller stopped");
    }

    fn apply(&mut self, envelope: Envelope<ListCommand>) {
        self.acknowledged = envelope.seq;
        let target = match envelope.command {
            ListCommand::NextPage => self.page.next_index(),
            ListCommand::PrevPage => self.page.prev_index(),
            ListCommand::GoToPage(page_index) => self.page.checked_index(page_index),
            ListCommand::SetPageSize(page_size) => {
                let page_size = page_size.max(1);
                if page_size != self.page.page_size {
                    self.page.page_size = page_size;
                    let last = self.page.total_pages().saturating_sub(1);
                    self.page.page_index = self.page.page_index.min(last);
                    self.issue_fetch();
                } else {
                    self.publish();
                }
                return;
            }
            ListCommand::Retry => {
                self.issue_fetch();
                return;
            }
        };

        match target {
            Some(page_index) if page_index != self.page.page_index => {
                self.page.page_index = page_index;
                self.issue_fetch();
            }
            _ => {
                debug!(
                    page_index = self.page.page_index,
                    total_pages = self.page.total_pages(),
                    "list: navigation outside range ignored"
                );
                self.publish();
            }
        }
    }

    fn issue_fetch(&mut self) {
        let token = self.sequence.issue();
        self.loading = true;
        self.error = None;
        self.publish();

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let page_size = self.page.page_size;
        let offset = self.page.offset();
        debug!(page_index = self.page.page_index, offset, "list: fetching page");
        tokio::spawn(async move {
            let result: Result<Vec<EntitySummary>, CatalogError> = async {
                let listing = api.list_references(page_size, offset).await?;
                let _ = events.send(ListEvent::Page {
                    token,
                    total_count: listing.total_count,
                    has_more: listing.has_more,
                });
                api.fetch_many_summaries(&listing.references).await
            }
            .await;
            let _ = events.send(ListEvent::Done { token, result });
        });
    }

    fn on_event(&mut self, event: ListEvent) {
        match event {
            ListEvent::Page {
                token,
                total_count,
                has_more,
            } => {
                if !self.sequence.is_current(token) {
                    return;
                }
                self.page.total_count = total_count;
                self.page.has_more = has_more;
                self.publish();
            }
            ListEvent::Done { token, result } => {
                if !self.sequence.is_current(token) {
                    debug!("list: stale page result discarded");
                    return;
                }
                match result {
                    Ok(entities) => {
                        info!(
                            page_index = self.page.page_index,
                            count = entities.len(),
                            "list: page loaded"
                        );
                        self.entities = Arc::new(entities);
                        self.error = None;
                    }
                    Err(err) => {
                        warn!(
                            page_index = self.page.page_index,
                            error = %err,
                            "list: page fetch failed"
                        );
                        self.entities = Arc::default();
                        self.error = Some(err.user_message());
                    }
                }
                self.loading = false;
                self.publish();
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(ListSnapshot {
            entities: Arc::clone(&self.entities),
            page: self.page,
            loading: self.loading,
            error: self.error.clone(),
            acknowledged: self.acknowledged,
        });
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
