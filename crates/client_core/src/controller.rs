//! Plumbing shared by the list, detail and search controllers: the handle a
//! presentation layer holds, the worker task it owns, and the cancellation
//! primitives used by in-flight work.

use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};

use shared::error::CatalogError;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::debug;

pub(crate) struct Envelope<C> {
    pub(crate) seq: u64,
    pub(crate) command: C,
}

pub(crate) trait Settle: Clone + Send + Sync + 'static {
    /// Sequence number of the last control the worker has applied.
    fn acknowledged(&self) -> u64;
    /// No timer or request is pending.
    fn is_settled(&self) -> bool;
}

/// Aborts the wrapped task when dropped.
pub(crate) struct AbortOnDrop(JoinHandle<()>);

impl AbortOnDrop {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Cancels the paired [`cancellable`] future. Dropping the handle cancels too.
pub(crate) struct CancelHandle(Option<oneshot::Sender<()>>);

impl CancelHandle {
    pub(crate) fn cancel(mut self) {
        if let Some(tx) = self.0.take() {
            let _ = tx.send(());
        }
    }
}

/// Races `work` against its cancel handle. On cancellation `work` is dropped,
/// which tears down the underlying HTTP request, and the future resolves to
/// [`CatalogError::Aborted`].
pub(crate) fn cancellable<T, F>(
    work: F,
) -> (CancelHandle, impl Future<Output = Result<T, CatalogError>>)
where
    F: Future<Output = Result<T, CatalogError>>,
{
    let (tx, rx) = oneshot::channel::<()>();
    let guarded = async move {
        tokio::select! {
            biased;
            _ = rx => Err(CatalogError::Aborted),
            result = work => result,
        }
    };
    (CancelHandle(Some(tx)), guarded)
}

pub(crate) struct ControllerHandle<C, S> {
    commands: mpsc::UnboundedSender<Envelope<C>>,
    issued: AtomicU64,
    snapshots: watch::Receiver<S>,
    _worker: AbortOnDrop,
}

impl<C, S> ControllerHandle<C, S>
where
    C: Send + 'static,
    S: Settle,
{
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Envelope<C>>,
        snapshots: watch::Receiver<S>,
        worker: AbortOnDrop,
    ) -> Self {
        Self {
            commands,
            issued: AtomicU64::new(0),
            snapshots,
            _worker: worker,
        }
    }

    pub(crate) fn send(&self, command: C) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if self.commands.send(Envelope { seq, command }).is_err() {
            debug!(seq, "controller: worker stopped, control dropped");
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.snapshots.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.snapshots.clone()
    }

    pub(crate) async fn settled(&self) -> S {
        let target = self.issued.load(Ordering::SeqCst);
        let mut rx = self.snapshots.clone();
        let settled = rx
            .wait_for(|snapshot| snapshot.acknowledged() >= target && snapshot.is_settled())
            .await
            .map(|snapshot| snapshot.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }
}
