use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::board::{Completion, Request};
use crate::repo::TaskRepository;

/// Runs board requests in the background and hands back their completions.
///
/// Requests are not sequenced: each one is spawned as soon as it is
/// dispatched and completions arrive in whatever order the backend answers.
pub struct Dispatcher {
    repo: Arc<dyn TaskRepository>,
    handle: Handle,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(repo: Arc<dyn TaskRepository>, handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            repo,
            handle,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, request: Request) {
        debug!(?request, "dispatching");
        self.in_flight += 1;
        let repo = Arc::clone(&self.repo);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let completion = run(repo.as_ref(), request).await;
            // The receiver only goes away on shutdown.
            let _ = tx.send(completion);
        });
    }

    /// Next finished request, without waiting.
    pub fn try_next(&mut self) -> Option<Completion> {
        let completion = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    #[cfg(test)]
    pub async fn next(&mut self) -> Option<Completion> {
        let completion = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

async fn run(repo: &dyn TaskRepository, request: Request) -> Completion {
    match request {
        Request::Fetch => Completion::Fetched(repo.list().await),
        Request::Create(fields) => Completion::Created(repo.create(&fields).await),
        Request::Update(id, fields) => Completion::Updated {
            id,
            result: repo.update(id, &fields).await,
        },
        Request::Delete(id) => Completion::Deleted {
            id,
            result: repo.delete(id).await,
        },
    }
}
