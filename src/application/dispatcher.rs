//! # Event Dispatcher
//!
//! Fans incoming events out to one worker task per user, so one user's slow
//! request never stalls another user's dialogue. Each worker drains its
//! mailbox in arrival order, which keeps every session strictly sequential.

use crate::application::engine;
use crate::application::session::{Session, SessionState};
use crate::application::store::SessionStore;
use crate::domain::traits::ChatGateway;
use crate::domain::types::{Command, Effect, Event, EventKind, UserId};
use crate::infrastructure::executor::RequestExecutor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Per-user mailbox depth before events are shed.
const WORKER_QUEUE_SIZE: usize = 32;

pub struct Dispatcher {
    gateway: Arc<dyn ChatGateway>,
    store: Arc<SessionStore>,
    executor: Arc<RequestExecutor>,
    workers: Mutex<HashMap<UserId, mpsc::Sender<Event>>>,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        store: Arc<SessionStore>,
        executor: Arc<RequestExecutor>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            store,
            executor,
            workers: Mutex::new(HashMap::new()),
        })
    }

    /// Queue one event for its user's worker, spawning the worker on first
    /// contact. A full mailbox sheds the event rather than blocking the
    /// poll loop.
    pub async fn dispatch(self: &Arc<Self>, event: Event) {
        let user = event.user;
        let mut workers = self.workers.lock().await;
        let sender = workers
            .entry(user)
            .or_insert_with(|| self.spawn_worker(user));
        match sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    "Worker queue for {} is full, dropping {}",
                    user,
                    describe(&event.kind)
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                // The worker is gone; start a replacement and retry once.
                let sender = self.spawn_worker(user);
                if sender.try_send(event).is_err() {
                    tracing::warn!("Worker for {} could not be restarted", user);
                }
                workers.insert(user, sender);
            }
        }
    }

    fn spawn_worker(self: &Arc<Self>, user: UserId) -> mpsc::Sender<Event> {
        let (tx, mut rx) = mpsc::channel(WORKER_QUEUE_SIZE);
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            tracing::debug!("Worker started for {}", user);
            while let Some(event) = rx.recv().await {
                dispatcher.process(event).await;
            }
            tracing::debug!("Worker stopped for {}", user);
        });
        tx
    }

    /// Run one event through the engine, execute any request it completes,
    /// and deliver every effect in order.
    async fn process(&self, event: Event) {
        let user = event.user;
        tracing::info!("Processing {} from {}", describe(&event.kind), user);

        let session = self
            .store
            .get(user)
            .await
            .unwrap_or_else(|| Session::new(user));
        let mut result = engine::transition(&session, &event);

        if result.session.state == SessionState::Executing {
            // Announce first, run second: edits like the repeat notice must
            // land before the result does.
            self.deliver(user, result.effects).await;
            let outcome = self.executor.execute(&result.session).await;
            result = engine::settle(&result.session, outcome);
        }

        // A blank session reads back the same as no session at all.
        if result.session == Session::new(user) {
            self.store.delete(user).await;
        } else {
            self.store.put(result.session).await;
        }
        self.deliver(user, result.effects).await;
        tracing::debug!("{} sessions tracked", self.store.count().await);
    }

    async fn deliver(&self, user: UserId, effects: Vec<Effect>) {
        for effect in effects {
            let delivery = match effect {
                Effect::SendMessage { text, choices } => self
                    .gateway
                    .send_message(user, &text, choices)
                    .await
                    .map(|_| ()),
                Effect::EditMessage {
                    target,
                    text,
                    choices,
                } => self.gateway.edit_message(user, target, &text, choices).await,
            };
            if let Err(error) = delivery {
                tracing::error!("Delivery to {} failed: {}", user, error);
            }
        }
    }
}

/// Event label for logs. Message text never appears here; it may be the
/// bearer token.
fn describe(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Command(Command::Reset) => "a reset command",
        EventKind::Text(_) => "a text message",
        EventKind::Choice { .. } => "a button press",
    }
}
