use crate::{error::PatternError, line_store::ApplyOutcome};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    mpsc::{self, Receiver, Sender},
};
use uuid::Uuid;

/// something a document worker finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    Loaded {
        page: Uuid,
        lines: usize,
    },
    IngestionFailed {
        page: Uuid,
        message: String,
    },
    OperationsApplied {
        page: Uuid,
        outcome: ApplyOutcome,
    },
    PatternRejected {
        page: Uuid,
        error: PatternError,
    },
    SearchFinished {
        page: Uuid,
        total: usize,
        jump_index: usize,
        /// first visible filtered index passed with the query
        first_visible: usize,
    },
    SearchNotFound {
        page: Uuid,
        query: String,
    },
}

impl DocumentEvent {
    pub fn page(&self) -> Uuid {
        match self {
            DocumentEvent::Loaded { page, .. }
            | DocumentEvent::IngestionFailed { page, .. }
            | DocumentEvent::OperationsApplied { page, .. }
            | DocumentEvent::PatternRejected { page, .. }
            | DocumentEvent::SearchFinished { page, .. }
            | DocumentEvent::SearchNotFound { page, .. } => *page,
        }
    }
}

/// fan-out of events to every live subscriber
pub struct EventBus<E> {
    subscribers: Arc<Mutex<Vec<Sender<E>>>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<E> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// deliver `event` to every subscriber, dropping those that hung up
    pub fn publish(&self, event: E) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
        }
    }
}
