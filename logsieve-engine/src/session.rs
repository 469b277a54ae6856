use crate::{
    config::EngineConfig,
    document::Document,
    events::{DocumentEvent, EventBus},
    source::LineSource,
};
use std::sync::mpsc::Receiver;
use uuid::Uuid;

/// application context: the open documents plus the bus their workers report on
pub struct Session {
    config: EngineConfig,
    bus: EventBus<DocumentEvent>,
    pages: Vec<Document>,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            bus: EventBus::new(),
            pages: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&self) -> Receiver<DocumentEvent> {
        self.bus.subscribe()
    }

    /// open a new page; ingestion starts in the background
    pub fn open(&mut self, source: LineSource) -> &Document {
        let document = Document::open(source, &self.config, self.bus.clone());
        log::debug!("Opened page {} ({})", document.name(), document.id());
        self.pages.push(document);
        let last = self.pages.len() - 1;
        &self.pages[last]
    }

    /// close a page without waiting for its worker; returns false for unknown ids
    pub fn close(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.pages.iter().position(|d| d.id() == id) else {
            return false;
        };
        let document = self.pages.remove(pos);
        log::debug!("Closing page {}", document.name());
        document.detach();
        true
    }

    pub fn get(&self, id: Uuid) -> Option<&Document> {
        self.pages.iter().find(|d| d.id() == id)
    }

    pub fn pages(&self) -> &[Document] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
