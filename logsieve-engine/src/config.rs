use crate::filter::{DEFAULT_PARALLEL_THRESHOLD, FilterEngine};

/// settings shared by every document of a session
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// documents with more lines than this are re-filtered with rayon
    pub parallel_threshold: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub(crate) fn filter_engine(&self) -> FilterEngine {
        FilterEngine::new(self.parallel_threshold)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
