use crate::models::fact::Fact;
use crate::utils::storage::{GameStore, MemoryStore};

/// Context shared by every operation: the persistence store plus the content
/// fetched once at startup. Built in `main` (or from a test fixture) and
/// passed around explicitly instead of living in process globals.
pub struct AppState {
    pub store: Box<dyn GameStore>,
    pub facts: Vec<Fact>,
    pub public_url: Option<String>,
}

impl AppState {
    pub fn new(store: Box<dyn GameStore>, facts: Vec<Fact>, public_url: Option<String>) -> Self {
        AppState {
            store,
            facts,
            public_url,
        }
    }

    /// Fixture state: in-memory store, no fetched content.
    pub fn in_memory() -> Self {
        Self::new(Box::<MemoryStore>::default(), Vec::new(), None)
    }
}
