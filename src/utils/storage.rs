use log::warn;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::models::game::Game;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write the game record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode the game record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence contract for the single shared game record. A corrupt or
/// unreadable record is treated the same as no record at all: the app falls
/// back to setup instead of crashing on stale data.
pub trait GameStore {
    fn load(&self) -> Option<Game>;
    fn save(&self, game: &Game) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON document at a fixed path; the device-local stand-in for browser
/// storage.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GameStore for FileStore {
    fn load(&self) -> Option<Game> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("game record at {:?} unreadable: {}", self.path, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("stored game record is corrupt, starting over: {}", e);
                None
            }
        }
    }

    fn save(&self, game: &Game) -> Result<(), StoreError> {
        let doc = serde_json::to_string(game)?;
        fs::write(&self.path, doc)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests. Keeps the serialized document, so tests
/// exercise the same encode/decode round-trip as the file store.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl GameStore for MemoryStore {
    fn load(&self) -> Option<Game> {
        let slot = self.slot.lock().unwrap();
        let raw = slot.as_ref()?;
        match serde_json::from_str(raw) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("stored game record is corrupt, starting over: {}", e);
                None
            }
        }
    }

    fn save(&self, game: &Game) -> Result<(), StoreError> {
        let doc = serde_json::to_string(game)?;
        *self.slot.lock().unwrap() = Some(doc);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}
