//! Playback position persisted across owner restarts
//!
//! The owner hands over its own state as JSON; the blob stores it next to the
//! playback offset so both come back together.

use crate::{Result, TalkError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The owner's state plus the offset playback will resume from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Whatever the owner chose to store
    #[serde(default)]
    pub owner: Value,
    /// Byte offset of the next word to speak
    pub offset: usize,
}

impl SavedState {
    pub fn new(owner: Value, offset: usize) -> Self {
        Self { owner, offset }
    }

    /// Serialize to an opaque string blob
    pub fn to_blob(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a blob produced by `to_blob`
    pub fn from_blob(blob: &str) -> Result<Self> {
        serde_json::from_str(blob)
            .map_err(|e| TalkError::State(format!("Invalid saved state: {}", e)))
    }
}

/// Directory of saved states, one file per key
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location (~/.talkingtext/state)
    pub fn default_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or("Could not find home directory")?
            .join(".talkingtext")
            .join("state"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a key's state lives in; the key is flattened into a file name
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    /// Load the state saved under `key`, if any
    pub fn load(&self, key: &str) -> Result<Option<SavedState>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!("No saved state at {:?}", path);
            return Ok(None);
        }

        let blob = fs::read_to_string(&path)?;
        let state = SavedState::from_blob(&blob)?;
        info!("Loaded saved state from {:?} (offset {})", path, state.offset);
        Ok(Some(state))
    }

    pub fn save(&self, key: &str, state: &SavedState) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        fs::write(&path, state.to_blob()?)?;
        debug!("Saved state to {:?} (offset {})", path, state.offset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blob_keeps_owner_state() {
        let state = SavedState::new(json!({"scroll": 3, "title": "notes"}), 42);
        let restored = SavedState::from_blob(&state.to_blob().unwrap()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_blob_without_owner() {
        let state = SavedState::from_blob(r#"{"offset": 7}"#).unwrap();
        assert_eq!(state.offset, 7);
        assert_eq!(state.owner, Value::Null);
    }

    #[test]
    fn test_invalid_blob() {
        assert!(matches!(
            SavedState::from_blob("not json"),
            Err(TalkError::State(_))
        ));
        assert!(SavedState::from_blob(r#"{"owner": {}}"#).is_err());
    }

    #[test]
    fn test_path_for_flattens_key() {
        let store = StateStore::new("/tmp/states");
        assert_eq!(
            store.path_for("/home/me/book one.txt"),
            PathBuf::from("/tmp/states/_home_me_book_one.txt.json")
        );
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested"));

        assert_eq!(store.load("story").unwrap(), None);

        let state = SavedState::new(json!({"path": "story.txt"}), 12);
        store.save("story", &state).unwrap();
        assert_eq!(store.load("story").unwrap(), Some(state));
    }
}
