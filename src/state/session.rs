use liga_api::{PlayoffBracket, Season};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Score entered for one league match during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEdit {
    pub home: Option<u16>,
    pub away: Option<u16>,
}

/// Everything the user changed on top of the loaded season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedSession {
    pub season_id: String,
    /// League match id → edited score. Sorted so the blob diffs cleanly.
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreEdit>,
    #[serde(default)]
    pub bracket: Option<PlayoffBracket>,
}

impl SimulatedSession {
    pub fn new(season_id: impl Into<String>) -> Self {
        Self {
            season_id: season_id.into(),
            ..Self::default()
        }
    }

    /// Replay the recorded league edits onto `season`. Edits for matches that
    /// no longer exist are dropped.
    pub fn apply_scores(&mut self, season: &mut Season) {
        self.scores
            .retain(|match_id, edit| season.set_match_score(match_id, edit.home, edit.away));
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.bracket.is_none()
    }

    pub fn to_blob(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("serialize session failed: {e}"))
    }

    pub fn from_blob(blob: &str) -> Result<Self, String> {
        serde_json::from_str(blob).map_err(|e| format!("parse session failed: {e}"))
    }
}

/// Key/value persistence for session blobs.
pub trait SessionStore: Send {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, blob: &str) -> Result<(), String>;
    fn remove(&mut self, key: &str) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// FileStore: one JSON file per season under the user config dir
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$XDG_CONFIG_HOME/ligatui`, then `$HOME/.config/ligatui`, then the
    /// working directory.
    pub fn default_location() -> Self {
        Self::new(config_dir())
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), String> {
        std::fs::create_dir_all(&self.root).map_err(|e| format!("create dir failed: {e}"))?;
        std::fs::write(self.path_for(key), blob).map_err(|e| format!("write session failed: {e}"))
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("remove session failed: {e}")),
        }
    }
}

fn config_dir() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("ligatui");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("ligatui");
    }
    PathBuf::from(".ligatui")
}

// ---------------------------------------------------------------------------
// MemoryStore: in-process store for tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), String> {
        self.entries.insert(key.to_owned(), blob.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        self.entries.remove(key);
        Ok(())
    }
}
