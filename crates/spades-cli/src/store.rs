use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use spades_core::game::match_state::MatchState;
use spades_core::game::serialization::MatchSnapshot;
use spades_core::model::variant::RuleVariant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read saved match {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("saved match {path:?} is not valid: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("failed to encode match: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write saved match {path:?}: {source}")]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// A single JSON document holding the whole match.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn try_load(&self) -> Result<Option<MatchSnapshot>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    source,
                    path: self.path.clone(),
                });
            }
        };
        MatchSnapshot::from_json(&json)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                source,
                path: self.path.clone(),
            })
    }

    /// Load the saved match, or start a new one in `variant` when nothing
    /// usable is on disk. Unreadable saves are logged, never fatal.
    pub fn load_or_new(&self, variant: RuleVariant) -> MatchState {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                debug!(path = %self.path.display(), "saved match loaded");
                snapshot.restore()
            }
            Ok(None) => MatchState::new(variant),
            Err(err) => {
                warn!(%err, "starting a new match");
                MatchState::new(variant)
            }
        }
    }

    pub fn save(&self, state: &MatchState) -> Result<(), StoreError> {
        let json = MatchSnapshot::to_json(state).map_err(StoreError::Encode)?;
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                source,
                path: self.path.clone(),
            })?;
        }
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            source,
            path: self.path.clone(),
        })?;
        debug!(path = %self.path.display(), "match saved");
        Ok(())
    }

    /// Save, logging a failure instead of returning it; the in-memory match
    /// stays authoritative.
    pub fn save_or_warn(&self, state: &MatchState) -> bool {
        match self.save(state) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "match could not be saved");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SnapshotStore, StoreError};
    use spades_core::game::confirm::AutoApprove;
    use spades_core::game::match_state::MatchState;
    use spades_core::model::bid::Bid;
    use spades_core::model::player::{PlayerPosition, Team};
    use spades_core::model::variant::RuleVariant;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_starts_new_match() {
        let dir = tempdir().expect("temp dir");
        let store = SnapshotStore::new(dir.path().join("state.json"));
        assert!(store.try_load().expect("load").is_none());
        let state = store.load_or_new(RuleVariant::Short);
        assert_eq!(state.variant(), RuleVariant::Short);
    }

    #[test]
    fn saved_match_is_loaded_back() {
        let dir = tempdir().expect("temp dir");
        let store = SnapshotStore::new(dir.path().join("nested/state.json"));
        let mut state = MatchState::new(RuleVariant::Tournament);
        state.rename_team(Team::EastWest, "Kings");
        store.save(&state).expect("save");

        let loaded = store.load_or_new(RuleVariant::Regular);
        assert_eq!(loaded, state);
    }

    #[test]
    fn corrupt_file_is_reported_and_replaced() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").expect("write");
        let store = SnapshotStore::new(&path);

        assert!(matches!(store.try_load(), Err(StoreError::Decode { .. })));
        let state = store.load_or_new(RuleVariant::Regular);
        assert!(state.history().is_empty());
    }

    #[test]
    fn out_of_range_bid_in_save_starts_new_match() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("state.json");
        let store = SnapshotStore::new(&path);

        let mut state = MatchState::new(RuleVariant::Regular);
        for seat in PlayerPosition::LOOP {
            state.set_bid(seat, Bid::Contract(3)).unwrap();
        }
        state.submit_bids(&mut AutoApprove).unwrap();
        state.set_team_tricks(Team::NorthSouth, 8).unwrap();
        state.submit_tricks(&mut AutoApprove).unwrap();
        state.finalize_round(&mut AutoApprove).unwrap();
        store.save(&state).expect("save");

        let saved = fs::read_to_string(&path).expect("read");
        fs::write(&path, saved.replace("\"Contract\": 3", "\"Contract\": 200")).expect("write");

        assert!(matches!(store.try_load(), Err(StoreError::Decode { .. })));
        let loaded = store.load_or_new(RuleVariant::Short);
        assert_eq!(loaded.variant(), RuleVariant::Short);
        assert!(loaded.history().is_empty());
    }

    #[test]
    fn failed_save_does_not_panic() {
        let dir = tempdir().expect("temp dir");
        // The parent "directory" is a regular file, so the write must fail.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").expect("write");
        let store = SnapshotStore::new(blocker.join("state.json"));
        assert!(!store.save_or_warn(&MatchState::default()));
    }
}
