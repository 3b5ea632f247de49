//! Local key-value store for the little state that survives across runs:
//! the signed-in user id, cached per-user display profiles, and the
//! browse-history ring. Handed explicitly to whoever needs it; nothing in
//! here is global. Errors degrade to `None`/no-op, this is cache, not truth.

use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;

use crate::types::Profile;

const HISTORY_CAP: usize = 20;

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default location: ~/.local/share/stall (Linux) or the platform
    /// equivalent. Returns None if no data directory can be resolved.
    pub fn open_default() -> Option<Self> {
        let root = dirs::data_dir()?.join("stall");
        Some(Self::new(root))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = std::fs::read_to_string(self.path(key)).ok()?;
        serde_json::from_str(&data).ok()
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        if std::fs::create_dir_all(&self.root).is_err() {
            return;
        }
        if let Ok(data) = serde_json::to_string(value) {
            let _ = std::fs::write(self.path(key), data);
        }
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.path(key));
    }

    pub fn current_user_id(&self) -> Option<u64> {
        self.read("current_user")
    }

    pub fn set_current_user_id(&self, id: u64) {
        self.write("current_user", &id);
    }

    pub fn profile(&self, user_id: u64) -> Option<Profile> {
        self.read(&format!("profile_{}", user_id))
    }

    pub fn set_profile(&self, profile: &Profile) {
        self.write(&format!("profile_{}", profile.user.id), profile);
    }

    #[allow(dead_code)]
    pub fn remove_profile(&self, user_id: u64) {
        self.remove(&format!("profile_{}", user_id));
    }

    /// Most-recently-viewed goods ids, newest first.
    pub fn browse_history(&self) -> Vec<u64> {
        self.read("browse_history").unwrap_or_default()
    }

    /// Record a goods view. Re-visiting moves the id to the front; the ring
    /// holds at most [`HISTORY_CAP`] entries.
    pub fn push_browse_history(&self, goods_id: u64) {
        let mut history = self.browse_history();
        history.retain(|&id| id != goods_id);
        history.insert(0, goods_id);
        history.truncate(HISTORY_CAP);
        self.write("browse_history", &history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserBrief;

    fn temp_store(name: &str) -> Store {
        let root = std::env::temp_dir().join(format!("stall-store-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        Store::new(root)
    }

    #[test]
    fn current_user_roundtrip() {
        let store = temp_store("user");
        assert_eq!(store.current_user_id(), None);
        store.set_current_user_id(42);
        assert_eq!(store.current_user_id(), Some(42));
    }

    #[test]
    fn profile_set_get_remove() {
        let store = temp_store("profile");
        let profile = Profile {
            user: UserBrief {
                id: 7,
                nickname: "mei".to_string(),
                avatar: String::new(),
            },
            signature: "selling my old stuff".to_string(),
            goods_count: 3,
            sold_count: 1,
        };

        assert!(store.profile(7).is_none());
        store.set_profile(&profile);
        assert_eq!(store.profile(7).unwrap().user.nickname, "mei");

        store.remove_profile(7);
        assert!(store.profile(7).is_none());
    }

    #[test]
    fn history_caps_at_twenty() {
        let store = temp_store("history-cap");
        for id in 0..30 {
            store.push_browse_history(id);
        }
        let history = store.browse_history();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0], 29);
        assert_eq!(history[19], 10);
    }

    #[test]
    fn revisit_moves_to_front_without_duplicating() {
        let store = temp_store("history-revisit");
        store.push_browse_history(1);
        store.push_browse_history(2);
        store.push_browse_history(3);
        store.push_browse_history(1);

        assert_eq!(store.browse_history(), vec![1, 3, 2]);
    }

    #[test]
    fn missing_dir_reads_as_empty() {
        let store = temp_store("missing");
        assert!(store.browse_history().is_empty());
        assert!(store.profile(1).is_none());
    }
}
