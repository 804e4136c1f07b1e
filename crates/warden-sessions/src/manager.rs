use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, instrument, warn};

use crate::error::{Result, SessionError};
use crate::types::{sanitize_key, Session};

/// File-backed manager for persisted conversation sessions.
///
/// Sessions live at `<workspace>/sessions/<sanitized_key>.json`. An in-memory
/// cache is authoritative only between successful `save`s: any failure
/// invalidates the cache entry for that key so the next read reloads from
/// disk.
pub struct SessionManager {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Session>>,
}

impl SessionManager {
    /// Creates `<workspace>/sessions/` if missing.
    pub fn new(workspace: impl AsRef<Path>) -> Result<Self> {
        let dir = workspace.as_ref().join("sessions");
        std::fs::create_dir_all(&dir).map_err(|e| SessionError::Io {
            key: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            dir,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Returns the cached/loaded session for `key`, or a fresh empty one.
    #[instrument(skip(self), fields(key = %key))]
    pub fn get_or_create(&self, key: &str) -> Result<Session> {
        if let Some(session) = self.cache.lock().unwrap().get(key).cloned() {
            debug!("session cache hit");
            return Ok(session);
        }

        let path = self.path_for(key);
        let session = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "corrupt session file, treating as missing");
                    Session::new(key)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Session::new(key),
            Err(e) => {
                return Err(SessionError::Io {
                    key: key.to_string(),
                    source: e,
                })
            }
        };

        self.cache.lock().unwrap().insert(key.to_string(), session.clone());
        Ok(session)
    }

    /// Atomically writes the session (temp file + rename) and refreshes the
    /// cache. Rejects sanitisation collisions with a different logical key
    /// (see DESIGN.md for the key-collision decision).
    #[instrument(skip(self, session), fields(key = %session.key))]
    pub fn save(&self, session: &Session) -> Result<()> {
        let path = self.path_for(&session.key);

        if let Ok(raw) = std::fs::read_to_string(&path) {
            if let Ok(existing) = serde_json::from_str::<Session>(&raw) {
                if existing.key != session.key {
                    return Err(SessionError::KeyCollision {
                        key: session.key.clone(),
                        existing: existing.key,
                    });
                }
            }
        }

        let body = serde_json::to_string_pretty(session).map_err(|e| SessionError::Corrupt {
            key: session.key.clone(),
            reason: e.to_string(),
        })?;

        let tmp = path.with_extension("json.tmp");
        let write_result = std::fs::write(&tmp, &body).and_then(|_| std::fs::rename(&tmp, &path));

        match write_result {
            Ok(()) => {
                self.cache
                    .lock()
                    .unwrap()
                    .insert(session.key.clone(), session.clone());
                Ok(())
            }
            Err(e) => {
                self.cache.lock().unwrap().remove(&session.key);
                let _ = std::fs::remove_file(&tmp);
                Err(SessionError::Io {
                    key: session.key.clone(),
                    source: e,
                })
            }
        }
    }

    /// Removes the on-disk file and the cache entry. Returns whether
    /// anything was removed.
    #[instrument(skip(self), fields(key = %key))]
    pub fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        self.cache.lock().unwrap().remove(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionError::Io {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    /// Lists every session currently on disk.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let mut out = Vec::new();
        let entries = std::fs::read_dir(&self.dir).map_err(|e| SessionError::Io {
            key: self.dir.display().to_string(),
            source: e,
        })?;

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(raw) = std::fs::read_to_string(&path) else {
                continue;
            };
            let Ok(session) = serde_json::from_str::<Session>(&raw) else {
                continue;
            };
            out.push(SessionSummary {
                key: session.key,
                updated_at: session.updated_at,
                message_count: session.messages.len(),
            });
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub key: String,
    pub updated_at: String,
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn manager() -> (tempfile::TempDir, SessionManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();
        (dir, manager)
    }

    #[test]
    fn get_or_create_returns_fresh_session() {
        let (_dir, manager) = manager();
        let session = manager.get_or_create("telegram:chat1").unwrap();
        assert_eq!(session.key, "telegram:chat1");
        assert_eq!(session.messages.len(), 0);
    }

    #[test]
    fn save_then_get_or_create_round_trips() {
        let (_dir, manager) = manager();
        let mut session = manager.get_or_create("telegram:chat1").unwrap();
        session.add_message("user", "Saved message", Map::new());
        session.add_message("assistant", "Got it!", Map::new());
        manager.save(&session).unwrap();

        let loaded = manager.get_or_create("telegram:chat1").unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert!(loaded.updated_at >= session.created_at);
    }

    #[test]
    fn save_survives_fresh_manager_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();
        let mut session = manager.get_or_create("telegram:chat1").unwrap();
        session.add_message("user", "persisted", Map::new());
        manager.save(&session).unwrap();

        let reopened = SessionManager::new(dir.path()).unwrap();
        let loaded = reopened.get_or_create("telegram:chat1").unwrap();
        assert_eq!(loaded.messages.len(), 1);
    }

    #[test]
    fn delete_removes_session_and_reports_true() {
        let (_dir, manager) = manager();
        let session = manager.get_or_create("telegram:chat1").unwrap();
        manager.save(&session).unwrap();

        assert!(manager.delete("telegram:chat1").unwrap());
        let fresh = manager.get_or_create("telegram:chat1").unwrap();
        assert_eq!(fresh.messages.len(), 0);
    }

    #[test]
    fn delete_nonexistent_returns_false() {
        let (_dir, manager) = manager();
        assert!(!manager.delete("telegram:nonexistent").unwrap());
    }

    #[test]
    fn list_sessions_reports_saved_sessions() {
        let (_dir, manager) = manager();
        for i in 0..3 {
            let mut session = manager.get_or_create(&format!("testlist{i}:chat")).unwrap();
            session.add_message("user", format!("Message {i}"), Map::new());
            manager.save(&session).unwrap();
        }

        let sessions = manager.list_sessions().unwrap();
        assert_eq!(sessions.len(), 3);
    }

    #[test]
    fn corrupt_json_on_load_is_treated_as_fresh() {
        let (dir, manager) = manager();
        let path = dir.path().join("sessions").join("telegram_chat1.json");
        std::fs::write(&path, "not json").unwrap();

        let session = manager.get_or_create("telegram:chat1").unwrap();
        assert_eq!(session.messages.len(), 0);
    }

    #[test]
    fn save_rejects_sanitisation_collision() {
        let (_dir, manager) = manager();
        let a = Session::new("telegram:chat:1");
        manager.save(&a).unwrap();

        let b = Session::new("telegram_chat_1");
        let result = manager.save(&b);
        assert!(matches!(result, Err(SessionError::KeyCollision { .. })));
    }
}
