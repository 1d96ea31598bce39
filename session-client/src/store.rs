use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::models::StoredSession;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Durable home of the session. Pure storage: no validation, no network.
///
/// Only the gateway (on refresh) and the session context (on login, logout and
/// teardown) write to it.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<StoredSession>;

    fn set(&self, session: StoredSession);

    fn clear(&self);

    /// Overwrite the session only if one is still stored; check and write are
    /// one step so a concurrent logout is never undone.
    fn replace_if_present(&self, session: StoredSession) -> bool;

    /// Clear and hand back whatever was stored.
    fn take(&self) -> Option<StoredSession> {
        let session = self.get();
        self.clear();
        session
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<StoredSession> {
        self.session.lock().clone()
    }

    fn set(&self, session: StoredSession) {
        *self.session.lock() = Some(session);
    }

    fn clear(&self) {
        *self.session.lock() = None;
    }

    fn replace_if_present(&self, session: StoredSession) -> bool {
        let mut stored = self.session.lock();
        if stored.is_none() {
            return false;
        }
        *stored = Some(session);
        true
    }

    fn take(&self) -> Option<StoredSession> {
        self.session.lock().take()
    }
}

/// JSON file store that survives restarts.
///
/// I/O failures are logged and read back as "no session"; a corrupt file is
/// never surfaced as a half-valid session.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Option<StoredSession> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        serde_json::from_str(&json)
            .map_err(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring invalid session file");
            })
            .ok()
    }

    fn write(&self, session: &StoredSession) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove session file")
            }
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<StoredSession> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn set(&self, session: StoredSession) {
        let _guard = self.lock.lock();
        if let Err(e) = self.write(&session) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write session file");
        }
    }

    fn clear(&self) {
        let _guard = self.lock.lock();
        self.remove();
    }

    fn replace_if_present(&self, session: StoredSession) -> bool {
        let _guard = self.lock.lock();
        if self.read().is_none() {
            return false;
        }
        if let Err(e) = self.write(&session) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write session file");
        }
        true
    }

    fn take(&self) -> Option<StoredSession> {
        let _guard = self.lock.lock();
        let session = self.read();
        self.remove();
        session
    }
}
