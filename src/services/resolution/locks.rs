use crate::types::GuildId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Per-guild download flags. At most one download/convert operation may
/// run per guild; a second request must skip download strategies rather
/// than queue behind the first.
#[derive(Clone)]
pub(crate) struct DownloadLocks {
    inner: Arc<Mutex<HashSet<GuildId>>>,
}

impl DownloadLocks {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns a guard when the guild has no download in flight. The
    /// guard releases the flag on drop, so every exit path (success,
    /// validation failure, error, timeout) clears it.
    pub(crate) fn try_acquire(&self, guild_id: &GuildId) -> Option<DownloadLockGuard> {
        let mut held = self.inner.lock().expect("Download lock set poisoned");

        if !held.insert(guild_id.clone()) {
            return None;
        }

        debug!(%guild_id, "Acquired guild download lock");

        Some(DownloadLockGuard {
            guild_id: guild_id.clone(),
            inner: Arc::clone(&self.inner),
        })
    }

    pub(crate) fn is_held(&self, guild_id: &GuildId) -> bool {
        self.inner
            .lock()
            .expect("Download lock set poisoned")
            .contains(guild_id)
    }
}

pub(crate) struct DownloadLockGuard {
    guild_id: GuildId,
    inner: Arc<Mutex<HashSet<GuildId>>>,
}

impl Drop for DownloadLockGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.inner.lock() {
            held.remove(&self.guild_id);
            debug!(guild_id = %self.guild_id, "Released guild download lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DownloadLocks;
    use crate::types::GuildId;

    #[test]
    fn second_acquire_fails_while_guard_is_alive() {
        let locks = DownloadLocks::new();
        let guild_id = GuildId(1);

        let guard = locks.try_acquire(&guild_id);
        assert!(guard.is_some());
        assert!(locks.try_acquire(&guild_id).is_none());
        assert!(locks.is_held(&guild_id));
    }

    #[test]
    fn dropping_the_guard_releases_the_lock() {
        let locks = DownloadLocks::new();
        let guild_id = GuildId(1);

        drop(locks.try_acquire(&guild_id));

        assert!(!locks.is_held(&guild_id));
        assert!(locks.try_acquire(&guild_id).is_some());
    }

    #[test]
    fn locks_are_scoped_per_guild() {
        let locks = DownloadLocks::new();

        let _guard = locks.try_acquire(&GuildId(1)).expect("first guild");
        assert!(locks.try_acquire(&GuildId(2)).is_some());
    }
}
