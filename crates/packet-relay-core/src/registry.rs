//! Session id -> connection set registry.

use std::{collections::HashMap, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{Connection, ConnectionId, SessionId};

type Members = HashMap<ConnectionId, Arc<dyn Connection>>;

/// Concurrent registry of the connections subscribed to each session.
///
/// Sessions live in a sharded map, so operations on different sessions do
/// not contend on a single lock. A session key exists only while its
/// member set is non-empty.
///
/// The registry holds shared handles; it never closes a connection.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Members>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn` to the set for `id`, creating the set if needed.
    ///
    /// Returns `false` if the connection was already registered.
    pub fn register(&self, id: &SessionId, conn: Arc<dyn Connection>) -> bool {
        self.sessions
            .entry(id.clone())
            .or_default()
            .insert(conn.id(), conn)
            .is_none()
    }

    /// Remove a connection from the set for `id`, pruning the session once
    /// its last member is gone.
    ///
    /// Returns `false` if the connection was not registered under `id`.
    pub fn deregister(&self, id: &SessionId, conn_id: &ConnectionId) -> bool {
        // The entry guard holds the shard lock across removal and pruning,
        // so a concurrent register cannot land in a set that is being dropped.
        let Entry::Occupied(mut entry) = self.sessions.entry(id.clone()) else {
            return false;
        };
        let removed = entry.get_mut().remove(conn_id).is_some();
        if entry.get().is_empty() {
            entry.remove();
        }
        removed
    }

    /// Point-in-time copy of the members of `id`.
    #[must_use]
    pub fn snapshot(&self, id: &SessionId) -> Vec<Arc<dyn Connection>> {
        self.sessions
            .get(id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether any connection is registered under `id`.
    #[must_use]
    pub fn has(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of connections registered under `id`.
    #[must_use]
    pub fn connection_count(&self, id: &SessionId) -> usize {
        self.sessions.get(id).map_or(0, |members| members.len())
    }

    /// Number of sessions with at least one connection.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelConnection;

    fn session(id: &str) -> SessionId {
        SessionId::parse(id).unwrap()
    }

    fn connection() -> Arc<dyn Connection> {
        let (conn, _rx) = ChannelConnection::new();
        Arc::new(conn)
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = SessionRegistry::new();
        let s = session("abc");
        let c = connection();

        assert!(registry.register(&s, Arc::clone(&c)));
        assert!(!registry.register(&s, Arc::clone(&c)));
        assert_eq!(registry.connection_count(&s), 1);
        assert_eq!(registry.snapshot(&s).len(), 1);
    }

    #[test]
    fn test_last_deregister_prunes_session() {
        let registry = SessionRegistry::new();
        let s = session("abc");
        let c1 = connection();
        let c2 = connection();

        registry.register(&s, Arc::clone(&c1));
        registry.register(&s, Arc::clone(&c2));

        assert!(registry.deregister(&s, &c1.id()));
        assert!(registry.has(&s));

        assert!(registry.deregister(&s, &c2.id()));
        assert!(!registry.has(&s));
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn test_deregister_unknown_is_noop() {
        let registry = SessionRegistry::new();
        let s = session("abc");
        let c1 = connection();
        let stranger = connection();

        assert!(!registry.deregister(&s, &c1.id()));

        registry.register(&s, Arc::clone(&c1));
        assert!(!registry.deregister(&s, &stranger.id()));
        assert!(!registry.deregister(&session("other"), &c1.id()));
        assert_eq!(registry.connection_count(&s), 1);

        registry.deregister(&s, &c1.id());
        assert!(!registry.deregister(&s, &c1.id()));
        assert!(!registry.has(&s));
    }

    #[test]
    fn test_snapshot_of_unknown_session_is_empty() {
        let registry = SessionRegistry::new();
        assert!(registry.snapshot(&session("missing")).is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let a = session("a");
        let b = session("b");
        let c1 = connection();
        let c2 = connection();

        registry.register(&a, Arc::clone(&c1));
        registry.register(&b, Arc::clone(&c2));

        let members: Vec<ConnectionId> = registry.snapshot(&a).iter().map(|c| c.id()).collect();
        assert_eq!(members, vec![c1.id()]);
        assert_eq!(registry.session_count(), 2);
    }

    #[test]
    fn test_key_present_iff_members_under_interleaving() {
        let registry = SessionRegistry::new();
        let s = session("abc");
        let conns: Vec<_> = (0..4).map(|_| connection()).collect();

        for (step, conn) in conns.iter().enumerate() {
            registry.register(&s, Arc::clone(conn));
            if step % 2 == 1 {
                registry.deregister(&s, &conns[step - 1].id());
            }
            assert_eq!(registry.has(&s), registry.connection_count(&s) > 0);
        }
        for conn in &conns {
            registry.deregister(&s, &conn.id());
            assert_eq!(registry.has(&s), registry.connection_count(&s) > 0);
        }
        assert!(!registry.has(&s));
    }

    #[test]
    fn test_concurrent_register_deregister() {
        let registry = Arc::new(SessionRegistry::new());
        let s = session("shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let s = s.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let conn = connection();
                        registry.register(&s, Arc::clone(&conn));
                        let _ = registry.snapshot(&s);
                        registry.deregister(&s, &conn.id());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!registry.has(&s));
        assert_eq!(registry.session_count(), 0);
    }
}
