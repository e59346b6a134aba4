//! Shared relay handle passed to every connection handler.

use std::sync::Arc;

use crate::{Connection, ConnectionLifecycle, Dispatcher, EchoPolicy, SessionRegistry};

/// Registry plus dispatcher, shared by every connection of one relay.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct Relay {
    registry: Arc<SessionRegistry>,
    dispatcher: Dispatcher,
}

impl Relay {
    /// Create a relay with an empty registry.
    #[must_use]
    pub fn new(echo: EchoPolicy) -> Self {
        Self::with_registry(Arc::new(SessionRegistry::new()), echo)
    }

    /// Create a relay around an existing registry.
    #[must_use]
    pub fn with_registry(registry: Arc<SessionRegistry>, echo: EchoPolicy) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&registry), echo);
        Self {
            registry,
            dispatcher,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Accept a connection routed with `session_token`.
    #[must_use]
    pub fn accept(&self, session_token: &str, connection: Arc<dyn Connection>) -> ConnectionLifecycle {
        ConnectionLifecycle::accept(self.clone(), session_token, connection)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(EchoPolicy::default())
    }
}
