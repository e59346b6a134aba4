//! Core of the session-scoped packet relay.
//!
//! This crate provides the fundamental building blocks:
//! - `RawEvent` / `NormalizedRecord` - Inbound packet attributes and their fixed-shape form
//! - `normalize` - Total mapping between the two
//! - `SessionRegistry` - Concurrent session id -> connection set mapping
//! - `ConnectionLifecycle` - Per-connection accept/frame/close state machine
//! - `Dispatcher` - Best-effort fan-out of normalized records

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod normalize;
pub mod registry;
pub mod relay;

pub use connection::{ChannelConnection, Connection, ConnectionId, Frame, SessionId};
pub use dispatch::{DeliveryReport, Dispatcher, EchoPolicy};
pub use error::{RelayError, SendError};
pub use event::{Field, NormalizedRecord, RawEvent};
pub use lifecycle::{ConnectionLifecycle, Phase};
pub use normalize::{FIELD_TABLE, PLACEHOLDER, normalize};
pub use registry::SessionRegistry;
pub use relay::Relay;
