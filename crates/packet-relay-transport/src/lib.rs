//! Transport layer for the packet relay.
//!
//! Provides:
//! - Wire types for the HTTP surface
//! - Session registration and diagnostics routes (feature: websocket)
//! - WebSocket consumer endpoint (feature: websocket)

pub mod protocol;

#[cfg(feature = "websocket")]
pub mod api;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use protocol::{ErrorResponse, HealthResponse, RegisterRequest, RegisterResponse, SessionStatus};

#[cfg(feature = "websocket")]
pub use api::{ApiError, ApiState, create_api_router};

#[cfg(feature = "websocket")]
pub use websocket::create_ws_router;
