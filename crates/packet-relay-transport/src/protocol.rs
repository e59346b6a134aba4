//! Wire types for the HTTP surface.
//!
//! WebSocket frames carry `RawEvent` JSON inbound and `NormalizedRecord`
//! JSON outbound; both live in `packet-relay-core`.

use serde::{Deserialize, Serialize};

/// Body of a session registration request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub uuid: Option<String>,
}

/// Successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    /// Where consumers of this session should connect.
    pub url: String,
}

/// Error body returned with client errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Diagnostics for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub active: bool,
    pub connections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_tolerates_missing_uuid() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.uuid.is_none());

        let req: RegisterRequest = serde_json::from_str(r#"{"uuid": "843cf35d"}"#).unwrap();
        assert_eq!(req.uuid.as_deref(), Some("843cf35d"));
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "UUID is required".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"UUID is required"}"#);
    }
}
