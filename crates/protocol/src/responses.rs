//! Response types for the request/response pattern
//!
//! Every request is answered with a correlated `ResponseResult`; validation
//! failures come back as typed error codes instead of silent no-ops.

use serde::{Deserialize, Serialize};

use tableforge_domain::{CharacterId, PlayerId};

// =============================================================================
// Response Result
// =============================================================================

/// Result of a request operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseResult {
    /// Operation succeeded
    Success {
        /// Optional data payload (varies by request type)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    /// Operation failed
    Error {
        /// Error classification code
        code: ErrorCode,
        /// Human-readable error message
        message: String,
    },
    /// Unknown response type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ResponseResult {
    /// Create a success response with data
    pub fn success<T: Serialize>(data: T) -> Self {
        ResponseResult::Success {
            data: Some(serde_json::to_value(data).unwrap_or_default()),
        }
    }

    /// Create a success response without data
    pub fn success_empty() -> Self {
        ResponseResult::Success { data: None }
    }

    /// Create an error response
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ResponseResult::Error {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseResult::Error { .. })
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Request was malformed or invalid
    BadRequest,
    /// Authentication required or failed
    Unauthorized,
    /// Requester lacks permission for this operation
    Forbidden,
    /// Requested resource not found
    NotFound,
    /// Operation conflicts with current state (occupied cell, exhausted uses)
    Conflict,
    /// Request data failed validation
    ValidationError,
    /// Internal server error
    InternalError,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Request Error (Client-Side)
// =============================================================================

/// Client-side request errors
///
/// Errors that occur before a server response exists, distinct from
/// `ResponseResult::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Request was cancelled (e.g., connection closed while pending)
    Cancelled,
    /// Request timed out waiting for response
    Timeout,
    /// Failed to send the request over the connection
    SendFailed(String),
    /// Not connected to an engine
    NotConnected,
    /// Failed to serialize the request
    SerializationError(String),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Cancelled => write!(f, "Request was cancelled"),
            RequestError::Timeout => write!(f, "Request timed out"),
            RequestError::SendFailed(msg) => write!(f, "Failed to send request: {msg}"),
            RequestError::NotConnected => write!(f, "Not connected to an engine"),
            RequestError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for RequestError {}

// =============================================================================
// Room Role
// =============================================================================

/// Role of a peer in a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomRole {
    /// The authoritative peer; sole writer of the shared snapshot
    Dm,
    /// Views the shared state and requests mutations
    Player,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl RoomRole {
    pub fn is_dm(&self) -> bool {
        matches!(self, RoomRole::Dm)
    }
}

// =============================================================================
// Connected User
// =============================================================================

/// Information about a peer connected to a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedUser {
    pub player_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: RoomRole,
    /// Selected character (for Player role)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<CharacterId>,
}

// =============================================================================
// Join Error
// =============================================================================

/// Errors that can occur when joining a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinError {
    /// Another DM is already connected to this room
    DmAlreadyConnected,
    /// Room does not exist and the joiner is not its creator
    RoomNotFound,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_round_trip() {
        let result = ResponseResult::error(ErrorCode::Conflict, "cell (3, 4) is occupied");
        let json = serde_json::to_string(&result).expect("serialize");
        let back: ResponseResult = serde_json::from_str(&json).expect("deserialize");
        assert!(back.is_error());
    }

    #[test]
    fn test_unknown_error_code_is_forward_compatible() {
        let code: ErrorCode =
            serde_json::from_str("\"rate_limit_exceeded\"").expect("deserialize");
        assert_eq!(code, ErrorCode::Unknown);
    }
}
