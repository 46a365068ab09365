//! Error taxonomy for rejected intents.
//!
//! Every variant is recoverable at the call site: the server never terminates
//! on a rejected intent, it reports the rejection back to the caller.

use crate::protocol::ServerMessage;

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("room is full: {0}")]
    Capacity(String),

    #[error("not permitted: {0}")]
    Permission(String),
}

impl GameError {
    /// Stable wire code carried in `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION",
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::Conflict(_) => "CONFLICT",
            GameError::Capacity(_) => "ROOM_FULL",
            GameError::Permission(_) => "NOT_HOST",
        }
    }

    pub fn into_message(self) -> ServerMessage {
        let code = self.code().to_string();
        let msg = match self {
            GameError::Validation(m)
            | GameError::NotFound(m)
            | GameError::Conflict(m)
            | GameError::Capacity(m)
            | GameError::Permission(m) => m,
        };
        ServerMessage::Error { code, msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(GameError::Validation("x".into()).code(), "VALIDATION");
        assert_eq!(GameError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(GameError::Conflict("x".into()).code(), "CONFLICT");
        assert_eq!(GameError::Capacity("x".into()).code(), "ROOM_FULL");
        assert_eq!(GameError::Permission("x".into()).code(), "NOT_HOST");
    }

    #[test]
    fn test_into_message_keeps_reason() {
        let msg = GameError::Capacity("Room is full".into()).into_message();
        match msg {
            ServerMessage::Error { code, msg } => {
                assert_eq!(code, "ROOM_FULL");
                assert_eq!(msg, "Room is full");
            }
            _ => panic!("Expected Error message"),
        }
    }
}
