//! Server configuration from environment variables

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4201;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// Optional JSON question bank replacing the built-in set
    pub question_bank_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load config from QUIZ_PORT and QUESTION_BANK_PATH
    pub fn from_env() -> Self {
        let port = std::env::var("QUIZ_PORT")
            .ok()
            .and_then(|s| match s.trim().parse::<u16>() {
                Ok(p) => Some(p),
                Err(_) => {
                    tracing::warn!("Invalid QUIZ_PORT '{}', using default {}", s, DEFAULT_PORT);
                    None
                }
            })
            .unwrap_or(DEFAULT_PORT);

        let question_bank_path = std::env::var("QUESTION_BANK_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            port,
            question_bank_path,
        }
    }
}
