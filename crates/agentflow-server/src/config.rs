// ABOUTME: Configuration loading and validation for the agentflow server.
// ABOUTME: Reads AGENTFLOW_* environment variables and falls back to local-only defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use agentflow_store::DEFAULT_STORAGE_KEY;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AGENTFLOW_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("AGENTFLOW_STORAGE_KEY must not be empty")]
    EmptyStorageKey,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AgentflowConfig {
    pub home: PathBuf,
    pub bind: SocketAddr,
    pub storage_key: String,
}

impl AgentflowConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - AGENTFLOW_HOME: data directory (default: ~/.agentflow)
    /// - AGENTFLOW_BIND: socket address to bind (default: 127.0.0.1:7332)
    /// - AGENTFLOW_STORAGE_KEY: key the flow document is stored under (default: reactFlowState)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("AGENTFLOW_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".agentflow")
            });

        let bind_str =
            std::env::var("AGENTFLOW_BIND").unwrap_or_else(|_| "127.0.0.1:7332".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let storage_key = match std::env::var("AGENTFLOW_STORAGE_KEY") {
            Ok(key) if key.trim().is_empty() => return Err(ConfigError::EmptyStorageKey),
            Ok(key) => key,
            Err(_) => DEFAULT_STORAGE_KEY.to_string(),
        };

        Ok(Self {
            home,
            bind,
            storage_key,
        })
    }
}
