//! Host error types.

use thiserror::Error;

use dronewar_core::error::ConfigError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The game loop thread could not be started.
    #[error("Failed to spawn game loop thread: {0}")]
    Thread(#[from] std::io::Error),
}
