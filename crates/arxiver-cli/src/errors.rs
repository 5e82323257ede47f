//! Error types for the arxiver command line application.
//!
//! Library failures, terminal IO and JSON encoding are wrapped transparently so the original
//! message is what the user sees.

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CliError {
  /// Errors from the underlying arxiver library
  #[error(transparent)]
  Arxiver(#[from] arxiver::ArxiverError),

  /// Terminal and file IO errors
  #[error(transparent)]
  IO(#[from] std::io::Error),

  /// Errors encoding metadata as JSON
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}
