//! Error types for analysis runs.
//!
//! Every failure of a run resolves to one user-visible message; see
//! [`AnalysisError::user_message`]. Nothing here is meant to propagate as a
//! panic into the UI layer.

use thiserror::Error;

/// Failures surfaced by the analysis orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnalysisError {
    // =========================================================================
    // BEFORE DISPATCH
    // =========================================================================
    /// The selection or settings cannot be analyzed.
    #[error("{message}")]
    Validation {
        /// User-facing explanation.
        message: String,
    },

    /// Pending edits could not be flushed to the data store.
    #[error("Failed to save pending changes: {message}")]
    SaveFailed {
        /// Error reported by the data source.
        message: String,
    },

    /// A run is already collecting responses.
    #[error("An analysis is already running")]
    AlreadyRunning,

    // =========================================================================
    // DURING COLLECTION
    // =========================================================================
    /// The worker reported a failure for one unit of work.
    #[error("Calculation failed for {unit}: {message}")]
    UnitFailed {
        /// Variable name or pair label.
        unit: String,
        /// Error text from the worker.
        message: String,
    },

    /// The worker channel itself failed.
    #[error("A critical worker error occurred: {message}")]
    Critical {
        /// Transport or spawn failure detail.
        message: String,
    },

    /// No response arrived before the configured deadline.
    #[error("Analysis timed out after {seconds} seconds")]
    Timeout {
        /// Configured timeout.
        seconds: u64,
    },

    // =========================================================================
    // AFTER COLLECTION
    // =========================================================================
    /// Writing log, analytic or statistic records failed.
    #[error("Error saving results")]
    Persistence {
        /// Underlying store error, logged but not shown.
        message: String,
    },
}

impl AnalysisError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::Critical {
            message: message.into(),
        }
    }

    /// Text for the modal's error slot.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the user can fix the problem and run again without restarting
    /// anything.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::SaveFailed { .. } | Self::AlreadyRunning
        )
    }
}

/// Failures of a compute channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelError {
    /// The worker could not be started.
    #[error("failed to start worker: {message}")]
    Spawn { message: String },

    /// A request could not be delivered.
    #[error("failed to send request to worker: {message}")]
    Send { message: String },

    /// The channel was already terminated.
    #[error("worker channel is closed")]
    Closed,
}

/// Failures of the external data or result store.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// The store refused the operation.
    #[error("{message}")]
    Rejected { message: String },

    /// Record payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
