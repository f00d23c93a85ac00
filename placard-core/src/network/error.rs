// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Error Types

use thiserror::Error;

/// Errors that can occur while executing a transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The target URL does not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network or body read failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Server answered with a non-2xx status.
    #[error("HTTP error: {0}")]
    Status(u16),

    /// Execution was cancelled before it completed.
    #[error("Transport cancelled")]
    Cancelled,

    /// The transport was already executed.
    #[error("Transport already started")]
    AlreadyStarted,

    /// No async runtime was available to spawn the worker.
    #[error("No async runtime: {0}")]
    NoRuntime(String),

    /// The worker ended without reporting a result.
    #[error("Transport worker lost: {0}")]
    WorkerLost(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::Status(404).to_string(), "HTTP error: 404");
        assert!(TransportError::Io("reset".into())
            .to_string()
            .contains("reset"));
    }
}
