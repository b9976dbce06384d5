use thiserror::Error;

/// Top-level error type for the `devconfig-api` crate.
///
/// Covers every failure mode of the two HTTP surfaces: the control-point
/// gateway and the configuration store. `devconfig-core` maps these into
/// domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Token missing or rejected by the server.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    // ── Gateway ─────────────────────────────────────────────────────
    /// The gateway answered but the control point itself is not connected.
    #[error("Control point {address} is disconnected")]
    Disconnected { address: String },

    // ── HTTP status ─────────────────────────────────────────────────
    /// Resource does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-success status, with the server's message if present.
    #[error("Server error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the failure means the remote end could not be
    /// reached at all (as opposed to answering with an error).
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Disconnected { .. } => true,
            Self::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}
