use thiserror::Error;

/// Unified error type for the entire portfolio-view-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Network ─────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned HTTP {status} for {endpoint}")]
    HttpStatus { status: u16, endpoint: String },

    // ── Decoding ────────────────────────────────────────────────────
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Response is missing expected field `{0}`")]
    MissingField(String),

    // ── Static assets / configuration ───────────────────────────────
    #[error("Symbol catalog error: {0}")]
    Catalog(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Coarse classification used by views when deciding how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not complete or the backend answered non-2xx.
    Network,
    /// The response body did not match the expected shape.
    Decode,
    Other,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Network(_) | CoreError::HttpStatus { .. } => ErrorKind::Network,
            CoreError::Decode(_) | CoreError::MissingField(_) => ErrorKind::Decode,
            _ => ErrorKind::Other,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors embed the full URL; drop the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_decode() {
            CoreError::Decode(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
