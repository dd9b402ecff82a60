/// Result alias that carries the custom [`FxError`] type.
pub type Result<T> = std::result::Result<T, FxError>;

/// Common error type for the core crate.
///
/// The animation loops themselves never fail; only the edges that touch
/// configuration, persisted preferences and RSVP payloads produce errors.
#[derive(Debug, thiserror::Error)]
pub enum FxError {
    /// Free-form message surfaced to the command line.
    #[error("{0}")]
    Message(String),
    /// A caller supplied a value the operation cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A palette entry or color string that is not `#RRGGBB`.
    #[error("invalid color `{0}`, expected #RRGGBB")]
    InvalidColor(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialisation failures.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl FxError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for FxError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for FxError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
