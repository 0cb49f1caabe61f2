/// Result alias that carries the custom [`SiteError`] type.
pub type Result<T> = std::result::Result<T, SiteError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Invalid user input, such as a malformed command-line value.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The rendering surface rejected a frame.
    #[error("render failed: {0}")]
    Render(String),
}

impl SiteError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

/// Failure reported by a [`crate::assets::ModelSource`].
///
/// Load errors never escape the scene controller: the affected container
/// simply stays empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("model `{0}` not found")]
    NotFound(String),
    #[error("failed to read model `{path}`: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to parse model `{path}`: {reason}")]
    Parse { path: String, reason: String },
    #[error("model `{0}` contains no geometry")]
    Empty(String),
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(path) | Self::Empty(path) => path,
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}
