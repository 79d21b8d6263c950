/// Convenience result type used across lesson-reel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy for the export pipeline and its inputs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided content or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// The narration resource could not be read or downloaded.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The narration bytes are not a supported or intact audio encoding.
    #[error("decode error: {0}")]
    Decode(String),

    /// A video or audio track could not be produced or joined.
    #[error("stream composition error: {0}")]
    StreamComposition(String),

    /// The container encoder is unavailable or failed while writing.
    #[error("recording error: {0}")]
    Recording(String),

    /// An upstream AI reply did not contain extractable JSON.
    #[error("upstream parse error: {0}")]
    UpstreamParse(String),

    /// Another export already owns this presentation's frame and audio graph.
    #[error("export already in progress")]
    Busy,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`ReelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ReelError::StreamComposition`] value.
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::StreamComposition(msg.into())
    }

    /// Build a [`ReelError::Recording`] value.
    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }

    /// Build a [`ReelError::UpstreamParse`] value.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamParse(msg.into())
    }

    /// One-line description suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("The presentation is incomplete: {msg}"),
            Self::Fetch(_) => "The narration audio could not be loaded.".to_string(),
            Self::Decode(_) => "The narration audio is in an unsupported format.".to_string(),
            Self::StreamComposition(_) | Self::Recording(_) => {
                "Video recording is not available right now.".to_string()
            }
            Self::UpstreamParse(_) => "The summary could not be read.".to_string(),
            Self::Busy => "A video is already being generated.".to_string(),
            Self::Other(_) => "Failed to generate video. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
