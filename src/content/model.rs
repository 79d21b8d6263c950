use std::{fmt, path::PathBuf};

use base64::{Engine as _, engine::general_purpose};

use crate::foundation::error::{ReelError, ReelResult};

/// Everything needed to render and narrate one study presentation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationContent {
    /// Headline drawn near the top of the frame.
    pub title: String,
    /// Narration script, drawn as the wrapped paragraph.
    pub summary: String,
    /// Key takeaways in display order.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Audience label drawn inside the badge.
    pub difficulty: Difficulty,
    /// Where the narration clip lives.
    #[serde(rename = "audioUrl")]
    pub audio: AudioLocator,
}

impl PresentationContent {
    /// Reject content that would render an empty frame.
    pub fn validate(&self) -> ReelResult<()> {
        if self.title.trim().is_empty() && self.summary.trim().is_empty() {
            return Err(ReelError::validation(
                "presentation needs a title or a summary",
            ));
        }
        Ok(())
    }
}

/// Audience level reported by the summarization service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    /// "Grade 9-10".
    Grade9To10,
    /// "Grade 11-12".
    Grade11To12,
    /// "Tertiary".
    Tertiary,
    /// "General", used when the service gave no structured answer.
    General,
    /// Any other label, kept verbatim.
    Other(String),
}

impl Difficulty {
    /// Display label as shown in the badge.
    pub fn label(&self) -> &str {
        match self {
            Self::Grade9To10 => "Grade 9-10",
            Self::Grade11To12 => "Grade 11-12",
            Self::Tertiary => "Tertiary",
            Self::General => "General",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        match s.trim() {
            "Grade 9-10" => Self::Grade9To10,
            "Grade 11-12" => Self::Grade11To12,
            "Tertiary" => Self::Tertiary,
            "General" => Self::General,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        d.label().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Location of a narration clip.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AudioLocator {
    /// Local file.
    File(PathBuf),
    /// Inline `data:` URL, already base64-decoded.
    DataUrl {
        /// Declared media type, e.g. `audio/mpeg`.
        mime: String,
        /// Raw clip bytes.
        bytes: Vec<u8>,
    },
    /// Remote `http(s)` resource.
    Http(String),
}

impl AudioLocator {
    /// Parse a locator string.
    ///
    /// `data:<mime>;base64,<payload>` becomes [`AudioLocator::DataUrl`], `http://` and `https://`
    /// become [`AudioLocator::Http`], `file://` and everything else is a file path.
    pub fn parse(s: &str) -> ReelResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ReelError::validation("audio locator must be non-empty"));
        }
        if let Some(rest) = s.strip_prefix("data:") {
            return parse_data_url(rest);
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Http(s.to_string()));
        }
        let path = s.strip_prefix("file://").unwrap_or(s);
        Ok(Self::File(PathBuf::from(path)))
    }

    /// Build a `data:` locator from base64 text, as returned by the text-to-speech service.
    pub fn from_base64(mime: impl Into<String>, b64: &str) -> ReelResult<Self> {
        let bytes = general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| ReelError::validation(format!("invalid base64 audio payload: {e}")))?;
        Ok(Self::DataUrl {
            mime: mime.into(),
            bytes,
        })
    }

    /// Short description safe for logs (no inline payloads).
    pub fn describe(&self) -> String {
        match self {
            Self::File(p) => p.display().to_string(),
            Self::DataUrl { mime, bytes } => format!("data:{mime} ({} bytes)", bytes.len()),
            Self::Http(url) => url.clone(),
        }
    }
}

fn parse_data_url(rest: &str) -> ReelResult<AudioLocator> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReelError::validation("data URL is missing its ',' separator"))?;
    let Some(mime) = meta.strip_suffix(";base64") else {
        return Err(ReelError::validation(
            "only base64 data URLs are supported for audio",
        ));
    };
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };
    AudioLocator::from_base64(mime, payload)
}

impl fmt::Debug for AudioLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl TryFrom<String> for AudioLocator {
    type Error = ReelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AudioLocator> for String {
    fn from(loc: AudioLocator) -> Self {
        match loc {
            AudioLocator::File(p) => p.display().to_string(),
            AudioLocator::DataUrl { mime, bytes } => format!(
                "data:{mime};base64,{}",
                general_purpose::STANDARD.encode(bytes)
            ),
            AudioLocator::Http(url) => url,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/model.rs"]
mod tests;
