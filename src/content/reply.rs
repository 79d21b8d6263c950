use crate::content::model::{AudioLocator, Difficulty, PresentationContent};
use crate::foundation::error::{ReelError, ReelResult};

/// Title used when the summarization reply carries no JSON.
pub const FALLBACK_TITLE: &str = "Document Summary";

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReply {
    title: String,
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default = "general")]
    difficulty: Difficulty,
}

fn general() -> Difficulty {
    Difficulty::General
}

/// Return the JSON text carried by an AI reply.
///
/// The whole reply wins when it parses as JSON. Otherwise the first fenced block (```json or
/// a bare ```) that parses is returned.
pub fn extract_json_block(reply: &str) -> ReelResult<&str> {
    let trimmed = reply.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed);
    }

    let mut rest = reply;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let info = after[..body_start].trim();
        let body = &after[body_start..];
        let Some(close) = body.find("```") else {
            break;
        };
        let candidate = body[..close].trim();
        if (info.is_empty() || info.eq_ignore_ascii_case("json"))
            && serde_json::from_str::<serde_json::Value>(candidate).is_ok()
        {
            return Ok(candidate);
        }
        rest = &body[close + 3..];
    }

    Err(ReelError::upstream("reply contains no JSON object"))
}

impl PresentationContent {
    /// Build content from a summarization reply, pairing it with the narration clip.
    ///
    /// Replies without extractable JSON become a "Document Summary" whose summary is the raw
    /// reply text. JSON that does not match the summary shape is an error.
    #[tracing::instrument(skip(reply, audio), fields(reply_len = reply.len()))]
    pub fn from_reply(reply: &str, audio: AudioLocator) -> ReelResult<Self> {
        let parsed = match extract_json_block(reply) {
            Ok(json) => serde_json::from_str::<SummaryReply>(json)
                .map_err(|e| ReelError::upstream(format!("summary JSON has wrong shape: {e}")))?,
            Err(ReelError::UpstreamParse(reason)) => {
                tracing::warn!(%reason, "summary reply was not JSON, using it as plain narration");
                SummaryReply {
                    title: FALLBACK_TITLE.to_string(),
                    summary: reply.trim().to_string(),
                    key_points: Vec::new(),
                    difficulty: Difficulty::General,
                }
            }
            Err(e) => return Err(e),
        };

        let content = Self {
            title: parsed.title,
            summary: parsed.summary,
            key_points: parsed.key_points,
            difficulty: parsed.difficulty,
            audio,
        };
        content.validate()?;
        Ok(content)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/reply.rs"]
mod tests;
