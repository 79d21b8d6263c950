use std::time::Duration;

use crate::content::model::AudioLocator;
use crate::foundation::error::{ReelError, ReelResult};

/// Loads narration bytes from any [`AudioLocator`].
pub struct AudioFetcher {
    /// Builder failures are kept so HTTP fetches can report them.
    client: Result<reqwest::blocking::Client, String>,
}

impl Default for AudioFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioFetcher {
    /// Default timeout for remote narration downloads.
    pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a fetcher with an HTTP client.
    pub fn new() -> Self {
        Self::with_timeout(Self::HTTP_TIMEOUT)
    }

    /// Create a fetcher whose HTTP requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| e.to_string());
        Self { client }
    }

    /// Read the bytes behind `locator`.
    ///
    /// Missing files, unreachable hosts, non-2xx responses and empty bodies are all
    /// [`ReelError::Fetch`].
    #[tracing::instrument(skip_all, fields(locator = %locator.describe()))]
    pub fn fetch(&self, locator: &AudioLocator) -> ReelResult<Vec<u8>> {
        let bytes = match locator {
            AudioLocator::File(path) => std::fs::read(path).map_err(|e| {
                ReelError::fetch(format!("failed to read '{}': {e}", path.display()))
            })?,
            AudioLocator::DataUrl { bytes, .. } => bytes.clone(),
            AudioLocator::Http(url) => self.get(url)?,
        };
        if bytes.is_empty() {
            return Err(ReelError::fetch(format!(
                "'{}' is empty",
                locator.describe()
            )));
        }
        tracing::debug!(bytes = bytes.len(), "narration fetched");
        Ok(bytes)
    }

    fn get(&self, url: &str) -> ReelResult<Vec<u8>> {
        let client = self.client.as_ref().map_err(|e| {
            ReelError::fetch(format!("GET {url} failed: HTTP client unavailable: {e}"))
        })?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| ReelError::fetch(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReelError::fetch(format!(
                "GET {url} returned HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| ReelError::fetch(format!("GET {url} body read failed: {e}")))?;
        Ok(body.to_vec())
    }
}

/// Extension or media-type hint for the decoder, derived from the locator.
pub fn decode_hint(locator: &AudioLocator) -> Option<String> {
    match locator {
        AudioLocator::File(path) => path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase()),
        AudioLocator::DataUrl { mime, .. } => extension_for_mime(mime).map(str::to_string),
        AudioLocator::Http(url) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            let name = path.rsplit('/').next().unwrap_or(path);
            name.rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        }
    }
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime.trim().to_ascii_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/ogg" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/mp4" | "audio/aac" | "audio/x-m4a" => Some("m4a"),
        "audio/webm" => Some("webm"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/fetch.rs"]
mod tests;
