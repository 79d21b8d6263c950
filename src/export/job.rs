use crate::foundation::error::{ReelError, ReelResult};

/// Stage of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExportStatus {
    /// Not started.
    Idle,
    /// Drawing the presentation frame.
    Rendering,
    /// Fetching and decoding narration.
    Decoding,
    /// Starting and joining the tracks.
    Capturing,
    /// Recording the combined stream.
    Recording,
    /// Artifact packaged and delivered.
    Complete,
    /// Aborted; no artifact.
    Failed,
}

impl ExportStatus {
    /// `Complete` and `Failed` never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// The single stage that may follow this one on success.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Rendering),
            Self::Rendering => Some(Self::Decoding),
            Self::Decoding => Some(Self::Capturing),
            Self::Capturing => Some(Self::Recording),
            Self::Recording => Some(Self::Complete),
            Self::Complete | Self::Failed => None,
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Rendering => "rendering",
            Self::Decoding => "decoding",
            Self::Capturing => "capturing",
            Self::Recording => "recording",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// State of one export: its stage and the fragments recorded so far.
#[derive(Debug)]
pub struct ExportJob {
    status: ExportStatus,
    recorded_chunks: Vec<Vec<u8>>,
}

impl Default for ExportJob {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportJob {
    /// A job that has not started.
    pub fn new() -> Self {
        Self {
            status: ExportStatus::Idle,
            recorded_chunks: Vec::new(),
        }
    }

    /// Current stage.
    pub fn status(&self) -> ExportStatus {
        self.status
    }

    /// Fragments recorded so far.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.recorded_chunks
    }

    /// Move to `to`, which must be the stage directly after the current one.
    pub fn advance(&mut self, to: ExportStatus) -> ReelResult<()> {
        if self.status.next() != Some(to) {
            return Err(ReelError::validation(format!(
                "export cannot move from {} to {}",
                self.status, to
            )));
        }
        tracing::debug!(from = %self.status, to = %to, "export stage");
        self.status = to;
        Ok(())
    }

    /// Store the recorder's fragments. Only valid while recording.
    pub fn store_chunks(&mut self, chunks: Vec<Vec<u8>>) -> ReelResult<()> {
        if self.status != ExportStatus::Recording {
            return Err(ReelError::validation(format!(
                "fragments can only be stored while recording (job is {})",
                self.status
            )));
        }
        self.recorded_chunks = chunks;
        Ok(())
    }

    /// Abort the job and drop any fragments. Terminal jobs are left unchanged.
    pub fn fail(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        tracing::debug!(from = %self.status, "export failed");
        self.status = ExportStatus::Failed;
        self.recorded_chunks = Vec::new();
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/job.rs"]
mod tests;
