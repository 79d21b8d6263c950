//! The export job: recording, packaging, admission control and notices.

pub(crate) mod job;
pub(crate) mod notify;
pub(crate) mod package;
pub(crate) mod pipeline;
pub(crate) mod recorder;
pub(crate) mod slot;
