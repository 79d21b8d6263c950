//! Presentation content and intake of summarization replies.

pub(crate) mod model;
pub(crate) mod reply;
