//! Stream sinks that turn captured frames into container fragments.

pub(crate) mod ffmpeg;
pub(crate) mod sink;
