//! Turning a rendered frame and decoded PCM into one recordable stream.

pub(crate) mod graph;
pub(crate) mod stream;
pub(crate) mod track;
