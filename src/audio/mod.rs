//! Narration loading: locator fetch and PCM decode.

pub(crate) mod decode;
pub(crate) mod fetch;
