//! Transport state for narration playback.

pub(crate) mod controller;
