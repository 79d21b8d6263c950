//! CPU rasterization of presentation frames.

pub(crate) mod frame;
pub(crate) mod text;
