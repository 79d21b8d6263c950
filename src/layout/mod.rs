//! Text wrapping and frame geometry. Pure functions over a [`wrap::TextMeasure`].

pub(crate) mod frame;
pub(crate) mod wrap;
