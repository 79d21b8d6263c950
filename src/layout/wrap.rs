use crate::foundation::error::{ReelError, ReelResult};

/// Measures the advance width of a single line of text.
///
/// The parley-backed [`crate::TextLayoutEngine`] is the production implementation; layout code
/// only depends on this trait so it can be exercised without font files.
pub trait TextMeasure {
    /// Width in pixels of `text` set on one line at `size_px`.
    fn measure(&mut self, text: &str, size_px: f32) -> ReelResult<f32>;
}

/// Greedily wrap `text` into lines no wider than `max_width` pixels.
///
/// Words are split on whitespace and packed onto the current line until the next word would
/// overflow, then a new line starts. A word that is wider than `max_width` on its own is broken
/// at character boundaries. Concatenating the output (joined with single spaces, with broken
/// words rejoined) reproduces the input words in order.
///
/// A single character wider than `max_width` is still emitted on its own line.
pub fn wrap_words(
    text: &str,
    size_px: f32,
    max_width: f32,
    measure: &mut dyn TextMeasure,
) -> ReelResult<Vec<String>> {
    if !max_width.is_finite() || max_width <= 0.0 {
        return Err(ReelError::validation(
            "wrap max_width must be finite and > 0",
        ));
    }
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(ReelError::validation(
            "text size_px must be finite and > 0",
        ));
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if measure.measure(&candidate, size_px)? <= max_width {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if measure.measure(word, size_px)? <= max_width {
            line = word.to_string();
            continue;
        }

        let mut pieces = break_word(word, size_px, max_width, measure)?;
        line = pieces.pop().unwrap_or_default();
        lines.extend(pieces);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

fn break_word(
    word: &str,
    size_px: f32,
    max_width: f32,
    measure: &mut dyn TextMeasure,
) -> ReelResult<Vec<String>> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && measure.measure(&piece, size_px)? > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    Ok(pieces)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
