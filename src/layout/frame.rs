use crate::content::model::PresentationContent;
use crate::foundation::core::{Canvas, Rect, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::wrap::{TextMeasure, wrap_words};

/// Visual parameters for the presentation frame.
///
/// Defaults reproduce the viewer card: a blue-to-violet gradient, a pill badge, a bold centered
/// title and a translucent summary panel.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameStyle {
    /// Output frame size.
    pub canvas: Canvas,
    /// Gradient color at the top edge.
    pub gradient_top: Rgba8,
    /// Gradient color at the bottom edge.
    pub gradient_bottom: Rgba8,
    /// Badge label and title color.
    pub text_color: Rgba8,
    /// Summary text color.
    pub summary_color: Rgba8,
    /// Badge fill.
    pub badge_fill: Rgba8,
    /// Summary panel fill.
    pub panel_fill: Rgba8,
    /// Horizontal safe margin on both sides.
    pub margin_x: f32,
    /// Space above the badge.
    pub margin_top: f32,
    /// Space kept free below the summary panel.
    pub margin_bottom: f32,
    /// Vertical gap between badge, title and panel.
    pub gap: f32,
    /// Badge label size.
    pub badge_size_px: f32,
    /// Badge horizontal padding.
    pub badge_pad_x: f32,
    /// Badge vertical padding.
    pub badge_pad_y: f32,
    /// Title size.
    pub title_size_px: f32,
    /// Smallest title size tried before clipping.
    pub title_min_size_px: f32,
    /// Step used when shrinking the title.
    pub title_size_step_px: f32,
    /// Title line height as a multiple of its size.
    pub title_line_height: f32,
    /// Preferred summary size.
    pub summary_size_px: f32,
    /// Smallest summary size tried before clipping.
    pub summary_min_size_px: f32,
    /// Step used when shrinking the summary.
    pub summary_size_step_px: f32,
    /// Summary line height as a multiple of its size.
    pub summary_line_height: f32,
    /// Maximum width of the summary text column.
    pub summary_max_width: f32,
    /// Inner padding of the summary panel.
    pub panel_padding: f32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            canvas: Canvas::FULL_HD,
            gradient_top: Rgba8::new(37, 99, 235, 255),
            gradient_bottom: Rgba8::new(124, 58, 237, 255),
            text_color: Rgba8::WHITE,
            summary_color: Rgba8::WHITE.with_alpha(230),
            badge_fill: Rgba8::WHITE.with_alpha(51),
            panel_fill: Rgba8::WHITE.with_alpha(26),
            margin_x: 160.0,
            margin_top: 96.0,
            margin_bottom: 96.0,
            gap: 40.0,
            badge_size_px: 28.0,
            badge_pad_x: 24.0,
            badge_pad_y: 10.0,
            title_size_px: 72.0,
            title_min_size_px: 40.0,
            title_size_step_px: 4.0,
            title_line_height: 1.2,
            summary_size_px: 40.0,
            summary_min_size_px: 24.0,
            summary_size_step_px: 2.0,
            summary_line_height: 1.5,
            summary_max_width: 1400.0,
            panel_padding: 48.0,
        }
    }
}

impl FrameStyle {
    fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation("frame canvas must be non-empty"));
        }
        let sizes = [
            self.badge_size_px,
            self.title_size_px,
            self.title_min_size_px,
            self.title_size_step_px,
            self.summary_size_px,
            self.summary_min_size_px,
            self.summary_size_step_px,
            self.title_line_height,
            self.summary_line_height,
        ];
        if sizes.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ReelError::validation(
                "frame text sizes and line heights must be finite and > 0",
            ));
        }
        if self.title_min_size_px > self.title_size_px {
            return Err(ReelError::validation(
                "title_min_size_px must not exceed title_size_px",
            ));
        }
        if self.summary_min_size_px > self.summary_size_px {
            return Err(ReelError::validation(
                "summary_min_size_px must not exceed summary_size_px",
            ));
        }
        if self.text_width() <= 0.0 {
            return Err(ReelError::validation(
                "horizontal margins leave no room for text",
            ));
        }
        Ok(())
    }

    fn text_width(&self) -> f32 {
        self.canvas.width as f32 - 2.0 * self.margin_x
    }
}

/// One positioned line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Line box. Text is horizontally centered by construction and vertically centered by the
    /// renderer.
    pub rect: Rect,
    /// Font size.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
}

/// Fully resolved geometry of a presentation frame.
#[derive(Clone, Debug)]
pub struct FrameLayout {
    /// Frame size.
    pub canvas: Canvas,
    /// Badge pill bounds (corner radius is half the height).
    pub badge: Option<Rect>,
    /// Summary panel bounds.
    pub panel: Option<Rect>,
    /// Badge label, title lines and summary lines, top to bottom.
    pub lines: Vec<TextLine>,
    /// Size the title ended up at after shrink-to-fit.
    pub title_size_px: f32,
    /// Title lines were dropped to keep room for the summary.
    pub title_clipped: bool,
    /// Size the summary ended up at after shrink-to-fit.
    pub summary_size_px: f32,
    /// Summary lines were dropped because even the minimum size overflowed.
    pub summary_clipped: bool,
}

impl FrameLayout {
    /// Lines drawn inside the summary panel.
    pub fn summary_lines(&self) -> impl Iterator<Item = &TextLine> {
        let panel = self.panel;
        self.lines
            .iter()
            .filter(move |l| panel.is_some_and(|p| p.contains(l.rect.center())))
    }
}

/// Lay out `content` onto a frame.
///
/// Overflowing text shrinks from its preferred size toward the style's minimum. When it still does
/// not fit, trailing lines are dropped and `title_clipped` or `summary_clipped` is set. The title
/// always leaves room for at least one summary line. Nothing is ever placed outside the canvas.
#[tracing::instrument(skip_all, fields(title = %content.title))]
pub fn layout_frame(
    content: &PresentationContent,
    style: &FrameStyle,
    measure: &mut dyn TextMeasure,
) -> ReelResult<FrameLayout> {
    style.validate()?;

    let canvas_w = style.canvas.width as f32;
    let canvas_h = style.canvas.height as f32;
    let mut lines = Vec::new();
    let mut y = style.margin_top;

    let label = content.difficulty.label().trim();
    let badge = if label.is_empty() {
        None
    } else {
        let label_w = measure.measure(label, style.badge_size_px)?;
        let label_h = style.badge_size_px * 1.2;
        let w = label_w + 2.0 * style.badge_pad_x;
        let h = label_h + 2.0 * style.badge_pad_y;
        let x0 = (canvas_w - w) / 2.0;
        lines.push(TextLine {
            text: label.to_string(),
            rect: rect(
                x0 + style.badge_pad_x,
                y + style.badge_pad_y,
                label_w,
                label_h,
            ),
            size_px: style.badge_size_px,
            color: style.text_color,
        });
        let r = rect(x0, y, w, h);
        y += h + style.gap;
        Some(r)
    };

    let column_w = style
        .summary_max_width
        .min(style.text_width() - 2.0 * style.panel_padding);
    if column_w <= 0.0 {
        return Err(ReelError::validation(
            "panel padding leaves no room for summary text",
        ));
    }

    let has_summary = !content.summary.trim().is_empty();
    let bottom = canvas_h - style.margin_bottom;
    let summary_reserve = if has_summary {
        style.gap
            + 2.0 * style.panel_padding
            + style.summary_min_size_px * style.summary_line_height
    } else {
        0.0
    };
    let title_available_h = bottom - y - summary_reserve;

    let mut title_clipped = false;
    let title_fit = fit_text(
        &content.title,
        TextFit {
            size_px: style.title_size_px,
            min_size_px: style.title_min_size_px,
            step_px: style.title_size_step_px,
            line_height: style.title_line_height,
            width: style.text_width(),
            available_h: title_available_h,
        },
        measure,
    )?;
    let title_size = title_fit.size_px;
    let mut title_lines = title_fit.lines;
    let title_lh = title_size * style.title_line_height;
    let max_title_lines = max_lines(title_available_h, title_lh);
    if title_lines.len() > max_title_lines {
        tracing::warn!(
            total = title_lines.len(),
            kept = max_title_lines,
            size_px = title_size,
            "title overflows the frame at minimum size, clipping trailing lines"
        );
        title_lines.truncate(max_title_lines);
        title_clipped = true;
    }
    if !title_lines.is_empty() {
        for text in title_lines {
            let w = measure.measure(&text, title_size)?;
            lines.push(TextLine {
                text,
                rect: rect((canvas_w - w) / 2.0, y, w, title_lh),
                size_px: title_size,
                color: style.text_color,
            });
            y += title_lh;
        }
        y += style.gap;
    }

    let available_h = bottom - y - 2.0 * style.panel_padding;

    let mut summary_size = style.summary_size_px;
    let mut summary_clipped = false;
    let mut panel = None;
    if has_summary {
        let fit = fit_text(
            &content.summary,
            TextFit {
                size_px: style.summary_size_px,
                min_size_px: style.summary_min_size_px,
                step_px: style.summary_size_step_px,
                line_height: style.summary_line_height,
                width: column_w,
                available_h,
            },
            measure,
        )?;
        let size = fit.size_px;
        let mut wrapped = fit.lines;
        summary_size = size;
        let lh = size * style.summary_line_height;
        let max_summary_lines = max_lines(available_h, lh);
        if wrapped.len() > max_summary_lines {
            tracing::warn!(
                total = wrapped.len(),
                kept = max_summary_lines,
                size_px = size,
                "summary overflows the frame at minimum size, clipping trailing lines"
            );
            wrapped.truncate(max_summary_lines);
            summary_clipped = true;
        }

        if !wrapped.is_empty() {
            let panel_w = column_w + 2.0 * style.panel_padding;
            let panel_h = wrapped.len() as f32 * lh + 2.0 * style.panel_padding;
            panel = Some(rect((canvas_w - panel_w) / 2.0, y, panel_w, panel_h));
            let mut ty = y + style.panel_padding;
            for text in wrapped {
                let w = measure.measure(&text, size)?;
                lines.push(TextLine {
                    text,
                    rect: rect((canvas_w - w) / 2.0, ty, w, lh),
                    size_px: size,
                    color: style.summary_color,
                });
                ty += lh;
            }
        }
    }

    Ok(FrameLayout {
        canvas: style.canvas,
        badge,
        panel,
        lines,
        title_size_px: title_size,
        title_clipped,
        summary_size_px: summary_size,
        summary_clipped,
    })
}

struct TextFit {
    size_px: f32,
    min_size_px: f32,
    step_px: f32,
    line_height: f32,
    width: f32,
    available_h: f32,
}

struct Fitted {
    size_px: f32,
    lines: Vec<String>,
}

/// Wrap at the preferred size, stepping down until the block fits. The last step lands exactly on
/// `min_size_px`.
fn fit_text(text: &str, fit: TextFit, measure: &mut dyn TextMeasure) -> ReelResult<Fitted> {
    let mut size = fit.size_px;
    loop {
        let lines = wrap_words(text, size, fit.width, measure)?;
        let needed = lines.len() as f32 * size * fit.line_height;
        if needed <= fit.available_h || size <= fit.min_size_px {
            return Ok(Fitted {
                size_px: size,
                lines,
            });
        }
        size = (size - fit.step_px).max(fit.min_size_px);
    }
}

fn max_lines(available_h: f32, line_h: f32) -> usize {
    if available_h > 0.0 {
        ((available_h + 1e-3) / line_h).floor() as usize
    } else {
        0
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::new(
        f64::from(x),
        f64::from(y),
        f64::from(x + w),
        f64::from(y + h),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layout/frame.rs"]
mod tests;
