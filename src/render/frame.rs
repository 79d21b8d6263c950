use std::sync::Arc;

use kurbo::Shape as _;

use crate::content::model::PresentationContent;
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::lerp_u8;
use crate::layout::frame::{FrameLayout, FrameStyle, TextLine, layout_frame};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};

const PANEL_RADIUS: f64 = 24.0;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Channels of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Anything that can produce the still frame of a presentation.
pub trait FrameSource {
    /// Produce the fully drawn frame for `content`.
    fn render_frame(&mut self, content: &PresentationContent) -> ReelResult<FrameRGBA>;
}

/// Draws presentation frames with `vello_cpu`.
///
/// The returned frame is fully rasterized; nothing is drawn lazily after `render` returns.
pub struct FrameRenderer {
    engine: TextLayoutEngine,
    style: FrameStyle,
}

impl FrameRenderer {
    /// Create a renderer drawing with `engine`'s font.
    pub fn new(engine: TextLayoutEngine, style: FrameStyle) -> Self {
        Self { engine, style }
    }

    /// Frame style in use.
    pub fn style(&self) -> &FrameStyle {
        &self.style
    }

    /// Text engine in use.
    pub fn engine(&self) -> &TextLayoutEngine {
        &self.engine
    }

    /// Resolve frame geometry without rasterizing.
    pub fn layout(&mut self, content: &PresentationContent) -> ReelResult<FrameLayout> {
        layout_frame(content, &self.style, &mut self.engine)
    }

    /// Lay out and rasterize `content`.
    #[tracing::instrument(skip_all, fields(title = %content.title))]
    pub fn render(&mut self, content: &PresentationContent) -> ReelResult<FrameRGBA> {
        let layout = self.layout(content)?;
        self.render_layout(&layout)
    }

    /// Rasterize a resolved layout.
    pub fn render_layout(&mut self, layout: &FrameLayout) -> ReelResult<FrameRGBA> {
        let width = layout.canvas.width;
        let height = layout.canvas.height;
        let w: u16 = width
            .try_into()
            .map_err(|_| ReelError::validation("frame width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ReelError::validation("frame height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let background = gradient_paint(
            self.style.gradient_top,
            self.style.gradient_bottom,
            width,
            height,
        )?;
        ctx.set_paint(background);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        if let Some(badge) = layout.badge {
            fill_rounded(&mut ctx, badge, badge.height() / 2.0, self.style.badge_fill);
        }
        if let Some(panel) = layout.panel {
            fill_rounded(&mut ctx, panel, PANEL_RADIUS, self.style.panel_fill);
        }

        for line in &layout.lines {
            self.draw_line(&mut ctx, line)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        line: &TextLine,
    ) -> ReelResult<()> {
        let layout = self
            .engine
            .layout_line(&line.text, line.size_px, TextBrushRgba8::from(line.color))?;
        let x = line.rect.x0;
        let y = line.rect.y0 + (line.rect.height() - f64::from(layout.height())) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));

        let font = self.engine.font().clone();
        for parley_line in layout.lines() {
            for item in parley_line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

impl FrameSource for FrameRenderer {
    fn render_frame(&mut self, content: &PresentationContent) -> ReelResult<FrameRGBA> {
        self.render(content)
    }
}

fn fill_rounded(ctx: &mut vello_cpu::RenderContext, r: Rect, radius: f64, color: Rgba8) {
    let shape = kurbo::RoundedRect::from_rect(r, radius);
    let mut path = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        path.push(el);
    }
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_path(&path);
}

/// Vertical two-stop gradient as an image paint.
fn gradient_paint(top: Rgba8, bottom: Rgba8, w: u32, h: u32) -> ReelResult<vello_cpu::Image> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let h1 = (h.max(1) - 1) as f32;
    for y in 0..h {
        let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
        let c = Rgba8::new(
            lerp_u8(top.r, bottom.r, t),
            lerp_u8(top.g, bottom.g, t),
            lerp_u8(top.b, bottom.b, t),
            lerp_u8(top.a, bottom.a, t),
        )
        .premultiplied();
        let row = (y as usize) * (w as usize) * 4;
        for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    let pixmap = pixmap_from_premul_bytes(&bytes, w, h)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::validation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReelError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
