//! Backdrop widget — draws the parallax image strip behind the banner pane.
//!
//! The image is resized once per pane width and cached; each frame only
//! copies the visible strip into the buffer.  Rendering uses Unicode `▀`
//! half-blocks, so every terminal cell carries two vertically stacked
//! pixels: the top pixel in the foreground colour, the bottom in the
//! background colour.

use std::sync::Arc;

use image::{imageops::FilterType, RgbaImage};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};

use crate::core::geometry::ImageOffset;

use super::theme::Theme;

/// Width-keyed cache of the backdrop resized to the pane width.
///
/// Reset it whenever a new backdrop is decoded; the width check alone
/// covers terminal resizes.
#[derive(Debug, Default)]
pub struct BackdropCache {
    resized: Option<RgbaImage>,
    for_width: u16,
}

impl BackdropCache {
    /// The backdrop scaled to `width` columns, preserving aspect ratio.
    fn ensure(&mut self, source: &RgbaImage, width: u16) -> &RgbaImage {
        if self.for_width != width {
            self.resized = None;
            self.for_width = width;
        }
        self.resized.get_or_insert_with(|| {
            let w = width.max(1) as u32;
            let h = (source.height() as f64 * (w as f64 / source.width().max(1) as f64))
                .round()
                .max(1.0) as u32;
            image::imageops::resize(source, w, h, FilterType::Triangle)
        })
    }
}

/// The banner's backdrop for one frame.
pub struct BackdropWidget<'a> {
    /// Decoded backdrop, if available.
    pub image: Option<&'a Arc<RgbaImage>>,
    /// Offset of the image within the pane, from the engine.
    pub offset: ImageOffset,
    /// Pixels of the pane hidden above the viewport top (the pane is
    /// partially scrolled out).
    pub clip_top: f64,
    /// `true` while the decode worker is still running.
    pub decoding: bool,
}

impl StatefulWidget for BackdropWidget<'_> {
    type State = BackdropCache;

    fn render(self, area: Rect, buf: &mut Buffer, cache: &mut BackdropCache) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, Theme::backdrop_fill_style());

        let Some(source) = self.image else {
            render_placeholder(self.decoding, area, buf);
            return;
        };

        let resized = cache.ensure(source, area.width);
        let (iw, ih) = (resized.width() as i64, resized.height() as i64);

        // First source pixel row shown in the top cell row.  `clip_top`
        // skips what scrolled past the viewport; `-offset.top` skips what
        // the engine slid above the pane's top edge.
        let base = self.clip_top - self.offset.top;

        for row in 0..area.height {
            let yt = (base + row as f64 * 2.0).round() as i64;
            let yb = yt + 1;
            for col in 0..area.width {
                let sx = (col as f64 - self.offset.left).round() as i64;
                if sx < 0 || sx >= iw || yt < 0 || yt >= ih {
                    continue; // outside the image — leave the fill colour
                }
                let t = resized.get_pixel(sx as u32, yt as u32);
                let fg = ratatui::style::Color::Rgb(t[0], t[1], t[2]);
                let bg = if yb < ih {
                    let b = resized.get_pixel(sx as u32, yb as u32);
                    ratatui::style::Color::Rgb(b[0], b[1], b[2])
                } else {
                    ratatui::style::Color::Reset
                };
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_char('▀').set_fg(fg).set_bg(bg);
                }
            }
        }
    }
}

fn render_placeholder(decoding: bool, area: Rect, buf: &mut Buffer) {
    let label = if decoding { "Loading…" } else { "backdrop unavailable" };
    let width = label.chars().count() as u16;
    if area.width < width {
        return;
    }
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height / 2,
        width,
        1,
    );
    Paragraph::new(Line::from(Span::styled(label, Theme::placeholder_style()))).render(rect, buf);
}
