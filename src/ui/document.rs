//! Document widget — renders the visible slice of the page's text panes.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::core::page::{Page, PaneId, PaneKind, PX_PER_ROW};

use super::theme::Theme;

/// The scrolling document — created fresh each frame.
pub struct DocumentWidget<'a> {
    page: &'a Page,
    /// Scroll offset in pixels.
    scroll: f64,
    block: Option<Block<'a>>,
}

impl<'a> DocumentWidget<'a> {
    pub fn new(page: &'a Page, scroll: f64) -> Self {
        Self {
            page,
            scroll,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for DocumentWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        for pane in &self.page.panes {
            let PaneKind::Text(lines) = &pane.kind else {
                continue;
            };
            let top_row = ((pane.top - self.scroll) / PX_PER_ROW).floor() as i32;
            if top_row >= inner.height as i32 || top_row + (lines.len() as i32) < 0 {
                continue;
            }
            for (i, text) in lines.iter().enumerate() {
                let y = top_row + i as i32;
                if y < 0 {
                    continue;
                }
                if y >= inner.height as i32 {
                    break;
                }
                let style = if text.starts_with('#') {
                    Theme::heading_style()
                } else {
                    Theme::text_style()
                };
                let line = Line::from(Span::styled(text.as_str(), style));
                buf.set_line(inner.x, inner.y + y as u16, &line, inner.width);
            }
        }
    }
}

/// On-screen slice of a pane: the visible rect plus the pixels of the pane
/// hidden above the viewport top.  Pure layout math shared between this
/// widget and the draw loop (the backdrop widget renders into the returned
/// rect).  `None` when the pane is entirely off-screen.
pub fn pane_screen_slice(page: &Page, id: PaneId, scroll: f64, inner: Rect) -> Option<(Rect, f64)> {
    let pane = page.get(id);
    let top_px = pane.top - scroll;
    let bottom_px = top_px + pane.height;
    let viewport_px = inner.height as f64 * PX_PER_ROW;
    if bottom_px <= 0.0 || top_px >= viewport_px {
        return None;
    }

    let clip_top = (-top_px).max(0.0);
    let row0 = (top_px.max(0.0) / PX_PER_ROW).floor() as u16;
    let row1 = ((bottom_px.min(viewport_px) / PX_PER_ROW).ceil() as u16).min(inner.height);
    if row1 <= row0 {
        return None;
    }
    Some((
        Rect::new(inner.x, inner.y + row0, inner.width, row1 - row0),
        clip_top,
    ))
}
