//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::sync::Arc;

use image::RgbaImage;

use crate::config::AppConfig;
use crate::core::{
    engine::{OffsetEngine, ParallaxParams},
    geometry::{GeometrySnapshot, ImageOffset},
    page::{Page, PaneId, PX_PER_ROW},
};
use crate::ui::parallax::BackdropCache;

/// Top-level application state.
pub struct AppState {
    /// The pane tree the document is built from.
    pub page: Page,
    /// The backdrop pane.
    pub banner: PaneId,
    /// Nearest scrollable ancestor of the banner — the pane whose scroll
    /// offset the user moves.
    pub scroller: PaneId,
    /// Widget parameters the engine was attached with.
    pub params: ParallaxParams,
    /// The offset engine for the banner.
    pub engine: OffsetEngine,
    /// Current scroll offset of the scroller, in pixels.
    pub scroll: f64,
    /// Viewport height in pixels.  Refreshed from the drawn area each frame
    /// so geometry snapshots always reflect the latest layout.
    pub viewport_px: f64,
    /// Banner pane width in pixels (1 px per column).  Refreshed per frame.
    pub pane_width_px: f64,
    /// The decoded backdrop, once the worker finishes.
    pub backdrop: Option<Arc<RgbaImage>>,
    /// Last offset returned by the engine.
    pub offset: Option<ImageOffset>,
    /// `true` while the decode worker is running.
    pub decoding: bool,
    /// Monotonic generation id used to ignore stale decode results.
    pub decode_generation: u64,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// User-configurable keybindings and widget defaults.
    pub config: AppConfig,
    /// Tick counter driving the decode spinner.
    pub tick: u64,
    /// Width-keyed resize cache for the backdrop renderer.
    pub backdrop_cache: BackdropCache,
}

impl AppState {
    pub fn new(
        page: Page,
        banner: PaneId,
        params: ParallaxParams,
        engine: OffsetEngine,
        config: AppConfig,
    ) -> Self {
        let scroller = page.scroll_parent(banner);
        Self {
            page,
            banner,
            scroller,
            params,
            engine,
            scroll: 0.0,
            viewport_px: 0.0,
            pane_width_px: 0.0,
            backdrop: None,
            offset: None,
            decoding: false,
            decode_generation: 0,
            status_message: None,
            should_quit: false,
            config,
            tick: 0,
            backdrop_cache: BackdropCache::default(),
        }
    }

    /// Largest legal scroll offset for the current viewport.
    pub fn max_scroll(&self) -> f64 {
        (self.page.content_height() - self.viewport_px).max(0.0)
    }

    /// Move the scroller by `delta` pixels, clamped to the document.
    /// Returns the distance actually moved.
    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        let target = (self.scroll + delta).clamp(0.0, self.max_scroll());
        let moved = target - self.scroll;
        self.scroll = target;
        moved
    }

    /// Keep the scroll offset legal after the viewport changed size.
    pub fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
    }

    /// Height of the backdrop as rendered (scaled to the pane width),
    /// once it has been decoded.
    pub fn rendered_image_height(&self) -> Option<f64> {
        let image = self.backdrop.as_ref()?;
        if image.width() == 0 || self.pane_width_px <= 0.0 {
            return None;
        }
        Some(image.height() as f64 * (self.pane_width_px / image.width() as f64))
    }

    /// Fresh measurements for the engine, taken at call time.
    pub fn geometry(&self) -> GeometrySnapshot {
        GeometrySnapshot {
            container_top: self.page.pane_top(self.banner) - self.scroll,
            viewport_height: self.viewport_px.max(PX_PER_ROW),
            scroll_offset: self.scroll,
            image_height: self.rendered_image_height(),
        }
    }
}
