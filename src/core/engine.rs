//! The offset engine — maps scroll position to backdrop image offsets.
//!
//! The engine is a small state machine: construction validates the
//! parameters, the image-ready notification seeds the retained state with
//! an initial offset, and every scroll notification afterwards produces
//! either a new offset or `Unchanged`.  It retains exactly one pair across
//! calls — the previously seen scroll offset and the previously applied
//! image top — because each update is incremental over the last accepted
//! position.

use std::path::PathBuf;

use thiserror::Error;

use super::geometry::{GeometrySnapshot, ImageOffset};

// ───────────────────────────────────────── parameters ────────

/// What happens when a computed offset would travel past the image's edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundPolicy {
    /// Discard the update and keep the previous offset.  The image stops
    /// responding to further scroll in that direction until a reversal
    /// brings the candidate back into range.
    #[default]
    Freeze,
    /// Truncate the candidate to the nearest travel boundary and accept it.
    Clamp,
}

impl BoundPolicy {
    pub fn toggled(self) -> Self {
        match self {
            BoundPolicy::Freeze => BoundPolicy::Clamp,
            BoundPolicy::Clamp => BoundPolicy::Freeze,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BoundPolicy::Freeze => "freeze",
            BoundPolicy::Clamp => "clamp",
        }
    }
}

/// Widget parameters, fixed once the engine is constructed.
#[derive(Debug, Clone)]
pub struct ParallaxParams {
    /// Multiplier applied to the scroll delta.  `1.0` means the backdrop
    /// tracks the scroll exactly (no visible differential).
    pub speed: f64,
    /// Fixed height of the container pane, in pixels.
    pub height: f64,
    /// The backdrop resource.  Opaque to the engine; only the host's
    /// decoder reads it.
    pub source: PathBuf,
    /// Explicit starting offset.  When set it wins over the computed
    /// initial position, regardless of geometry.
    pub initial_offset: Option<ImageOffset>,
    /// Horizontal resting position of the backdrop.
    pub left: f64,
    /// Boundary behavior at the travel limits.
    pub bound: BoundPolicy,
    /// Extra gap the host inserts above the pane during layout.  Not used
    /// by the offset arithmetic.
    pub target_top_offset: Option<f64>,
}

impl Default for ParallaxParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            height: 0.0,
            source: PathBuf::new(),
            initial_offset: None,
            left: 0.0,
            bound: BoundPolicy::default(),
            target_top_offset: None,
        }
    }
}

impl ParallaxParams {
    /// Substitute defaults for unusable numeric inputs: a non-finite speed
    /// becomes `1.0`, a non-finite height becomes `0.0`.  Negative heights
    /// are left for [`validate`](Self::validate) to reject.
    pub fn sanitised(mut self) -> Self {
        if !self.speed.is_finite() {
            self.speed = 1.0;
        }
        if !self.height.is_finite() {
            self.height = 0.0;
        }
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.height < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "height must be non-negative, got {}",
                self.height
            )));
        }
        Ok(())
    }
}

// ───────────────────────────────────────── outcomes ──────────

/// Result of a scroll notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollOutcome {
    /// The backdrop moved; the host should render the new offset.
    Moved(ImageOffset),
    /// Nothing to apply: the pane is outside the visible window, or the
    /// candidate offset fell outside the travel range under
    /// [`BoundPolicy::Freeze`].  Normal operation, not an error.
    Unchanged,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// The parameters cannot describe a usable widget.
    #[error("invalid parallax parameters: {0}")]
    InvalidConfig(String),
    /// An update was requested before the backdrop's rendered height is
    /// known (image not decoded yet, or the engine was never seeded).
    #[error("backdrop height not known yet")]
    NotReady,
}

// ───────────────────────────────────────── engine ────────────

/// State carried between notifications.
#[derive(Debug, Clone, Copy)]
struct Retained {
    prev_scroll: f64,
    prev_top: f64,
}

/// The offset engine.  One instance per attached widget.
#[derive(Debug, Clone)]
pub struct OffsetEngine {
    params: ParallaxParams,
    state: Option<Retained>,
}

impl OffsetEngine {
    /// Attach with the given parameters.  Parameters are sanitised, then
    /// validated; the engine starts unseeded and answers `NotReady` to
    /// scroll notifications until [`image_ready`](Self::image_ready) runs.
    pub fn new(params: ParallaxParams) -> Result<Self, EngineError> {
        let params = params.sanitised();
        params.validate()?;
        Ok(Self { params, state: None })
    }

    pub fn params(&self) -> &ParallaxParams {
        &self.params
    }

    /// The last applied offset, if the engine has been seeded.
    pub fn current_offset(&self) -> Option<ImageOffset> {
        self.state
            .map(|s| ImageOffset::new(self.params.left, s.prev_top))
    }

    /// The backdrop finished loading: compute the initial resting offset
    /// and seed the retained state with it.
    ///
    /// An explicit `initial_offset` wins unconditionally.  Otherwise the
    /// position interpolates with how far down the viewport the pane
    /// currently sits, so reopening the page mid-scroll lands on a
    /// continuous position instead of snapping to an edge.
    pub fn image_ready(
        &mut self,
        geometry: &GeometrySnapshot,
    ) -> Result<ImageOffset, EngineError> {
        let offset = if let Some(explicit) = self.params.initial_offset {
            explicit
        } else {
            let image_height = geometry
                .known_image_height()
                .ok_or(EngineError::NotReady)?;
            let top = if geometry.container_top < 0.0 {
                // Pane already scrolled above the fold: pin to the top edge.
                0.0
            } else if geometry.container_top > geometry.viewport_height {
                // Pane below the fold: pin to the bottom edge.
                self.params.height - image_height
            } else {
                -(geometry.container_top / geometry.viewport_height) * image_height
            };
            // The interpolated position can overshoot the travel range when
            // the pane sits near the viewport bottom; keep the offset legal.
            let min_top = (self.params.height - image_height).min(0.0);
            ImageOffset::new(0.0, top.clamp(min_top, 0.0))
        };

        self.state = Some(Retained {
            prev_scroll: geometry.scroll_offset,
            prev_top: offset.top,
        });
        Ok(offset)
    }

    /// A scroll notification arrived: evaluate the new candidate offset.
    ///
    /// The retained scroll offset advances on every evaluated call — even
    /// when the update is gated or rejected — so deltas never accumulate
    /// stale distance and the backdrop resumes without a jump when it
    /// re-enters the window.  The retained image top only advances on
    /// acceptance.
    pub fn on_scroll(
        &mut self,
        geometry: &GeometrySnapshot,
    ) -> Result<ScrollOutcome, EngineError> {
        let image_height = geometry
            .known_image_height()
            .ok_or(EngineError::NotReady)?;
        let params = &self.params;
        let state = self.state.as_mut().ok_or(EngineError::NotReady)?;

        let delta = geometry.scroll_offset - state.prev_scroll;
        state.prev_scroll = geometry.scroll_offset;

        // Visibility gate: only panes fully inside the window move.
        let visible = geometry.container_top >= 0.0
            && geometry.container_top <= geometry.viewport_height - params.height;
        if !visible {
            return Ok(ScrollOutcome::Unchanged);
        }

        let candidate = state.prev_top - params.speed * delta;

        // Travel range for the image top.  When the image is shorter than
        // the pane the range degenerates to [0, 0].
        let min_top = (params.height - image_height).min(0.0);
        let top = if candidate < min_top || candidate > 0.0 {
            match params.bound {
                BoundPolicy::Freeze => return Ok(ScrollOutcome::Unchanged),
                BoundPolicy::Clamp => candidate.clamp(min_top, 0.0),
            }
        } else {
            candidate
        };

        state.prev_top = top;
        Ok(ScrollOutcome::Moved(ImageOffset::new(params.left, top)))
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(container_top: f64, viewport: f64, scroll: f64, image: f64) -> GeometrySnapshot {
        GeometrySnapshot {
            container_top,
            viewport_height: viewport,
            scroll_offset: scroll,
            image_height: Some(image),
        }
    }

    fn params(speed: f64, height: f64) -> ParallaxParams {
        ParallaxParams {
            speed,
            height,
            ..ParallaxParams::default()
        }
    }

    #[test]
    fn initial_offset_interpolates_with_viewport_position() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        let offset = engine.image_ready(&geo(400.0, 800.0, 0.0, 1000.0)).unwrap();
        assert_eq!(offset.top, -500.0, "-(400/800)*1000");
        assert_eq!(offset.left, 0.0);
    }

    #[test]
    fn initial_offset_pins_top_when_above_fold() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        let offset = engine.image_ready(&geo(-40.0, 800.0, 0.0, 1000.0)).unwrap();
        assert_eq!(offset, ImageOffset::new(0.0, 0.0));
    }

    #[test]
    fn initial_offset_pins_bottom_when_below_fold() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        let offset = engine.image_ready(&geo(900.0, 800.0, 0.0, 1000.0)).unwrap();
        assert_eq!(offset, ImageOffset::new(0.0, 200.0 - 1000.0));
    }

    #[test]
    fn initial_offset_stays_within_travel_range() {
        // For any in-window position the computed top lands inside
        // [height - image_height, 0].
        let mut engine = OffsetEngine::new(params(1.0, 300.0)).unwrap();
        for i in -5..=25 {
            let container_top = 40.0 * i as f64; // -200..=1000
            let offset = engine
                .image_ready(&geo(container_top, 800.0, 0.0, 900.0))
                .unwrap();
            assert!(
                offset.top <= 0.0 && offset.top >= 300.0 - 900.0,
                "top {} out of range at container_top {}",
                offset.top,
                container_top
            );
        }
    }

    #[test]
    fn explicit_initial_offset_wins_over_geometry() {
        let mut engine = OffsetEngine::new(ParallaxParams {
            initial_offset: Some(ImageOffset::new(10.0, -20.0)),
            ..params(1.0, 200.0)
        })
        .unwrap();
        // Geometry would place the pane below the fold; the override still wins.
        let offset = engine.image_ready(&geo(900.0, 800.0, 0.0, 1000.0)).unwrap();
        assert_eq!(offset, ImageOffset::new(10.0, -20.0));
    }

    #[test]
    fn update_before_image_ready_is_not_ready() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        let result = engine.on_scroll(&geo(100.0, 800.0, 0.0, 1000.0));
        assert!(matches!(result, Err(EngineError::NotReady)));
    }

    #[test]
    fn update_with_unknown_image_height_is_not_ready() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        engine.image_ready(&geo(100.0, 800.0, 0.0, 1000.0)).unwrap();
        let blind = GeometrySnapshot {
            container_top: 100.0,
            viewport_height: 800.0,
            scroll_offset: 10.0,
            image_height: None,
        };
        assert!(matches!(engine.on_scroll(&blind), Err(EngineError::NotReady)));
    }

    #[test]
    fn negative_height_is_rejected() {
        let result = OffsetEngine::new(params(1.0, -1.0));
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn non_finite_inputs_fall_back_to_defaults() {
        let engine = OffsetEngine::new(params(f64::NAN, f64::INFINITY)).unwrap();
        assert_eq!(engine.params().speed, 1.0);
        assert_eq!(engine.params().height, 0.0);
    }

    #[test]
    fn zero_delta_update_is_idempotent() {
        let mut engine = OffsetEngine::new(params(2.0, 200.0)).unwrap();
        let seed = engine.image_ready(&geo(400.0, 800.0, 50.0, 1000.0)).unwrap();
        let first = engine.on_scroll(&geo(400.0, 800.0, 50.0, 1000.0)).unwrap();
        let second = engine.on_scroll(&geo(400.0, 800.0, 50.0, 1000.0)).unwrap();
        let expected = ScrollOutcome::Moved(ImageOffset::new(0.0, seed.top));
        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[test]
    fn unit_speed_moves_one_pixel_per_scrolled_pixel() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        let seed = engine.image_ready(&geo(400.0, 800.0, 0.0, 1000.0)).unwrap();
        let outcome = engine.on_scroll(&geo(370.0, 800.0, 30.0, 1000.0)).unwrap();
        match outcome {
            ScrollOutcome::Moved(offset) => assert_eq!(offset.top, seed.top - 30.0),
            other => panic!("expected Moved, got {:?}", other),
        }
    }

    #[test]
    fn out_of_range_candidate_is_rejected_under_freeze() {
        // height 500, image 800 → range [-300, 0]; prev_top -50, speed 2,
        // delta 200 → candidate -450 is out of range and the offset holds.
        let mut engine = OffsetEngine::new(ParallaxParams {
            initial_offset: Some(ImageOffset::new(0.0, -50.0)),
            ..params(2.0, 500.0)
        })
        .unwrap();
        engine.image_ready(&geo(100.0, 800.0, 0.0, 800.0)).unwrap();

        let outcome = engine.on_scroll(&geo(100.0, 800.0, 200.0, 800.0)).unwrap();
        assert_eq!(outcome, ScrollOutcome::Unchanged);
        assert_eq!(
            engine.current_offset().unwrap().top,
            -50.0,
            "rejected update must keep the previous offset"
        );
    }

    #[test]
    fn out_of_range_candidate_truncates_under_clamp() {
        let mut engine = OffsetEngine::new(ParallaxParams {
            initial_offset: Some(ImageOffset::new(0.0, -50.0)),
            bound: BoundPolicy::Clamp,
            ..params(2.0, 500.0)
        })
        .unwrap();
        engine.image_ready(&geo(100.0, 800.0, 0.0, 800.0)).unwrap();

        let outcome = engine.on_scroll(&geo(100.0, 800.0, 200.0, 800.0)).unwrap();
        assert_eq!(
            outcome,
            ScrollOutcome::Moved(ImageOffset::new(0.0, -300.0)),
            "clamp policy rides the travel boundary"
        );
    }

    #[test]
    fn candidate_exactly_on_boundary_is_accepted() {
        let mut engine = OffsetEngine::new(ParallaxParams {
            initial_offset: Some(ImageOffset::new(0.0, -100.0)),
            ..params(1.0, 500.0)
        })
        .unwrap();
        engine.image_ready(&geo(100.0, 800.0, 0.0, 800.0)).unwrap();

        // candidate = -100 - 200 = -300 == min_top, inside the closed range.
        let outcome = engine.on_scroll(&geo(100.0, 800.0, 200.0, 800.0)).unwrap();
        assert_eq!(outcome, ScrollOutcome::Moved(ImageOffset::new(0.0, -300.0)));
    }

    #[test]
    fn pane_outside_window_yields_unchanged() {
        // 600 > 800 - 300: the pane pokes out of the window's bottom.
        let mut engine = OffsetEngine::new(params(1.0, 300.0)).unwrap();
        engine.image_ready(&geo(200.0, 800.0, 0.0, 1000.0)).unwrap();
        let outcome = engine.on_scroll(&geo(600.0, 800.0, 40.0, 1000.0)).unwrap();
        assert_eq!(outcome, ScrollOutcome::Unchanged);
    }

    #[test]
    fn scrolling_while_hidden_does_not_accumulate_delta() {
        let mut engine = OffsetEngine::new(params(1.0, 200.0)).unwrap();
        let seed = engine.image_ready(&geo(400.0, 800.0, 0.0, 1000.0)).unwrap();

        // Pane leaves the window; lots of scrolling happens out of sight.
        for step in 1..=5 {
            let outcome = engine
                .on_scroll(&geo(-300.0, 800.0, step as f64 * 500.0, 1000.0))
                .unwrap();
            assert_eq!(outcome, ScrollOutcome::Unchanged);
        }

        // Re-entry with a 10 px delta moves the backdrop by exactly 10 px,
        // not by the 2500 px travelled while hidden.
        let outcome = engine.on_scroll(&geo(100.0, 800.0, 2510.0, 1000.0)).unwrap();
        match outcome {
            ScrollOutcome::Moved(offset) => assert_eq!(offset.top, seed.top - 10.0),
            other => panic!("expected Moved, got {:?}", other),
        }
    }

    #[test]
    fn short_image_holds_top_at_zero() {
        // image 100 < height 300: the travel range degenerates to [0, 0].
        let mut engine = OffsetEngine::new(ParallaxParams {
            initial_offset: Some(ImageOffset::new(0.0, 0.0)),
            ..params(1.0, 300.0)
        })
        .unwrap();
        engine.image_ready(&geo(100.0, 800.0, 0.0, 100.0)).unwrap();

        let outcome = engine.on_scroll(&geo(60.0, 800.0, 40.0, 100.0)).unwrap();
        assert_eq!(outcome, ScrollOutcome::Unchanged);
        assert_eq!(engine.current_offset().unwrap().top, 0.0);
    }

    #[test]
    fn accepted_update_reports_configured_left() {
        let mut engine = OffsetEngine::new(ParallaxParams {
            left: 6.0,
            ..params(0.5, 200.0)
        })
        .unwrap();
        engine.image_ready(&geo(400.0, 800.0, 0.0, 1000.0)).unwrap();
        let outcome = engine.on_scroll(&geo(390.0, 800.0, 10.0, 1000.0)).unwrap();
        match outcome {
            ScrollOutcome::Moved(offset) => assert_eq!(offset.left, 6.0),
            other => panic!("expected Moved, got {:?}", other),
        }
    }
}
