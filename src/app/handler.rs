//! Input handling — maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::state::AppState;
use crate::config::Action;
use crate::core::engine::{EngineError, OffsetEngine, ParallaxParams, ScrollOutcome};
use crate::ui::parallax::BackdropCache;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    if key.kind == KeyEventKind::Release {
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    apply_action(state, action);
}

/// Process a mouse event — only the wheel scrolls the document.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let step = state.config.scroll_step;
    match mouse.kind {
        MouseEventKind::ScrollUp => nudge(state, -step),
        MouseEventKind::ScrollDown => nudge(state, step),
        _ => {}
    }
}

fn apply_action(state: &mut AppState, action: Action) {
    let step = state.config.scroll_step;
    let delta = match action {
        Action::ScrollUp => -step,
        Action::ScrollDown => step,
        Action::PageUp => -state.viewport_px,
        Action::PageDown => state.viewport_px,
        Action::JumpTop => -state.scroll,
        Action::JumpBottom => state.max_scroll() - state.scroll,
        Action::SpeedUp => return retune_speed(state, 0.25),
        Action::SpeedDown => return retune_speed(state, -0.25),
        Action::ToggleBound => return retune_bound(state),
        Action::Quit => {
            state.should_quit = true;
            return;
        }
    };
    nudge(state, delta);
}

/// Scroll by `delta` pixels and notify the engine if anything moved.
fn nudge(state: &mut AppState, delta: f64) {
    let moved = state.scroll_by(delta);
    if moved == 0.0 {
        return;
    }
    notify_scroll(state);
}

/// Forward the current geometry to the engine and apply its outcome.
fn notify_scroll(state: &mut AppState) {
    let snapshot = state.geometry();
    match state.engine.on_scroll(&snapshot) {
        Ok(ScrollOutcome::Moved(offset)) => state.offset = Some(offset),
        Ok(ScrollOutcome::Unchanged) => {}
        // Backdrop still decoding — the image-ready notification will seed
        // the engine; until then scrolls only move the document.
        Err(EngineError::NotReady) => {}
        Err(err) => state.status_message = Some(err.to_string()),
    }
}

/// The decode worker delivered the backdrop: seed the engine with the
/// initial offset computed from the current geometry.
pub fn backdrop_ready(state: &mut AppState) {
    state.backdrop_cache = BackdropCache::default();
    match state.engine.image_ready(&state.geometry()) {
        Ok(offset) => state.offset = Some(offset),
        Err(err) => state.status_message = Some(err.to_string()),
    }
}

/// Re-attach the engine with changed parameters, preserving the backdrop's
/// current position by passing it as the explicit initial offset.
fn retune(state: &mut AppState, mut params: ParallaxParams) {
    if let Some(current) = state.engine.current_offset() {
        params.initial_offset = Some(current);
    }
    match OffsetEngine::new(params.clone()) {
        Ok(mut engine) => {
            if state.backdrop.is_some() {
                if let Ok(offset) = engine.image_ready(&state.geometry()) {
                    state.offset = Some(offset);
                }
            }
            state.engine = engine;
            state.params = params;
        }
        Err(err) => state.status_message = Some(err.to_string()),
    }
}

fn retune_speed(state: &mut AppState, delta: f64) {
    let mut params = state.params.clone();
    params.speed = (params.speed + delta).clamp(0.0, 8.0);
    state.status_message = Some(format!("speed {:.2}", params.speed));
    retune(state, params);
}

fn retune_bound(state: &mut AppState) {
    let mut params = state.params.clone();
    params.bound = params.bound.toggled();
    tracing::debug!("bound policy -> {}", params.bound.label());
    state.status_message = Some(format!("bound policy: {}", params.bound.label()));
    retune(state, params);
}
