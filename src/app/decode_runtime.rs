//! Background backdrop decoding.
//!
//! Decoding happens on a plain worker thread so a large image never stalls
//! the event loop; the result comes back over a channel tagged with a
//! generation id, and stale results (from a superseded decode) are dropped.

use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::state::AppState;

#[derive(Debug)]
pub enum DecodeUpdate {
    Done { image: Arc<RgbaImage> },
    Failed { error: String },
}

/// Kick off a decode of the configured backdrop source.
pub fn start_decode(state: &mut AppState, tx: &UnboundedSender<(u64, DecodeUpdate)>) {
    state.decode_generation = state.decode_generation.wrapping_add(1);
    let generation = state.decode_generation;
    state.decoding = true;
    state.backdrop = None;

    let path = state.params.source.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        tracing::debug!("decode start: {}", path.display());
        let update = match image::open(&path) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                tracing::debug!("decode done: {}x{}", rgba.width(), rgba.height());
                DecodeUpdate::Done {
                    image: Arc::new(rgba),
                }
            }
            Err(err) => DecodeUpdate::Failed {
                error: err.to_string(),
            },
        };
        let _ = tx.send((generation, update));
    });
}

/// Apply a decode message.  Returns `true` when the backdrop became ready —
/// the caller should then fire the engine's image-ready notification.
pub fn apply_decode_update(state: &mut AppState, generation: u64, update: DecodeUpdate) -> bool {
    if generation != state.decode_generation {
        return false; // stale worker
    }
    state.decoding = false;
    match update {
        DecodeUpdate::Done { image } => {
            state.backdrop = Some(image);
            true
        }
        DecodeUpdate::Failed { error } => {
            state.status_message = Some(format!("backdrop decode failed: {error}"));
            false
        }
    }
}
