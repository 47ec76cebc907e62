//! A parallax background for the terminal.
//!
//! Run the binary with an image to scroll the demo document; the backdrop
//! inside the banner pane drifts at a configurable fraction of scroll speed.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::app::{
    decode_runtime::{self, DecodeUpdate},
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::config::AppConfig;
use crate::core::{
    engine::{BoundPolicy, OffsetEngine, ParallaxParams},
    geometry::ImageOffset,
    page::{Overflow, Page, PaneId, PX_PER_ROW},
};
use crate::ui::{
    document::{pane_screen_slice, DocumentWidget},
    layout::AppLayout,
    parallax::BackdropWidget,
    spinner::DecodeIndicator,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Parallax background demo for the terminal")]
struct Cli {
    /// Backdrop image (png, jpeg, gif, webp, bmp, tiff).
    image: PathBuf,

    /// Scroll-speed multiplier for the backdrop (defaults to the config value).
    #[arg(long)]
    speed: Option<f64>,

    /// Banner height in terminal rows.
    #[arg(long, default_value_t = 12)]
    height: u16,

    /// Ride the travel boundary instead of freezing at it.
    #[arg(long)]
    clamp: bool,

    /// Explicit initial backdrop offset (left and top, in pixels).
    #[arg(long, num_args = 2, value_names = ["LEFT", "TOP"], allow_negative_numbers = true)]
    initial_offset: Option<Vec<f64>>,

    /// Plain-text file shown as the scrolling document (builtin sample otherwise).
    #[arg(long)]
    text: Option<PathBuf>,

    /// Extra gap above the banner, in terminal rows.
    #[arg(long, default_value_t = 0)]
    top_gap: u16,
}

// ───────────────────────────────────────── document ──────────

/// Fallback document shown when no `--text` file is given.
const SAMPLE_DOCUMENT: &str = "\
# The High Route

Seven days across the massif, hut to hut, with one long detour that was
entirely the fault of an optimistic pencil line drawn at a kitchen table
in March.

The first morning started in fog so thick the trail markers appeared one
at a time, each an act of faith.  By ten the sun had burned through and
the valley snapped open below us — meadows, a ribbon of river, and the
pass we were aiming for hanging improbably high in the east.


## Day two: the moraine

Nobody warns you how loud a glacier is.  The moraine crunched and shifted
underfoot for three hours, and underneath it all was water, everywhere,
running in channels nobody can see.  We stopped often, not because the
ground was difficult but because the ice above us kept cracking like a
door slamming in an empty house.

The hut that night hung on a shelf of rock a hundred metres over the ice.
Dinner was barley soup.  The guardian marked our route on the wall map
with a stub of chalk and tapped, twice, on the section she thought we
should not attempt before dawn.


## Day four: over the pass

We left at five, headlamps off by six, and reached the crest as the light
came over.  From the top the whole week made sense at once — the valley
we had walked, the valley we would walk, and between them nothing but air.

Descending, the path braided itself through old avalanche debris.  Marmots
whistled us along from boulder to boulder.  Far below, the first village
in three days: a church, a fountain, and — we talked about this for a full
hour on the way down — a bakery.


## The last stretch

The final day was all larches and easy ground.  We walked slowly, partly
from tiredness, mostly from reluctance.  At the roadhead we turned around
and the massif had already pulled its clouds back on, as if the whole
thing had been a confidence shared once and then withdrawn.

Walk it west to east.  Carry less than you think you need.  Leave a day
spare for weather, and spend it at the shelf hut if you can — the barley
soup alone is worth the detour.
";

/// Build the demo page: prose, then the banner nested in its own section,
/// then the rest of the prose.  The banner lands just after the first
/// blank line past the document's midpoint.
fn build_page(text: &str, params: &ParallaxParams) -> (Page, PaneId) {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let mid = lines.len() / 2;
    let split = (mid..lines.len())
        .find(|&i| lines[i].trim().is_empty())
        .unwrap_or(mid);

    let mut page = Page::new();
    let body = page.add_container(page.root, Overflow::Visible);
    page.add_text(body, lines[..split].to_vec());

    let section = page.add_container(body, Overflow::Visible);
    if let Some(gap) = params.target_top_offset {
        page.add_spacer(section, gap);
    }
    let banner = page.add_backdrop(section, params.height);

    page.add_text(body, lines[split..].to_vec());
    page.perform_layout();
    (page, banner)
}

// ───────────────────────────────────────── draw ──────────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());

    let document_block = Block::default()
        .title(format!(" {} ", state.params.source.display()))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    let inner = document_block.inner(layout.document_area);

    // Refresh the measurements geometry snapshots are taken from, then keep
    // the scroll legal for the (possibly resized) viewport.
    state.viewport_px = inner.height as f64 * PX_PER_ROW;
    state.pane_width_px = inner.width as f64;
    state.clamp_scroll();

    frame.render_widget(
        DocumentWidget::new(&state.page, state.scroll).block(document_block),
        layout.document_area,
    );

    if let Some((banner_rect, clip_top)) =
        pane_screen_slice(&state.page, state.banner, state.scroll, inner)
    {
        let backdrop = BackdropWidget {
            image: state.backdrop.as_ref(),
            offset: state.offset.unwrap_or_default(),
            clip_top,
            decoding: state.decoding,
        };
        frame.render_stateful_widget(backdrop, banner_rect, &mut state.backdrop_cache);
    }

    frame.render_widget(
        DecodeIndicator {
            visible: state.decoding,
            tick: state.tick,
        },
        layout.document_area,
    );

    // ── status bar ────────────────────────────────────────────
    let hint = state.config.status_bar_hint();
    let message = state.status_message.as_deref().unwrap_or(&hint);
    let readout = format!(
        " speed {:.2} · {} ",
        state.params.speed,
        state.params.bound.label()
    );
    let status = Paragraph::new(Line::from(vec![
        Span::styled(readout, Theme::readout_style()),
        Span::raw(" "),
        Span::raw(message),
    ]))
    .style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load();

    // ── widget parameters ─────────────────────────────────────
    let params = ParallaxParams {
        speed: cli.speed.unwrap_or(config.default_speed),
        height: cli.height as f64 * PX_PER_ROW,
        source: cli.image.clone(),
        initial_offset: cli
            .initial_offset
            .as_ref()
            .map(|pair| ImageOffset::new(pair[0], pair[1])),
        left: 0.0,
        bound: if cli.clamp {
            BoundPolicy::Clamp
        } else {
            config.bound_policy
        },
        target_top_offset: (cli.top_gap > 0).then(|| cli.top_gap as f64 * PX_PER_ROW),
    };

    // ── build the page ────────────────────────────────────────
    let text = match &cli.text {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_DOCUMENT.to_string(),
    };
    let (page, banner) = build_page(&text, &params);
    let engine = OffsetEngine::new(params.clone())?;
    let mut state = AppState::new(page, banner, params, engine, config);
    tracing::debug!(
        "banner pane {} scrolls with pane {}",
        state.banner,
        state.scroller
    );

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (decode_tx, mut decode_rx) =
        tokio::sync::mpsc::unbounded_channel::<(u64, DecodeUpdate)>();
    decode_runtime::start_decode(&mut state, &decode_tx);

    // ── event loop ────────────────────────────────────────────
    loop {
        // Draw first so the document is visible while the backdrop decodes;
        // the banner shows its placeholder until the worker reports in.
        terminal.draw(|frame| draw(frame, &mut state))?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some((generation, update)) = decode_rx.recv() => {
                if decode_runtime::apply_decode_update(&mut state, generation, update) {
                    handler::backdrop_ready(&mut state);
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Persist tuned widget settings for the next run.
    state.config.default_speed = state.params.speed;
    state.config.bound_policy = state.params.bound;
    if let Err(err) = state.config.save() {
        tracing::debug!("config save failed: {err}");
    }

    Ok(())
}
