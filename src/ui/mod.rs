//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No decoding or geometry bookkeeping happens here.

pub mod document;
pub mod layout;
pub mod parallax;
pub mod spinner;
pub mod theme;
