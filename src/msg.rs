use crossterm::event::{KeyEvent, MouseEvent};
use std::path::PathBuf;

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // -- Commands typed at the `:` prompt
    Command(String),

    // -- Document
    DocumentChanged(PathBuf),

    // -- System
    Tick,
}
