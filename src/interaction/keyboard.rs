use crate::config::EditorConfig;

/// Keys the canvas reacts to. The shell maps its toolkit's key type onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Delete,
    Backspace,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS.
    pub command: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasCommand {
    Nudge { dx: f32, dy: f32 },
    Delete,
    Duplicate,
}

/// Resolves a key press on the selected canvas text. Only free text has
/// keyboard editing; subtitle blocks ignore keys.
pub fn command_for(key: Key, modifiers: Modifiers, config: &EditorConfig) -> Option<CanvasCommand> {
    let step = if modifiers.shift {
        config.nudge_step_fast_px
    } else {
        config.nudge_step_px
    };
    match key {
        Key::ArrowLeft => Some(CanvasCommand::Nudge { dx: -step, dy: 0.0 }),
        Key::ArrowRight => Some(CanvasCommand::Nudge { dx: step, dy: 0.0 }),
        Key::ArrowUp => Some(CanvasCommand::Nudge { dx: 0.0, dy: -step }),
        Key::ArrowDown => Some(CanvasCommand::Nudge { dx: 0.0, dy: step }),
        Key::Delete | Key::Backspace => Some(CanvasCommand::Delete),
        Key::D if modifiers.command => Some(CanvasCommand::Duplicate),
        Key::D => None,
    }
}
