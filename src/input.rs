use egui::{Key, Modifiers, Pos2};

/// Phase of a normalized pointer event.
///
/// Leaving the surface mid-stroke finalizes the stroke rather than discarding
/// it, so `Leave` is handled like `Up` by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// A device-independent pointer event in surface-local coordinates.
///
/// The input-adaptation collaborator (mouse, touch, pen) produces these; the
/// core never sees raw device events.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pos: Pos2,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Down, pos: Pos2::new(x, y) }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Move, pos: Pos2::new(x, y) }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Up, pos: Pos2::new(x, y) }
    }

    pub fn leave(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Leave, pos: Pos2::new(x, y) }
    }
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Maps the keyboard chord to an editor action:
    /// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z and Ctrl/Cmd+Y redo, Escape
    /// cancels an open text-entry request.
    pub fn action(&self) -> Option<EditorAction> {
        if self.key == Key::Escape {
            return Some(EditorAction::CancelText);
        }
        if !self.modifiers.command {
            return None;
        }
        match self.key {
            Key::Z if self.modifiers.shift => Some(EditorAction::Redo),
            Key::Z => Some(EditorAction::Undo),
            Key::Y => Some(EditorAction::Redo),
            _ => None,
        }
    }
}

/// Actions the keyboard surface can trigger on the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Undo,
    Redo,
    CancelText,
}
