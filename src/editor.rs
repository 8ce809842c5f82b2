use std::fmt;

use egui::Pos2;
use futures::channel::oneshot;

use crate::history::History;
use crate::input::{EditorAction, KeyInput, PointerEvent, PointerPhase};
use crate::layer::{LayerError, LayerStack};
use crate::persistence::{self, PersistenceError, SavedDrawing};
use crate::stroke::StrokeEngine;
use crate::surface::{PixmapSurface, Snapshot, Surface, SurfaceError};
use crate::tool::{Tool, ToolConfig};

/// Operations refused by the editor
#[derive(Debug)]
pub enum EditError {
    /// A snapshot restore is still decoding; edits are disabled until it
    /// completes.
    RestoreInFlight,
    /// The layer stack refused the operation.
    Layer(LayerError),
    /// A drawing document could not be produced or consumed.
    Persistence(PersistenceError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestoreInFlight => write!(f, "a snapshot restore is still in progress"),
            Self::Layer(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<LayerError> for EditError {
    fn from(err: LayerError) -> Self {
        Self::Layer(err)
    }
}

impl From<PersistenceError> for EditError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

/// A restore whose completion signal has not fired yet. While one exists all
/// drawing, structural and history operations are refused.
struct PendingRestore {
    done: oneshot::Receiver<Result<(), SurfaceError>>,
    /// Recomposite and snapshot once the restore lands (document loads).
    recomposite: bool,
}

/// The drawing surface component: tools, layers, history and the display,
/// driven by normalized input events.
///
/// Pointer-down starts a stroke against the active layer (or opens a text
/// request for the text tool), pointer-moves extend it, pointer-up or -leave
/// finalizes it; after a finished stroke, a text commit, or any structural
/// layer operation the visible layers are recomposited onto the display
/// surface and the result is recorded in history.
pub struct PaintEditor<S: Surface = PixmapSurface> {
    config: ToolConfig,
    stack: LayerStack<S>,
    display: S,
    history: History,
    strokes: StrokeEngine,
    text_request: Option<Pos2>,
    restore: Option<PendingRestore>,
}

impl<S: Surface> PaintEditor<S> {
    /// Creates an editor with a single white base layer and records the blank
    /// display as the first history entry.
    pub fn new(width: usize, height: usize) -> Self {
        let stack = LayerStack::new(width, height);
        let mut editor = Self {
            config: ToolConfig::default(),
            stack,
            display: S::with_size(width, height),
            history: History::new(),
            strokes: StrokeEngine::new(),
            text_request: None,
            restore: None,
        };
        editor.composite();
        editor.record_snapshot();
        editor
    }

    // ---- tool configuration -------------------------------------------------

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Selects the active tool. A stroke already in progress keeps the
    /// configuration it captured when it began.
    pub fn set_tool(&mut self, tool: Tool) {
        self.config.tool = tool;
        log::info!("Active tool: {}", tool.name());
    }

    pub fn set_color_hex(&mut self, hex: &str) {
        self.config.set_color_hex(hex);
    }

    pub fn set_size(&mut self, size: f32) {
        self.config.set_size(size);
    }

    pub fn set_fill_shape(&mut self, fill: bool) {
        self.config.fill_shape = fill;
    }

    // ---- pointer and keyboard input -----------------------------------------

    /// Feeds one normalized pointer event through the drawing state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.restore_in_flight() {
            log::warn!("Pointer input dropped while a restore is in flight");
            return;
        }
        let pos = self.display.bounds().clamp(event.pos);
        match event.phase {
            PointerPhase::Down => {
                if self.config.tool == Tool::Text {
                    // Text suspends the stroke flow and waits for the host to
                    // supply content via commit_text/cancel_text.
                    self.text_request = Some(pos);
                    log::info!("Text entry requested at {pos:?}");
                } else {
                    self.strokes.begin(pos, self.config);
                }
            }
            PointerPhase::Move => {
                let painted = self
                    .strokes
                    .continue_to(pos, self.stack.active_layer_mut().surface_mut());
                if painted {
                    self.composite();
                }
            }
            // Leaving the surface finalizes the stroke, it does not discard it.
            PointerPhase::Up | PointerPhase::Leave => {
                let finished = self
                    .strokes
                    .end(pos, self.stack.active_layer_mut().surface_mut());
                if finished {
                    self.composite();
                    self.record_snapshot();
                }
            }
        }
    }

    /// Dispatches a keyboard chord; returns the action it mapped to, if any.
    pub fn handle_key(&mut self, input: KeyInput) -> Option<EditorAction> {
        let action = input.action()?;
        match action {
            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }
            EditorAction::CancelText => self.cancel_text(),
        }
        Some(action)
    }

    // ---- text commit --------------------------------------------------------

    /// Position awaiting text content, set by a pointer-down with the text
    /// tool.
    pub fn pending_text(&self) -> Option<Pos2> {
        self.text_request
    }

    /// Draws the confirmed text at the requested position, then recomposites
    /// and snapshots. Empty or whitespace-only input commits nothing.
    pub fn commit_text(&mut self, text: &str) {
        if self.restore_in_flight() {
            log::warn!("Text commit dropped while a restore is in flight");
            return;
        }
        let Some(origin) = self.text_request.take() else {
            log::warn!("No pending text request");
            return;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let font_px = self.config.font_px();
        let color = self.config.color;
        self.stack
            .active_layer_mut()
            .surface_mut()
            .draw_text(trimmed, origin, font_px, color);
        self.composite();
        self.record_snapshot();
    }

    /// Abandons an open text request without touching any pixels.
    pub fn cancel_text(&mut self) {
        if self.text_request.take().is_some() {
            log::info!("Text entry cancelled");
        }
    }

    // ---- layers -------------------------------------------------------------

    /// Adds a new white layer on top, makes it active, and snapshots the
    /// recomposited result. Returns the new layer's index.
    pub fn add_layer(&mut self) -> Result<usize, EditError> {
        self.ensure_idle()?;
        let index = self.stack.add_layer();
        self.composite();
        self.record_snapshot();
        Ok(index)
    }

    /// Deletes the active layer; refused when it is the only one.
    pub fn delete_layer(&mut self) -> Result<(), EditError> {
        self.ensure_idle()?;
        self.stack.delete_active()?;
        self.composite();
        self.record_snapshot();
        Ok(())
    }

    pub fn set_active_layer(&mut self, index: usize) -> Result<(), EditError> {
        self.ensure_idle()?;
        self.stack.set_active(index)?;
        self.composite();
        self.record_snapshot();
        Ok(())
    }

    /// Flips a layer's visibility; its stored pixels are untouched. Returns
    /// the new flag.
    pub fn toggle_layer_visibility(&mut self, index: usize) -> Result<bool, EditError> {
        self.ensure_idle()?;
        let visible = self.stack.toggle_visibility(index)?;
        self.composite();
        self.record_snapshot();
        Ok(visible)
    }

    /// Resets the active layer to its initial white fill.
    pub fn clear_active_layer(&mut self) -> Result<(), EditError> {
        self.ensure_idle()?;
        self.stack.active_layer_mut().clear_to_white();
        self.composite();
        self.record_snapshot();
        Ok(())
    }

    pub fn layers(&self) -> &LayerStack<S> {
        &self.stack
    }

    // ---- history ------------------------------------------------------------

    /// Rewinds one step and restores that snapshot onto the display. Returns
    /// `false` at the history boundary or while a restore is in flight.
    pub fn undo(&mut self) -> bool {
        if self.restore_in_flight() {
            log::warn!("Undo dropped while a restore is in flight");
            return false;
        }
        match self.history.undo() {
            Some(snapshot) => {
                self.start_display_restore(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Replays one step forward. Returns `false` at the newest entry or while
    /// a restore is in flight.
    pub fn redo(&mut self) -> bool {
        if self.restore_in_flight() {
            log::warn!("Redo dropped while a restore is in flight");
            return false;
        }
        match self.history.redo() {
            Some(snapshot) => {
                self.start_display_restore(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ---- documents ----------------------------------------------------------

    /// Captures the flattened display into a persistable document.
    pub fn save_document(&self) -> Result<SavedDrawing, PersistenceError> {
        SavedDrawing::capture(&self.display)
    }

    /// Replaces the active layer's pixels with a previously saved drawing,
    /// then recomposites and snapshots once the decode completes. Until then
    /// all edits are refused.
    pub fn load_document(&mut self, doc: &SavedDrawing) -> Result<(), EditError> {
        self.ensure_idle()?;
        let snapshot = doc.decode_snapshot()?;
        let (tx, rx) = oneshot::channel();
        self.stack
            .active_layer_mut()
            .surface_mut()
            .import_pixels(&snapshot, tx);
        self.restore = Some(PendingRestore {
            done: rx,
            recomposite: true,
        });
        self.poll_restore();
        Ok(())
    }

    /// The flattened display as encoded PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>, PersistenceError> {
        persistence::export_png(&self.display)
    }

    // ---- display ------------------------------------------------------------

    /// The composited display surface.
    pub fn display(&self) -> &S {
        &self.display
    }

    /// True while a snapshot restore is still decoding; polls for completion
    /// first, so this also drives deferred restores forward.
    pub fn restore_pending(&mut self) -> bool {
        self.restore_in_flight()
    }

    // ---- internals ----------------------------------------------------------

    fn composite(&mut self) {
        self.stack.composite_onto(&mut self.display);
    }

    fn record_snapshot(&mut self) {
        match self.display.export_pixels() {
            Ok(snapshot) => self.history.record(snapshot),
            Err(err) => log::error!("Failed to capture history snapshot: {err}"),
        }
    }

    fn ensure_idle(&mut self) -> Result<(), EditError> {
        if self.restore_in_flight() {
            return Err(EditError::RestoreInFlight);
        }
        Ok(())
    }

    fn restore_in_flight(&mut self) -> bool {
        self.poll_restore();
        self.restore.is_some()
    }

    fn start_display_restore(&mut self, snapshot: &Snapshot) {
        let (tx, rx) = oneshot::channel();
        self.display.import_pixels(snapshot, tx);
        self.restore = Some(PendingRestore {
            done: rx,
            recomposite: false,
        });
        // Synchronous surfaces complete immediately; resolve without waiting
        // for the next input event.
        self.poll_restore();
    }

    fn poll_restore(&mut self) {
        let Some(pending) = self.restore.as_mut() else {
            return;
        };
        match pending.done.try_recv() {
            // Still decoding.
            Ok(None) => {}
            Ok(Some(Ok(()))) => {
                let recomposite = pending.recomposite;
                self.restore = None;
                if recomposite {
                    self.composite();
                    self.record_snapshot();
                }
            }
            Ok(Some(Err(err))) => {
                self.restore = None;
                log::error!("Snapshot restore failed: {err}");
            }
            Err(oneshot::Canceled) => {
                self.restore = None;
                log::warn!("Restore completion signal dropped");
            }
        }
    }
}
