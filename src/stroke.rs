use egui::Pos2;

use crate::surface::{CompositeMode, Surface};
use crate::tool::{Tool, ToolConfig};

/// One in-progress drawing gesture, alive between pointer-down and pointer-up.
///
/// The tool configuration is the snapshot captured when the stroke began;
/// `start` is the pointer-down position and `last` the most recent one.
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    config: ToolConfig,
    start: Pos2,
    last: Pos2,
}

/// Converts pointer positions plus a captured tool configuration into
/// primitive operations against a target surface.
///
/// The engine draws, nothing more: recomposition and history snapshots after a
/// segment or a finished stroke are the caller's responsibility.
#[derive(Debug, Default)]
pub struct StrokeEngine {
    active: Option<ActiveStroke>,
}

impl StrokeEngine {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts a stroke at `point` with a by-value snapshot of `config`.
    ///
    /// Returns `false` without starting anything for the text tool (text goes
    /// through the immediate-commit path) or when a stroke is already active.
    pub fn begin(&mut self, point: Pos2, config: ToolConfig) -> bool {
        if config.tool == Tool::Text {
            return false;
        }
        if self.active.is_some() {
            log::warn!("Stroke already in progress, ignoring begin");
            return false;
        }
        self.active = Some(ActiveStroke {
            config,
            start: point,
            last: point,
        });
        true
    }

    /// Extends the active stroke to `point`.
    ///
    /// Freehand tools paint a round-capped segment from the previous position
    /// and return `true`; shape tools only track the position. No-op when no
    /// stroke is active.
    pub fn continue_to<S: Surface>(&mut self, point: Pos2, target: &mut S) -> bool {
        let Some(stroke) = self.active.as_mut() else {
            return false;
        };
        let painted = match stroke.config.tool {
            Tool::Brush => {
                target.stroke_line(
                    stroke.last,
                    point,
                    stroke.config.size,
                    stroke.config.color,
                    CompositeMode::SourceOver,
                );
                true
            }
            // The eraser removes pixels regardless of the configured color.
            Tool::Eraser => {
                target.stroke_line(
                    stroke.last,
                    point,
                    stroke.config.size,
                    stroke.config.color,
                    CompositeMode::DestinationOut,
                );
                true
            }
            Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Text => false,
        };
        stroke.last = point;
        painted
    }

    /// Finalizes the active stroke at `point`, committing shape tools as a
    /// single primitive. Returns `true` if a stroke was finalized.
    pub fn end<S: Surface>(&mut self, point: Pos2, target: &mut S) -> bool {
        let Some(stroke) = self.active.take() else {
            return false;
        };
        let config = stroke.config;
        match config.tool {
            // Freehand strokes already painted during the moves.
            Tool::Brush | Tool::Eraser => {}
            Tool::Line => {
                target.stroke_line(
                    stroke.start,
                    point,
                    config.size,
                    config.color,
                    CompositeMode::SourceOver,
                );
            }
            Tool::Rectangle => {
                // Signed extent: dragging up/left draws in that direction.
                let extent = point - stroke.start;
                if config.fill_shape {
                    target.fill_rect(stroke.start, extent, config.color);
                } else {
                    target.stroke_rect(stroke.start, extent, config.size, config.color);
                }
            }
            Tool::Circle => {
                let radius = stroke.start.distance(point);
                if config.fill_shape {
                    target.fill_circle(stroke.start, radius, config.color);
                } else {
                    target.stroke_circle(stroke.start, radius, config.size, config.color);
                }
            }
            Tool::Text => {}
        }
        true
    }
}
