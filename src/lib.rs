#![warn(clippy::all, rust_2018_idioms)]

pub mod editor;
pub mod history;
pub mod input;
pub mod layer;
pub mod persistence;
pub mod stroke;
pub mod surface;
pub mod tool;

pub use editor::{EditError, PaintEditor};
pub use history::History;
pub use input::{EditorAction, KeyInput, PointerEvent, PointerPhase};
pub use layer::{Layer, LayerError, LayerStack};
pub use persistence::SavedDrawing;
pub use stroke::StrokeEngine;
pub use surface::{CompositeMode, PixmapSurface, Snapshot, Surface};
pub use tool::{Tool, ToolConfig};
