use std::fmt;

use egui::{Color32, Pos2, Vec2};

use crate::surface::Surface;

/// Operations refused by the layer stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    /// Deleting the last remaining layer is refused.
    MinimumLayer,
    /// The layer index does not exist.
    OutOfBounds { index: usize, len: usize },
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinimumLayer => write!(f, "at least one layer must exist"),
            Self::OutOfBounds { index, len } => {
                write!(f, "layer index {index} out of bounds (len {len})")
            }
        }
    }
}

impl std::error::Error for LayerError {}

/// A single layer: an independently owned raster surface plus its metadata.
pub struct Layer<S> {
    /// Unique monotonic identifier within the owning stack.
    id: usize,
    /// Display name of the layer
    name: String,
    /// Whether the layer contributes to the composite
    visible: bool,
    surface: S,
}

impl<S: Surface> Layer<S> {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Resets the layer to its initial opaque white fill.
    pub fn clear_to_white(&mut self) {
        let size = Vec2::new(self.surface.width() as f32, self.surface.height() as f32);
        self.surface.clear();
        self.surface.fill_rect(Pos2::ZERO, size, Color32::WHITE);
    }
}

/// Ordered stack of layers in bottom-to-top paint order with an active-layer
/// pointer. At least one layer exists at all times.
pub struct LayerStack<S> {
    layers: Vec<Layer<S>>,
    active: usize,
    next_id: usize,
    width: usize,
    height: usize,
}

impl<S: Surface> LayerStack<S> {
    /// Creates a stack holding a single opaque white base layer sized to the
    /// display surface.
    pub fn new(width: usize, height: usize) -> Self {
        let mut stack = Self {
            layers: Vec::new(),
            active: 0,
            next_id: 1,
            width,
            height,
        };
        let base = stack.make_layer();
        stack.layers.push(base);
        stack
    }

    fn make_layer(&mut self) -> Layer<S> {
        let id = self.next_id;
        self.next_id += 1;
        let mut layer = Layer {
            id,
            name: format!("Layer {id}"),
            visible: true,
            surface: S::with_size(self.width, self.height),
        };
        layer.clear_to_white();
        layer
    }

    /// Appends a new white layer on top and makes it active. Always succeeds;
    /// returns the new layer's index.
    pub fn add_layer(&mut self) -> usize {
        let layer = self.make_layer();
        log::info!("Added {}", layer.name);
        self.layers.push(layer);
        self.active = self.layers.len() - 1;
        self.active
    }

    /// Removes the active layer. Refused when only one layer remains; the
    /// active index clamps onto the remaining layers.
    pub fn delete_active(&mut self) -> Result<(), LayerError> {
        if self.layers.len() <= 1 {
            return Err(LayerError::MinimumLayer);
        }
        let removed = self.layers.remove(self.active);
        self.active = self.active.min(self.layers.len() - 1);
        log::info!("Deleted {}", removed.name);
        Ok(())
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), LayerError> {
        if index >= self.layers.len() {
            return Err(LayerError::OutOfBounds {
                index,
                len: self.layers.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    /// Flips a layer's visibility flag; layer order, pixel content and the
    /// active index are untouched. Returns the new flag.
    pub fn toggle_visibility(&mut self, index: usize) -> Result<bool, LayerError> {
        let len = self.layers.len();
        let layer = self
            .layers
            .get_mut(index)
            .ok_or(LayerError::OutOfBounds { index, len })?;
        layer.visible = !layer.visible;
        log::info!(
            "{} is now {}",
            layer.name,
            if layer.visible { "visible" } else { "hidden" }
        );
        Ok(layer.visible)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn layers(&self) -> &[Layer<S>] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer<S>> {
        self.layers.get(index)
    }

    pub fn active_layer(&self) -> &Layer<S> {
        &self.layers[self.active]
    }

    pub fn active_layer_mut(&mut self) -> &mut Layer<S> {
        &mut self.layers[self.active]
    }

    /// Rebuilds the display surface: clears it, then blits every visible
    /// layer in bottom-to-top order. Invisible layers are skipped entirely.
    pub fn composite_onto(&self, display: &mut S) {
        display.clear();
        for layer in &self.layers {
            if layer.visible {
                display.blit(layer.surface(), 0, 0);
            }
        }
    }
}
