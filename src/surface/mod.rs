mod font;
mod pixmap;

pub use pixmap::PixmapSurface;

use egui::{Color32, Pos2, Rect, Vec2};
use futures::channel::oneshot;
use thiserror::Error;

/// Pixel-blend rule applied when painting onto a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Painted pixels replace or blend over the destination.
    SourceOver,
    /// Painted pixels erase the destination (alpha knock-out), ignoring color.
    DestinationOut,
}

/// Errors that can occur while capturing or restoring surface pixels
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to encode surface pixels: {0}")]
    Encode(String),

    #[error("failed to decode pixel snapshot: {0}")]
    Decode(String),
}

/// An immutable capture of full surface pixel content.
///
/// The pixel data is held in its encoded (PNG) form, the same shape it takes
/// inside a persisted drawing document. Restoring one onto a surface therefore
/// involves a decode step, which is why [`Surface::import_pixels`] signals
/// completion instead of returning synchronously.
#[derive(Debug, Clone)]
pub struct Snapshot {
    size: [usize; 2],
    png: Vec<u8>,
}

impl Snapshot {
    /// Wraps already-encoded PNG bytes, validating that they decode.
    pub fn from_png_bytes(png: Vec<u8>) -> Result<Self, SurfaceError> {
        let decoded = image::load_from_memory(&png)
            .map_err(|err| SurfaceError::Decode(err.to_string()))?;
        Ok(Self {
            size: [decoded.width() as usize, decoded.height() as usize],
            png,
        })
    }

    pub(crate) fn from_parts(size: [usize; 2], png: Vec<u8>) -> Self {
        Self { size, png }
    }

    /// Pixel dimensions of the captured surface.
    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    /// The encoded PNG payload.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }
}

/// Contract for a 2D raster surface with primitive draw operations.
///
/// The drawing core never touches pixels directly; everything goes through
/// this trait. [`PixmapSurface`] is the bundled software implementation, but
/// any raster backend with the same primitives can stand in.
pub trait Surface: Sized {
    /// Creates a surface of the given pixel dimensions, fully transparent.
    fn with_size(width: usize, height: usize) -> Self;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Bounds of the surface in its own pixel coordinates.
    fn bounds(&self) -> Rect {
        Rect::from_min_size(
            Pos2::ZERO,
            Vec2::new(self.width() as f32, self.height() as f32),
        )
    }

    /// Resets every pixel to fully transparent.
    fn clear(&mut self);

    /// Draws a round-capped line segment of the given width.
    fn stroke_line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32, mode: CompositeMode);

    /// Fills the axis-aligned rectangle spanned by `origin` and a signed
    /// `extent`. Negative extents grow left/up from the origin.
    fn fill_rect(&mut self, origin: Pos2, extent: Vec2, color: Color32);

    /// Outlines the axis-aligned rectangle spanned by `origin` and a signed
    /// `extent` with a border of the given width.
    fn stroke_rect(&mut self, origin: Pos2, extent: Vec2, width: f32, color: Color32);

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);

    fn stroke_circle(&mut self, center: Pos2, radius: f32, width: f32, color: Color32);

    /// Draws `text` with its baseline at `baseline`, scaled to roughly
    /// `font_px` pixels tall.
    fn draw_text(&mut self, text: &str, baseline: Pos2, font_px: f32, color: Color32);

    /// Paints another surface onto this one at the given pixel offset,
    /// blending source-over.
    fn blit(&mut self, src: &Self, x: i32, y: i32);

    /// Captures the full pixel content as an immutable snapshot.
    fn export_pixels(&self) -> Result<Snapshot, SurfaceError>;

    /// Restores previously captured pixels, replacing the current content.
    ///
    /// The restore involves a decode and is completion-signaled: the result
    /// arrives on `done` once the new pixels are actually in place. On failure
    /// the prior content is left untouched. Callers must not issue further
    /// draw operations against this surface until the signal fires.
    fn import_pixels(&mut self, snapshot: &Snapshot, done: oneshot::Sender<Result<(), SurfaceError>>);
}
