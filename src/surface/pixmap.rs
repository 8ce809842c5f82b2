use std::io::Cursor;

use egui::{Color32, ColorImage, Pos2, Vec2};
use futures::channel::oneshot;
use image::{ImageFormat, RgbaImage};

use super::font;
use super::{CompositeMode, Snapshot, Surface, SurfaceError};

/// Software raster surface backed by an in-memory RGBA buffer.
///
/// All primitives are rasterized on the CPU with hard edges; pixel membership
/// is decided by the pixel center. Snapshots are PNG-encoded, so exports and
/// imports go through the same codec as persisted drawing documents.
pub struct PixmapSurface {
    image: ColorImage,
}

impl PixmapSurface {
    /// Pixel at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.image.pixels[y * self.width() + x])
    }

    fn paint(&mut self, x: i32, y: i32, color: Color32, mode: CompositeMode) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width() || y >= self.height() {
            return;
        }
        let idx = y * self.width() + x;
        let dst = self.image.pixels[idx];
        self.image.pixels[idx] = match mode {
            CompositeMode::SourceOver => blend_over(color, dst),
            CompositeMode::DestinationOut => erase(color.a(), dst),
        };
    }

    /// Paints every pixel whose center satisfies `covered` within the given
    /// bounding box (inclusive-exclusive, pre-clamped to the surface).
    fn paint_region<F>(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color32, mode: CompositeMode, covered: F)
    where
        F: Fn(f32, f32) -> bool,
    {
        let xs = (x0.floor().max(0.0)) as i32;
        let ys = (y0.floor().max(0.0)) as i32;
        let xe = (x1.ceil().min(self.width() as f32)) as i32;
        let ye = (y1.ceil().min(self.height() as f32)) as i32;
        for y in ys..ye {
            for x in xs..xe {
                if covered(x as f32 + 0.5, y as f32 + 0.5) {
                    self.paint(x, y, color, mode);
                }
            }
        }
    }
}

impl Surface for PixmapSurface {
    fn with_size(width: usize, height: usize) -> Self {
        Self {
            image: ColorImage::new([width, height], Color32::TRANSPARENT),
        }
    }

    fn width(&self) -> usize {
        self.image.size[0]
    }

    fn height(&self) -> usize {
        self.image.size[1]
    }

    fn clear(&mut self) {
        self.image.pixels.fill(Color32::TRANSPARENT);
    }

    fn stroke_line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32, mode: CompositeMode) {
        // Round caps: the painted area is a capsule of radius width/2.
        let r = (width * 0.5).max(0.5);
        let x0 = from.x.min(to.x) - r;
        let y0 = from.y.min(to.y) - r;
        let x1 = from.x.max(to.x) + r;
        let y1 = from.y.max(to.y) + r;
        let r_sq = r * r;
        self.paint_region(x0, y0, x1, y1, color, mode, |px, py| {
            dist_sq_to_segment(Pos2::new(px, py), from, to) <= r_sq
        });
    }

    fn fill_rect(&mut self, origin: Pos2, extent: Vec2, color: Color32) {
        let (x0, x1) = ordered(origin.x, origin.x + extent.x);
        let (y0, y1) = ordered(origin.y, origin.y + extent.y);
        self.paint_region(x0, y0, x1, y1, color, CompositeMode::SourceOver, |px, py| {
            px >= x0 && px < x1 && py >= y0 && py < y1
        });
    }

    fn stroke_rect(&mut self, origin: Pos2, extent: Vec2, width: f32, color: Color32) {
        let (x0, x1) = ordered(origin.x, origin.x + extent.x);
        let (y0, y1) = ordered(origin.y, origin.y + extent.y);
        let hw = (width * 0.5).max(0.5);
        // Border band: inside the outer rectangle but not the inner one.
        self.paint_region(
            x0 - hw,
            y0 - hw,
            x1 + hw,
            y1 + hw,
            color,
            CompositeMode::SourceOver,
            |px, py| {
                let in_outer = px >= x0 - hw && px < x1 + hw && py >= y0 - hw && py < y1 + hw;
                let in_inner = px >= x0 + hw && px < x1 - hw && py >= y0 + hw && py < y1 - hw;
                in_outer && !in_inner
            },
        );
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let r = radius.max(0.0);
        let r_sq = r * r;
        self.paint_region(
            center.x - r,
            center.y - r,
            center.x + r,
            center.y + r,
            color,
            CompositeMode::SourceOver,
            |px, py| {
                let (dx, dy) = (px - center.x, py - center.y);
                dx * dx + dy * dy <= r_sq
            },
        );
    }

    fn stroke_circle(&mut self, center: Pos2, radius: f32, width: f32, color: Color32) {
        let r = radius.max(0.0);
        let hw = (width * 0.5).max(0.5);
        self.paint_region(
            center.x - r - hw,
            center.y - r - hw,
            center.x + r + hw,
            center.y + r + hw,
            color,
            CompositeMode::SourceOver,
            |px, py| {
                let (dx, dy) = (px - center.x, py - center.y);
                ((dx * dx + dy * dy).sqrt() - r).abs() <= hw
            },
        );
    }

    fn draw_text(&mut self, text: &str, baseline: Pos2, font_px: f32, color: Color32) {
        let scale = ((font_px / font::GLYPH_HEIGHT as f32).round() as i32).max(1);
        let top = baseline.y as i32 - font::GLYPH_HEIGHT as i32 * scale;
        let mut pen_x = baseline.x as i32;
        for ch in text.chars() {
            if let Some(rows) = font::glyph(ch) {
                for (ry, row) in rows.iter().enumerate() {
                    for rx in 0..font::GLYPH_WIDTH {
                        if row & (1 << (font::GLYPH_WIDTH - 1 - rx)) == 0 {
                            continue;
                        }
                        // Each font cell becomes a scale x scale block.
                        let bx = pen_x + rx as i32 * scale;
                        let by = top + ry as i32 * scale;
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.paint(bx + dx, by + dy, color, CompositeMode::SourceOver);
                            }
                        }
                    }
                }
            }
            pen_x += font::GLYPH_ADVANCE as i32 * scale;
        }
    }

    fn blit(&mut self, src: &Self, x: i32, y: i32) {
        for sy in 0..src.height() {
            for sx in 0..src.width() {
                let px = src.image.pixels[sy * src.width() + sx];
                if px.a() == 0 {
                    continue;
                }
                self.paint(x + sx as i32, y + sy as i32, px, CompositeMode::SourceOver);
            }
        }
    }

    fn export_pixels(&self) -> Result<Snapshot, SurfaceError> {
        let mut bytes = Vec::with_capacity(self.width() * self.height() * 4);
        for px in &self.image.pixels {
            bytes.extend_from_slice(&px.to_srgba_unmultiplied());
        }
        let raw = RgbaImage::from_raw(self.width() as u32, self.height() as u32, bytes)
            .ok_or_else(|| SurfaceError::Encode("pixel buffer size mismatch".to_owned()))?;
        let mut png = Vec::new();
        raw.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|err| SurfaceError::Encode(err.to_string()))?;
        Ok(Snapshot::from_parts([self.width(), self.height()], png))
    }

    fn import_pixels(&mut self, snapshot: &Snapshot, done: oneshot::Sender<Result<(), SurfaceError>>) {
        // Decode fully before touching the buffer; a bad snapshot must leave
        // the current content intact.
        let decoded = match image::load_from_memory(snapshot.png_bytes()) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(err) => {
                let _ = done.send(Err(SurfaceError::Decode(err.to_string())));
                return;
            }
        };
        self.clear();
        let w = (decoded.width() as usize).min(self.width());
        let h = (decoded.height() as usize).min(self.height());
        for y in 0..h {
            for x in 0..w {
                let p = decoded.get_pixel(x as u32, y as u32).0;
                let idx = y * self.width() + x;
                self.image.pixels[idx] = Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]);
            }
        }
        let _ = done.send(Ok(()));
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn dist_sq_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return (p - a).length_sq();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let nearest = a + ab * t;
    (p - nearest).length_sq()
}

/// Source-over blend of premultiplied colors.
fn blend_over(src: Color32, dst: Color32) -> Color32 {
    let a = src.a() as u32;
    if a == 255 {
        return src;
    }
    if a == 0 {
        return dst;
    }
    let inv = 255 - a;
    let lerp = |s: u8, d: u8| (s as u32 + (d as u32 * inv + 127) / 255) as u8;
    Color32::from_rgba_premultiplied(
        lerp(src.r(), dst.r()),
        lerp(src.g(), dst.g()),
        lerp(src.b(), dst.b()),
        lerp(src.a(), dst.a()),
    )
}

/// Destination-out: scales the destination by the inverse source alpha.
fn erase(src_alpha: u8, dst: Color32) -> Color32 {
    let keep = 255 - src_alpha as u32;
    if keep == 0 {
        return Color32::TRANSPARENT;
    }
    let scale = |c: u8| ((c as u32 * keep + 127) / 255) as u8;
    Color32::from_rgba_premultiplied(scale(dst.r()), scale(dst.g()), scale(dst.b()), scale(dst.a()))
}
