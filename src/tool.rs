use egui::Color32;

/// Smallest and largest accepted stroke width; out-of-range values clamp.
pub const MIN_STROKE_SIZE: f32 = 1.0;
pub const MAX_STROKE_SIZE: f32 = 50.0;

/// Ratio between the configured stroke size and the text font pixel size.
const FONT_SCALE: f32 = 3.0;

/// Selectable drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Brush,
    Eraser,
    Line,
    Rectangle,
    Circle,
    Text,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
            Tool::Line => "line",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Text => "text",
        }
    }

    /// Brush and eraser mutate the surface on every pointer move; shape tools
    /// commit a single primitive when the stroke ends.
    pub fn is_freehand(self) -> bool {
        matches!(self, Tool::Brush | Tool::Eraser)
    }
}

/// Active tool configuration, owned by the editor and mutated by the host UI.
///
/// A stroke captures the configuration by value when it begins; later changes
/// do not affect a stroke already in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolConfig {
    pub tool: Tool,
    pub color: Color32,
    pub size: f32,
    pub fill_shape: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            color: Color32::BLACK,
            size: 5.0,
            fill_shape: false,
        }
    }
}

impl ToolConfig {
    /// Sets the stroke size, clamping nonsensical values instead of rejecting.
    pub fn set_size(&mut self, size: f32) {
        if size.is_finite() {
            self.size = size.clamp(MIN_STROKE_SIZE, MAX_STROKE_SIZE);
        } else {
            log::warn!("Ignoring non-finite stroke size {size}");
        }
    }

    /// Sets the color from an `#rrggbb` hex string, falling back to black on
    /// malformed input.
    pub fn set_color_hex(&mut self, hex: &str) {
        self.color = match parse_hex_color(hex) {
            Some(color) => color,
            None => {
                log::warn!("Malformed color {hex:?}, defaulting to black");
                Color32::BLACK
            }
        };
    }

    /// Font pixel size used by the text tool.
    pub fn font_px(&self) -> f32 {
        self.size * FONT_SCALE
    }
}

/// Parses `#rrggbb` (leading `#` optional) into an opaque color.
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}
