//! The drawing surface: content list, style state and the pointer-gesture
//! state machine.

use std::fs;
use std::path::Path;

use egui::{PointerButton, Pos2, Vec2};
use image::{DynamicImage, RgbaImage};

use crate::config::SurfaceConfig;
use crate::error::{SurfaceError, SurfaceResult};
use crate::model::{
    BackgroundImage, Color4, DrawingMode, Element, InkStroke, Shape, StrokeStyle,
};
use crate::render;

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    /// `index` points at the in-progress shape inside `elements`.
    Shaping { anchor: Pos2, index: usize },
    Inking { anchor: Pos2, stroke: InkStroke },
}

#[derive(Clone, Debug)]
pub struct Surface {
    mode: DrawingMode,
    style: StrokeStyle,
    zoom: f32,
    width: u32,
    height: u32,
    jpeg_quality: u8,

    elements: Vec<Element>,
    strokes: Vec<InkStroke>,
    gesture: Gesture,
}

impl Default for Surface {
    fn default() -> Self {
        Self::with_config(&SurfaceConfig::default())
    }
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a surface from an already validated configuration.
    pub fn with_config(config: &SurfaceConfig) -> Self {
        Self {
            mode: config.mode,
            style: StrokeStyle {
                color: config.color,
                thickness: config.thickness.max(1),
            },
            zoom: config.zoom,
            width: config.width,
            height: config.height,
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
            elements: Vec::new(),
            strokes: Vec::new(),
            gesture: Gesture::Idle,
        }
    }

    // ── Mode & Style ────────────────────────────────────────────────────────

    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    /// Switch the drawing mode. A gesture still in flight is cancelled and its
    /// partial shape or ink stroke discarded.
    pub fn set_mode(&mut self, mode: DrawingMode) {
        if mode == self.mode {
            return;
        }
        self.cancel_gesture();
        tracing::debug!(from = ?self.mode, to = ?mode, "drawing mode changed");
        self.mode = mode;
    }

    /// True when pointer input is captured as ink rather than shapes.
    pub fn ink_capture_enabled(&self) -> bool {
        self.mode == DrawingMode::Freehand
    }

    pub fn stroke_color(&self) -> Color4 {
        self.style.color
    }

    pub fn set_stroke_color(&mut self, color: Color4) {
        self.style.color = color;
    }

    pub fn stroke_thickness(&self) -> u32 {
        self.style.thickness
    }

    pub fn set_stroke_thickness(&mut self, thickness: u32) -> SurfaceResult<()> {
        if thickness == 0 {
            return Err(SurfaceError::InvalidThickness(thickness));
        }
        self.style.thickness = thickness;
        Ok(())
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) -> SurfaceResult<()> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(SurfaceError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(())
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    // ── Content Queries ─────────────────────────────────────────────────────

    /// Nominal surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn ink_strokes(&self) -> &[InkStroke] {
        &self.strokes
    }

    pub fn has_image(&self) -> bool {
        self.background().is_some()
    }

    pub fn background(&self) -> Option<&BackgroundImage> {
        match self.elements.first() {
            Some(Element::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn drag_anchor(&self) -> Option<Pos2> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Shaping { anchor, .. } | Gesture::Inking { anchor, .. } => Some(*anchor),
        }
    }

    pub fn in_progress_shape(&self) -> Option<&Shape> {
        let Gesture::Shaping { index, .. } = self.gesture else {
            return None;
        };
        match self.elements.get(index) {
            Some(Element::Shape(shape)) => Some(shape),
            _ => None,
        }
    }

    /// Ink stroke being captured by the current freehand gesture.
    pub fn in_progress_stroke(&self) -> Option<&InkStroke> {
        match &self.gesture {
            Gesture::Inking { stroke, .. } => Some(stroke),
            _ => None,
        }
    }

    // ── Pointer Gestures ────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, pos: Pos2, button: PointerButton) {
        if button != PointerButton::Primary || self.is_dragging() {
            return;
        }

        self.gesture = match Shape::begin(self.mode, pos, self.style) {
            Some(shape) => {
                self.elements.push(Element::Shape(shape));
                Gesture::Shaping {
                    anchor: pos,
                    index: self.elements.len() - 1,
                }
            }
            None => Gesture::Inking {
                anchor: pos,
                stroke: InkStroke::new(pos, self.style),
            },
        };
    }

    pub fn pointer_move(&mut self, pos: Pos2, primary_held: bool) {
        if !primary_held {
            return;
        }
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Shaping { anchor, index } => {
                if let Some(Element::Shape(shape)) = self.elements.get_mut(*index) {
                    shape.drag_to(*anchor, pos);
                }
            }
            Gesture::Inking { stroke, .. } => stroke.extend_to(pos),
        }
    }

    /// Commit the active gesture. Geometry stays at the last move position.
    pub fn pointer_up(&mut self, _pos: Pos2, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Shaping { index, .. } => {
                tracing::debug!(index, mode = ?self.mode, "shape committed");
            }
            Gesture::Inking { stroke, .. } => {
                tracing::debug!(points = stroke.points.len(), "ink stroke committed");
                self.strokes.push(stroke);
            }
        }
    }

    fn cancel_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Shaping { index, .. } => {
                if index < self.elements.len() {
                    self.elements.remove(index);
                }
                tracing::debug!("in-progress shape discarded");
            }
            Gesture::Inking { .. } => {
                tracing::debug!("in-progress ink stroke discarded");
            }
        }
    }

    // ── Image Loading / Clearing ────────────────────────────────────────────

    /// Decode `path` and make it the background. Nothing changes on failure.
    pub fn set_image_from_path(&mut self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| SurfaceError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_image(image)?;
        tracing::info!(path = %path.display(), "image loaded");
        Ok(())
    }

    /// Replace all content with `image`, resizing the surface to match it.
    pub fn set_image(&mut self, image: DynamicImage) -> SurfaceResult<()> {
        let background = BackgroundImage::try_from(image)?;

        self.clean();
        self.width = background.width();
        self.height = background.height();
        self.elements.push(Element::Image(background));
        Ok(())
    }

    /// Remove every element and ink stroke. The surface keeps its size.
    pub fn clean(&mut self) {
        self.gesture = Gesture::Idle;
        self.elements.clear();
        self.strokes.clear();
    }

    // ── Flatten / Export ────────────────────────────────────────────────────

    /// Rasterize the visible content at the surface's natural size.
    pub fn export_bitmap(&self) -> RgbaImage {
        render::rasterize(self.width, self.height, &self.elements, &self.strokes)
    }

    /// Export and write a JPEG to `path`, replacing any existing file.
    /// The file is only touched once encoding has succeeded.
    pub fn save(&self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        let bitmap = self.export_bitmap();

        let mut encoded = Vec::new();
        render::encode_jpeg(&bitmap, self.jpeg_quality, &mut encoded).map_err(|source| {
            SurfaceError::Encode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, &encoded).map_err(|source| SurfaceError::ExportIo {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), width = self.width, height = self.height, "surface saved");
        Ok(())
    }
}
