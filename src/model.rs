use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{SurfaceError, SurfaceResult};

// ── Color ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }

    pub fn to_egui(self) -> egui::Color32 {
        let [r, g, b, a] = self.to_rgba8();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn from_egui(c: egui::Color32) -> Self {
        let [r, g, b, a] = c.to_srgba_unmultiplied();
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }
}

impl Default for Color4 {
    fn default() -> Self {
        Self::BLACK
    }
}

// ── Drawing Mode / Style ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawingMode {
    #[default]
    Freehand,
    Line,
    Ellipse,
    Rectangle,
}

impl DrawingMode {
    pub const ALL: [DrawingMode; 4] = [
        DrawingMode::Freehand,
        DrawingMode::Line,
        DrawingMode::Rectangle,
        DrawingMode::Ellipse,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrawingMode::Freehand => "Freehand",
            DrawingMode::Line => "Line",
            DrawingMode::Ellipse => "Ellipse",
            DrawingMode::Rectangle => "Rectangle",
        }
    }
}

/// Color and width captured when a shape or ink stroke is started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color4,
    pub thickness: u32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color4::BLACK,
            thickness: 3,
        }
    }
}

// ── Shapes ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line {
        start: egui::Pos2,
        end: egui::Pos2,
        style: StrokeStyle,
    },
    Rectangle {
        bounds: egui::Rect,
        style: StrokeStyle,
    },
    Ellipse {
        bounds: egui::Rect,
        style: StrokeStyle,
    },
}

impl Shape {
    /// Degenerate shape anchored at `anchor`, or `None` for freehand mode.
    pub fn begin(mode: DrawingMode, anchor: egui::Pos2, style: StrokeStyle) -> Option<Self> {
        let bounds = egui::Rect::from_min_max(anchor, anchor);
        match mode {
            DrawingMode::Freehand => None,
            DrawingMode::Line => Some(Shape::Line {
                start: anchor,
                end: anchor,
                style,
            }),
            DrawingMode::Rectangle => Some(Shape::Rectangle { bounds, style }),
            DrawingMode::Ellipse => Some(Shape::Ellipse { bounds, style }),
        }
    }

    /// Reshape against the gesture anchor. Lines keep their first endpoint;
    /// boxed shapes take the axis-aligned box spanned by `anchor` and `pos`.
    pub fn drag_to(&mut self, anchor: egui::Pos2, pos: egui::Pos2) {
        match self {
            Shape::Line { end, .. } => *end = pos,
            Shape::Rectangle { bounds, .. } | Shape::Ellipse { bounds, .. } => {
                *bounds = egui::Rect::from_two_pos(anchor, pos);
            }
        }
    }

    pub fn style(&self) -> StrokeStyle {
        match self {
            Shape::Line { style, .. }
            | Shape::Rectangle { style, .. }
            | Shape::Ellipse { style, .. } => *style,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InkStroke {
    pub points: Vec<egui::Pos2>,
    pub style: StrokeStyle,
}

impl InkStroke {
    pub fn new(start: egui::Pos2, style: StrokeStyle) -> Self {
        Self {
            points: vec![start],
            style,
        }
    }

    pub fn extend_to(&mut self, pos: egui::Pos2) {
        if self.points.last() != Some(&pos) {
            self.points.push(pos);
        }
    }
}

// ── Background Image ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundImage {
    pixels: RgbaImage,
}

impl BackgroundImage {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl TryFrom<DynamicImage> for BackgroundImage {
    type Error = SurfaceError;

    fn try_from(image: DynamicImage) -> SurfaceResult<Self> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(SurfaceError::ImageBind { width, height });
        }
        Ok(Self {
            pixels: image.to_rgba8(),
        })
    }
}

/// One entry of the paint-ordered content list.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Image(BackgroundImage),
    Shape(Shape),
}
