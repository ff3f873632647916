//! Software rasterizer used for export.
//!
//! Walks the element list and ink strokes in paint order onto an off-screen
//! [`RgbaImage`]. The view transform never reaches this module, so output only
//! depends on stored surface-local geometry.

use std::io::Write;

use egui::{Pos2, Rect};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageResult, Rgba, RgbaImage};

use crate::model::{Element, InkStroke, Shape, StrokeStyle};

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Flatten everything into a `width` x `height` bitmap.
pub fn rasterize(width: u32, height: u32, elements: &[Element], strokes: &[InkStroke]) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    for element in elements {
        match element {
            Element::Image(background) => {
                image::imageops::overlay(&mut img, background.pixels(), 0, 0);
            }
            Element::Shape(shape) => draw_shape(&mut img, shape),
        }
    }
    for stroke in strokes {
        draw_polyline(&mut img, &stroke.points, stroke.style);
    }
    img
}

/// JPEG-encode `img` into `writer`. Alpha is dropped; the export background is opaque.
pub fn encode_jpeg<W: Write>(img: &RgbaImage, quality: u8, writer: W) -> ImageResult<()> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder.encode_image(&rgb)
}

fn draw_shape(img: &mut RgbaImage, shape: &Shape) {
    match shape {
        Shape::Line { start, end, style } => draw_line(img, *start, *end, *style),
        Shape::Rectangle { bounds, style } => draw_rect_outline(img, *bounds, *style),
        Shape::Ellipse { bounds, style } => {
            let points = ellipse_points(*bounds);
            draw_polyline(img, &points, *style);
        }
    }
}

/// Closed polyline approximating the ellipse inscribed in `bounds`.
/// The first point is repeated at the end.
pub fn ellipse_points(bounds: Rect) -> Vec<Pos2> {
    let center = bounds.center();
    let rx = bounds.width() * 0.5;
    let ry = bounds.height() * 0.5;
    if rx <= 0.0 && ry <= 0.0 {
        return vec![center];
    }

    let circumference = std::f32::consts::TAU * rx.max(ry);
    let steps = circumference.max(12.0) as usize;
    (0..=steps)
        .map(|step| {
            let t = (step as f32 / steps as f32) * std::f32::consts::TAU;
            Pos2::new(center.x + rx * t.cos(), center.y + ry * t.sin())
        })
        .collect()
}

fn draw_polyline(img: &mut RgbaImage, points: &[Pos2], style: StrokeStyle) {
    let radius = stroke_radius(style);
    let Some(mut coverage) = Coverage::new(img, points, radius) else {
        return;
    };
    match points {
        [single] => coverage.stamp_segment(*single, *single, radius),
        _ => {
            for pair in points.windows(2) {
                if let [a, b] = pair {
                    coverage.stamp_segment(*a, *b, radius);
                }
            }
        }
    }
    coverage.blend_into(img, style.color.to_rgba8());
}

fn draw_rect_outline(img: &mut RgbaImage, rect: Rect, style: StrokeStyle) {
    let (min, max) = (rect.min, rect.max);
    let corners = [
        Pos2::new(min.x, min.y),
        Pos2::new(max.x, min.y),
        Pos2::new(max.x, max.y),
        Pos2::new(min.x, max.y),
        Pos2::new(min.x, min.y),
    ];
    draw_polyline(img, &corners, style);
}

fn draw_line(img: &mut RgbaImage, start: Pos2, end: Pos2, style: StrokeStyle) {
    draw_polyline(img, &[start, end], style);
}

fn stroke_radius(style: StrokeStyle) -> f32 {
    (style.thickness as f32 / 2.0).max(0.5)
}

/// Pixels stamped by one polyline, kept as a bitmask over the part of its
/// bounding box that lies on the image. Every covered pixel is blended once,
/// however many discs or segments overlap it.
struct Coverage {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    mask: Vec<bool>,
}

impl Coverage {
    fn new(img: &RgbaImage, points: &[Pos2], radius: f32) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        if img.width() == 0 || img.height() == 0 {
            return None;
        }
        let (lo, hi) = rest
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));

        let x0 = (lo.x - radius).floor().max(0.0);
        let y0 = (lo.y - radius).floor().max(0.0);
        let x1 = (hi.x + radius).ceil().min((img.width() - 1) as f32);
        let y1 = (hi.y + radius).ceil().min((img.height() - 1) as f32);
        if x0 > x1 || y0 > y1 {
            return None;
        }

        let (x0, y0, x1, y1) = (x0 as u32, y0 as u32, x1 as u32, y1 as u32);
        let width = x1 - x0 + 1;
        let height = y1 - y0 + 1;
        Some(Self {
            x0,
            y0,
            width,
            height,
            mask: vec![false; width as usize * height as usize],
        })
    }

    /// Stamp discs along `start..end`, one per pixel step, skipping the
    /// stretch that cannot reach the mask.
    fn stamp_segment(&mut self, start: Pos2, end: Pos2, radius: f32) {
        let delta = end - start;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);

        let slack = radius + 1.0;
        let lo = Pos2::new(self.x0 as f32 - slack, self.y0 as f32 - slack);
        let hi = Pos2::new(
            (self.x0 + self.width) as f32 + slack,
            (self.y0 + self.height) as f32 + slack,
        );
        let Some((t0, t1)) = visible_span(start, end, lo, hi) else {
            return;
        };

        let first = (t0 * steps).floor().max(0.0) as u64;
        let last = (t1 * steps).ceil().min(steps) as u64;
        for i in first..=last {
            let t = i as f32 / steps;
            self.stamp_disc(start + delta * t, radius);
        }
    }

    fn stamp_disc(&mut self, center: Pos2, radius: f32) {
        let radius_sq = radius * radius;
        let min_x = ((center.x - radius).floor() as i64).max(self.x0 as i64);
        let max_x = ((center.x + radius).ceil() as i64).min((self.x0 + self.width - 1) as i64);
        let min_y = ((center.y - radius).floor() as i64).max(self.y0 as i64);
        let max_y = ((center.y + radius).ceil() as i64).min((self.y0 + self.height - 1) as i64);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius_sq {
                    let row = (y - self.y0 as i64) as usize;
                    let col = (x - self.x0 as i64) as usize;
                    self.mask[row * self.width as usize + col] = true;
                }
            }
        }
    }

    fn blend_into(self, img: &mut RgbaImage, color: [u8; 4]) {
        let width = self.width as usize;
        for (i, _) in self.mask.iter().enumerate().filter(|(_, hit)| **hit) {
            let x = self.x0 + (i % width) as u32;
            let y = self.y0 + (i / width) as u32;
            blend_pixel(img, x, y, color);
        }
    }
}

/// Parameter range of `start..end` inside the box `lo..hi`, if any.
fn visible_span(start: Pos2, end: Pos2, lo: Pos2, hi: Pos2) -> Option<(f32, f32)> {
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    for (from, to, min, max) in [(start.x, end.x, lo.x, hi.x), (start.y, end.y, lo.y, hi.y)] {
        let d = to - from;
        if d == 0.0 {
            if from < min || from > max {
                return None;
            }
            continue;
        }
        let (a, b) = ((min - from) / d, (max - from) / d);
        t0 = t0.max(a.min(b));
        t1 = t1.min(a.max(b));
    }
    (t0 <= t1).then_some((t0, t1))
}

fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: [u8; 4]) {
    let [r, g, b, a] = color;
    if a == 0 {
        return;
    }
    let dst = img.get_pixel(x, y).0;
    let src_a = a as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let blend = |src: u8, dst: u8| {
        let src_f = src as f32 / 255.0;
        let dst_f = dst as f32 / 255.0;
        ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    img.put_pixel(
        x,
        y,
        Rgba([
            blend(r, dst[0]),
            blend(g, dst[1]),
            blend(b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]),
    );
}
