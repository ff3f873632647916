use std::path::{Path, PathBuf};

use eframe::egui;

use crate::model::{Color4, DrawingMode, Element, InkStroke, Shape};
use crate::render::ellipse_points;
use crate::surface::Surface;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

// ── App ─────────────────────────────────────────────────────────────────────

pub struct PaintApp {
    surface: Surface,
    texture: Option<egui::TextureHandle>,
    last_dir: Option<PathBuf>,

    // user-visible failure from the last open/save
    error: Option<String>,

    // pan (view only; zoom lives on the surface)
    pan: egui::Vec2,
    panning: bool,
}

impl PaintApp {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            texture: None,
            last_dir: None,
            error: None,
            pan: egui::Vec2::ZERO,
            panning: false,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Load `path` as the background, reporting failures in the error window.
    pub fn open_path(&mut self, path: &Path) {
        match self.surface.set_image_from_path(path) {
            Ok(()) => {
                self.texture = None;
                self.pan = egui::Vec2::ZERO;
                self.last_dir = path.parent().map(Path::to_path_buf);
            }
            Err(err) => self.report(err.to_string()),
        }
    }

    pub fn save_path(&mut self, path: &Path) {
        if let Err(err) = self.surface.save(path) {
            self.report(err.to_string());
        }
    }

    fn clean(&mut self) {
        self.surface.clean();
        self.texture = None;
    }

    fn report(&mut self, message: String) {
        tracing::error!("{message}");
        self.error = Some(message);
    }

    fn open_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.open_path(&path);
        }
    }

    fn save_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name("annotated.jpg");
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.save_file() {
            self.save_path(&path);
        }
    }

    /// Convert surface-space coords to screen-space
    fn surface_to_screen(&self, canvas_rect: egui::Rect, pos: egui::Pos2) -> egui::Pos2 {
        let center = canvas_rect.center();
        center + self.pan + (pos.to_vec2() - self.surface.size_vec2() * 0.5) * self.surface.zoom()
    }

    /// Convert screen-space coords to surface-space
    fn screen_to_surface(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> egui::Pos2 {
        let rel = screen_pos - canvas_rect.center() - self.pan;
        (rel / self.surface.zoom() + self.surface.size_vec2() * 0.5).to_pos2()
    }

    fn surface_rect_on_screen(&self, canvas_rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.surface_to_screen(canvas_rect, egui::Pos2::ZERO),
            self.surface_to_screen(canvas_rect, self.surface.size_vec2().to_pos2()),
        )
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(background) = self.surface.background() {
            let rgba = background.pixels();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image =
                egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
            self.texture = Some(ctx.load_texture("background", color_image, egui::TextureOptions::LINEAR));
        }
    }

    fn draw_content(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let zoom = self.surface.zoom();
        for element in self.surface.elements() {
            match element {
                Element::Image(background) => {
                    if let Some(tex) = &self.texture {
                        let size = egui::vec2(background.width() as f32, background.height() as f32);
                        let rect = egui::Rect::from_min_max(
                            self.surface_to_screen(canvas_rect, egui::Pos2::ZERO),
                            self.surface_to_screen(canvas_rect, size.to_pos2()),
                        );
                        painter.image(
                            tex.id(),
                            rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                }
                Element::Shape(shape) => self.draw_shape(painter, canvas_rect, shape, zoom),
            }
        }
        for stroke in self.surface.ink_strokes() {
            self.draw_ink(painter, canvas_rect, stroke, zoom);
        }
        if let Some(stroke) = self.surface.in_progress_stroke() {
            self.draw_ink(painter, canvas_rect, stroke, zoom);
        }
    }

    fn draw_shape(&self, painter: &egui::Painter, canvas_rect: egui::Rect, shape: &Shape, zoom: f32) {
        let style = shape.style();
        let stroke = egui::Stroke::new(style.thickness as f32 * zoom, style.color.to_egui());
        match shape {
            Shape::Line { start, end, .. } => {
                let s = self.surface_to_screen(canvas_rect, *start);
                let e = self.surface_to_screen(canvas_rect, *end);
                painter.line_segment([s, e], stroke);
            }
            Shape::Rectangle { bounds, .. } => {
                let rect = egui::Rect::from_two_pos(
                    self.surface_to_screen(canvas_rect, bounds.min),
                    self.surface_to_screen(canvas_rect, bounds.max),
                );
                painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Middle);
            }
            Shape::Ellipse { bounds, .. } => {
                let points: Vec<_> = ellipse_points(*bounds)
                    .into_iter()
                    .map(|p| self.surface_to_screen(canvas_rect, p))
                    .collect();
                self.draw_polyline(painter, points, stroke);
            }
        }
    }

    fn draw_ink(&self, painter: &egui::Painter, canvas_rect: egui::Rect, ink: &InkStroke, zoom: f32) {
        let stroke = egui::Stroke::new(ink.style.thickness as f32 * zoom, ink.style.color.to_egui());
        let points = ink
            .points
            .iter()
            .map(|p| self.surface_to_screen(canvas_rect, *p))
            .collect();
        self.draw_polyline(painter, points, stroke);
    }

    fn draw_polyline(&self, painter: &egui::Painter, points: Vec<egui::Pos2>, stroke: egui::Stroke) {
        match points.as_slice() {
            [] => {}
            [dot] => {
                painter.circle_filled(*dot, (stroke.width * 0.5).max(0.5), stroke.color);
            }
            _ => {
                painter.add(egui::Shape::line(points, stroke));
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut mode = self.surface.mode();
            for candidate in DrawingMode::ALL {
                ui.selectable_value(&mut mode, candidate, candidate.label());
            }
            self.surface.set_mode(mode);

            ui.separator();
            ui.label("Color:");
            let color = self.surface.stroke_color();
            let mut rgb = [color.r, color.g, color.b];
            if ui.color_edit_button_rgb(&mut rgb).changed() {
                self.surface
                    .set_stroke_color(Color4::rgba(rgb[0], rgb[1], rgb[2], color.a));
            }

            ui.separator();
            ui.label("Thickness:");
            let mut thickness = self.surface.stroke_thickness();
            if ui.add(egui::Slider::new(&mut thickness, 1..=40)).changed() {
                if let Err(err) = self.surface.set_stroke_thickness(thickness) {
                    tracing::warn!(error = %err, "thickness rejected");
                }
            }

            ui.separator();
            ui.label("Zoom:");
            let mut zoom = self.surface.zoom();
            let slider = egui::Slider::new(&mut zoom, 0.1..=10.0)
                .logarithmic(true)
                .custom_formatter(|z, _| format!("{:.0}%", z * 100.0));
            if ui.add(slider).changed() {
                if let Err(err) = self.surface.set_zoom(zoom) {
                    tracing::warn!(error = %err, "zoom rejected");
                }
            }

            ui.separator();
            if ui.button("Open…").clicked() {
                self.open_dialog();
            }
            if ui.button("Clean").clicked() {
                self.clean();
            }
            if ui.button("Save…").clicked() {
                self.save_dialog();
            }

            ui.separator();
            let (w, h) = self.surface.size();
            ui.label(format!("{w}×{h}"));
        });
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.error = None;
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response, canvas_rect: egui::Rect) {
        // Handle pan (middle mouse button)
        let middle_down = ctx.input(|i| i.pointer.middle_down());
        if middle_down {
            self.pan += ctx.input(|i| i.pointer.delta());
            self.panning = true;
        } else {
            self.panning = false;
        }

        // Handle zoom (scroll wheel), keeping the point under the cursor fixed
        let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta != 0.0 && response.hovered() {
            let zoom = self.surface.zoom();
            let new_zoom = (zoom * (1.0 + scroll_delta * 0.002)).clamp(0.1, 10.0);
            if let Some(cursor) = response.hover_pos() {
                let cursor_rel = cursor - canvas_rect.center() - self.pan;
                self.pan -= cursor_rel * (new_zoom / zoom - 1.0);
            }
            if let Err(err) = self.surface.set_zoom(new_zoom) {
                tracing::warn!(error = %err, "zoom rejected");
            }
        }

        let (pressed, released, held, latest) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.latest_pos(),
            )
        });
        let pos = latest.map(|p| self.screen_to_surface(canvas_rect, p));
        self.route_primary(PrimaryInput {
            pos,
            pressed,
            released,
            held,
            hovered: response.hovered(),
        });
    }

    /// Feed one frame of primary-button state to the surface. Presses and
    /// moves are dropped while panning; releases never are.
    fn route_primary(&mut self, input: PrimaryInput) {
        if !self.panning {
            if let Some(pos) = input.pos {
                if input.pressed && input.hovered {
                    self.surface.pointer_down(pos, egui::PointerButton::Primary);
                }
                if self.surface.is_dragging() {
                    self.surface.pointer_move(pos, input.held);
                }
            }
        }

        // A gesture whose button is already up is closed even if the
        // release event went missing.
        if input.released || (!input.held && self.surface.is_dragging()) {
            let pos = input
                .pos
                .or(self.surface.drag_anchor())
                .unwrap_or(egui::Pos2::ZERO);
            self.surface.pointer_up(pos, egui::PointerButton::Primary);
        }
    }
}

/// Primary-button state for one frame, in surface coordinates.
#[derive(Clone, Copy, Debug, Default)]
struct PrimaryInput {
    pos: Option<egui::Pos2>,
    pressed: bool,
    released: bool,
    held: bool,
    hovered: bool,
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for PaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        // Keyboard shortcuts
        let (open, save, clean) = ctx.input(|i| {
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::O),
                i.modifiers.ctrl && i.key_pressed(egui::Key::S),
                i.modifiers.ctrl && i.key_pressed(egui::Key::Delete),
            )
        });
        if open {
            self.open_dialog();
        }
        if save {
            self.save_dialog();
        }
        if clean {
            self.clean();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
            painter.rect_filled(self.surface_rect_on_screen(canvas_rect), 0.0, egui::Color32::WHITE);

            // The background texture may have been dropped by the toolbar this frame.
            self.ensure_texture(ctx);
            self.draw_content(&painter, canvas_rect);

            self.handle_pointer(ctx, &response, canvas_rect);
        });

        self.error_window(ctx);
    }
}
