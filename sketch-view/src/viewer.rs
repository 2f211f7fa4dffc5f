//! Interactive viewer for the generative sketches, built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns one divided-shapes sketch
//! and one tree sketch, ticks whichever is selected on a timer, replays
//! its recorded canvas every frame and exposes the settings in a side
//! panel.

use crate::prefs::{Settings, SketchKind};
use eframe::App;
use glam::Vec2;
use log::{info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use sketch_core::{
    branch::Grove,
    divided::{DividedShapes, ShapeMode},
    surface::{Canvas, DrawCommand},
    types::Color,
};
use std::path::PathBuf;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The sketches: [`DividedShapes`] and [`Grove`], both seeded from
///   [`Settings::seed`] so a reset redraws the same picture.
/// - UI configuration (pan/zoom, timing, settings persistence).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle keyboard and pointer input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Replay the selected sketch's canvas.
///
/// ### Fields
/// - `settings` - Persisted parameters, including the selected sketch.
/// - `prefs_path` - Where settings are saved; `None` disables saving.
/// - `settings_dirty` - Settings changed since the last save.
///
/// - `shapes` - Divided-shapes sketch (rectangles, angled, circles).
/// - `grove` - Tree sketch.
/// - `canvas_size` - Logical canvas size used when a sketch starts.
/// - `awaiting_size` - No frame has reported the panel size yet, so the
///   first sketch has not started.
///
/// - `running` - Whether the selected sketch is auto-advancing.
/// - `zoom` - Zoom factor for canvas-to-screen mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `stroke` - Last pointer position and time of an ongoing tree stroke.
///
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    settings: Settings,
    prefs_path: Option<PathBuf>,
    settings_dirty: bool,

    shapes: DividedShapes<StdRng>,
    grove: Grove<StdRng>,
    canvas_size: Vec2,
    awaiting_size: bool,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    stroke: Option<(Vec2, f64)>,

    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer for the given settings.
    ///
    /// The selected sketch starts on the first frame, once the size of the
    /// drawing panel is known (see [`Viewer::fit_canvas`]).
    ///
    /// ### Parameters
    /// - `settings` - Loaded (or default) settings.
    /// - `prefs_path` - File settings are written back to.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new(settings: Settings, prefs_path: Option<PathBuf>) -> Self {
        Self {
            shapes: build_shapes(&settings),
            grove: build_grove(&settings, Vec2::ZERO),
            settings,
            prefs_path,
            settings_dirty: false,
            canvas_size: Vec2::ZERO,
            awaiting_size: true,
            running: true,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            stroke: None,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Records the drawing panel size; the first call starts the sketch.
    fn fit_canvas(&mut self, size: Vec2) {
        self.canvas_size = size;
        if self.awaiting_size {
            self.awaiting_size = false;
            self.start_sketch();
        }
    }

    /// Restarts the selected sketch on a blank canvas.
    fn start_sketch(&mut self) {
        self.stroke = None;
        if self.awaiting_size {
            return;
        }
        match self.settings.kind {
            SketchKind::Divided(mode) => self.shapes.start(mode, self.canvas_size),
            SketchKind::Tree => {
                self.grove.set_center(self.canvas_size / 2.0);
                self.grove.clear();
                self.grove.resume();
            }
        }
    }

    /// Switches to another sketch and starts it running.
    fn select(&mut self, kind: SketchKind) {
        info!("selected {kind:?}");
        self.settings.kind = kind;
        self.settings_dirty = true;
        self.start_sketch();
        self.running = true;
    }

    /// Rebuilds both sketches from the seed, so the picture repeats.
    ///
    /// This keeps the current settings and camera, but stops auto-running.
    fn reset(&mut self) {
        self.shapes = build_shapes(&self.settings);
        self.grove = build_grove(&self.settings, self.canvas_size / 2.0);
        self.start_sketch();
        self.running = false;
    }

    /// Clears both canvases and stops drawing.
    fn clear(&mut self) {
        self.shapes.clear();
        self.grove.clear();
        self.grove.stop();
        self.stroke = None;
    }

    /// Stops the selected sketch; the Space key.
    fn stop_drawing(&mut self) {
        match self.settings.kind {
            SketchKind::Divided(_) => self.shapes.stop(),
            SketchKind::Tree => self.grove.stop(),
        }
    }

    /// Continues the selected sketch; the C key.
    fn continue_drawing(&mut self) {
        match self.settings.kind {
            SketchKind::Divided(_) => self.shapes.resume(),
            SketchKind::Tree => self.grove.resume(),
        }
    }

    /// Advances the selected sketch by a single tick.
    fn step_once(&mut self) -> bool {
        match self.settings.kind {
            SketchKind::Divided(_) => self.shapes.tick(),
            SketchKind::Tree => self.grove.tick(),
        }
    }

    /// Feeds one pointer sample of a tree stroke.
    ///
    /// Speed is measured in canvas units per millisecond between this
    /// sample and the previous one.
    fn stroke_to(&mut self, pos: Vec2, now: f64) {
        if let Some((last, last_time)) = self.stroke {
            let dt_ms = ((now - last_time) * 1000.0).max(1.0) as f32;
            let speed = last.distance(pos) / dt_ms;
            self.grove.seed_stroke(last, pos, speed);
        } else {
            self.grove.begin_stroke();
        }
        self.stroke = Some((pos, now));
    }

    /// Random colours, line width, branching and symmetry, then a fresh seed.
    fn randomize(&mut self) {
        let mut rng = rand::rng();
        let s = &mut self.settings;
        s.branch.color = rng.random();
        s.divide.color = s.branch.color;
        s.background = rng.random();
        s.branch.line_width = rng.random_range(1..=10) as f32;
        s.branch.branch_probability = rng.random_range(0.5..1.5);
        s.branch.divisions = rng.random_range(1..=50);
        s.seed = rng.random();
        self.apply_settings(true);
    }

    fn restore_defaults(&mut self) {
        let kind = self.settings.kind;
        self.settings = Settings {
            kind,
            ..Settings::default()
        };
        self.apply_settings(true);
    }

    /// Pushes the current settings into both sketches.
    fn apply_settings(&mut self, background_changed: bool) {
        if let Err(err) = self.shapes.set_config(self.settings.divide.clone()) {
            warn!("divide settings not applied: {err}");
        }
        if let Err(err) = self.grove.set_config(self.settings.branch.clone()) {
            warn!("branch settings not applied: {err}");
        }
        if background_changed {
            self.shapes.set_background(self.settings.background);
            self.grove.set_background(self.settings.background);
        }
        self.settings_dirty = true;
    }

    /// Saves settings once no pointer button is held, so dragging a value
    /// does not write the file every frame.
    fn save_if_dirty(&mut self, ctx: &egui::Context) {
        if !self.settings_dirty || ctx.input(|i| i.pointer.any_down()) {
            return;
        }
        if let Err(err) = self.settings.save(self.prefs_path.as_deref()) {
            log::error!("could not save settings: {err}");
        }
        self.settings_dirty = false;
    }

    fn canvas(&self) -> &Canvas {
        match self.settings.kind {
            SketchKind::Divided(_) => self.shapes.canvas(),
            SketchKind::Tree => self.grove.canvas(),
        }
    }

    fn is_drawing(&self) -> bool {
        match self.settings.kind {
            SketchKind::Divided(_) => self.shapes.is_active(),
            SketchKind::Tree => self.grove.is_growing(),
        }
    }

    /// Converts a canvas position to screen-space.
    ///
    /// Canvas coordinates have their origin in the top-left corner with y
    /// pointing down; they are scaled by `zoom` and offset by `pan`.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        egui::pos2(
            rect.min.x + p.x * self.zoom + self.pan.x,
            rect.min.y + p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to canvas coordinates.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        Vec2::new(
            (p.x - rect.min.x - self.pan.x) / self.zoom,
            (p.y - rect.min.y - self.pan.y) / self.zoom,
        )
    }

    /// Helper to draw a labeled [`egui::DragValue`]; returns `true` on change.
    fn labeled_drag<N: egui::emath::Numeric>(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut N,
        range: std::ops::RangeInclusive<N>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    /// Builds the top panel UI (sketch selection, run controls, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (kind, label) in [
                    (SketchKind::Divided(ShapeMode::Rectangles), "▭ Rectangles"),
                    (SketchKind::Divided(ShapeMode::AngledRectangles), "⧄ Angled"),
                    (SketchKind::Divided(ShapeMode::Circles), "○ Circles"),
                    (SketchKind::Tree, "🌳 Tree"),
                ] {
                    if ui
                        .selectable_label(self.settings.kind == kind, label)
                        .clicked()
                    {
                        self.select(kind);
                    }
                }

                ui.separator();

                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Restart").clicked() {
                    self.start_sketch();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.settings.tick_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                match self.settings.kind {
                    SketchKind::Divided(_) => {
                        ui.label(format!("ticks = {}", self.shapes.ticks()));
                        ui.label(format!("regions = {}", self.shapes.regions().len()));
                        ui.label(format!("pending splits = {}", self.shapes.queue().len()));
                    }
                    SketchKind::Tree => {
                        ui.label(format!("branches = {}", self.grove.active().len()));
                        ui.label(format!("tips = {}", self.grove.tips().len()));
                    }
                }
                ui.label(if self.is_drawing() { "drawing" } else { "stopped" });
            });
        });
    }

    /// Builds the right-hand settings panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Settings");
                let mut changed = false;
                let mut background_changed = false;

                ui.separator();
                ui.label("Timing");
                changed |= Self::labeled_drag(
                    ui,
                    "tick interval (s):",
                    &mut self.settings.tick_interval,
                    0.01..=1.0,
                    0.01,
                );
                changed |= Self::labeled_drag(ui, "seed:", &mut self.settings.seed, 0..=u64::MAX, 1.0);

                ui.separator();
                ui.label("Divided shapes");
                let d = &mut self.settings.divide;
                changed |= Self::labeled_drag(ui, "min dimension:", &mut d.min_dimension, 1.0..=100.0, 0.5);
                changed |= Self::labeled_drag(ui, "initial stroke:", &mut d.initial_stroke, 1.0..=30.0, 0.1);
                changed |= Self::labeled_drag(ui, "stroke decay:", &mut d.stroke_decay, 0.05..=1.0, 0.01);
                changed |= Self::labeled_drag(ui, "probability decay:", &mut d.probability_decay, 0.01..=1.0, 0.01);
                changed |= Self::labeled_drag(ui, "pick largest chance:", &mut d.pick_largest_chance, 0.0..=1.0, 0.01);
                changed |= Self::labeled_drag(ui, "splits per tick:", &mut d.queue_batch, 1..=64, 1.0);
                ui.horizontal(|ui| {
                    ui.label("colour:");
                    changed |= ui.color_edit_button_srgb(&mut d.color).changed();
                });

                ui.separator();
                ui.label("Tree");
                let b = &mut self.settings.branch;
                changed |= Self::labeled_drag(ui, "line width:", &mut b.line_width, 1.0..=10.0, 0.1);
                changed |= Self::labeled_drag(ui, "branch probability:", &mut b.branch_probability, 0.0..=2.0, 0.01);
                changed |= Self::labeled_drag(ui, "divisions:", &mut b.divisions, 1..=50, 1.0);
                changed |= Self::labeled_drag(ui, "curvature:", &mut b.curvature, 0.0..=2.0, 0.01);
                changed |= Self::labeled_drag(ui, "step:", &mut b.step, 0.5..=10.0, 0.1);
                ui.horizontal(|ui| {
                    ui.label("colour:");
                    changed |= ui.color_edit_button_srgb(&mut b.color).changed();
                });

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("background:");
                    background_changed = ui
                        .color_edit_button_srgb(&mut self.settings.background)
                        .changed();
                });

                if changed || background_changed {
                    self.apply_settings(background_changed);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Randomize").clicked() {
                        self.randomize();
                    }
                    if ui.button("Defaults").clicked() {
                        self.restore_defaults();
                    }
                });
            });
    }

    /// Replays the recorded canvas onto the painter.
    fn paint_canvas(&self, painter: &egui::Painter, rect: egui::Rect) {
        let to_screen = |p: Vec2| self.world_to_screen(p, rect);
        let stroke = |w: f32, c: Color| egui::Stroke::new(w * self.zoom, color32(c));

        for cmd in self.canvas().commands() {
            match *cmd {
                DrawCommand::Clear(c) => {
                    let area = egui::Rect::from_two_pos(to_screen(Vec2::ZERO), to_screen(self.canvas_size));
                    painter.rect_filled(area, 0.0, color32(c));
                }
                DrawCommand::Line {
                    segment,
                    width,
                    color,
                } => {
                    painter.line_segment(
                        [to_screen(segment.from), to_screen(segment.to)],
                        stroke(width, color),
                    );
                }
                DrawCommand::RectOutline {
                    min,
                    size,
                    width,
                    color,
                } => {
                    painter.rect_stroke(
                        egui::Rect::from_two_pos(to_screen(min), to_screen(min + size)),
                        0.0,
                        stroke(width, color),
                        egui::StrokeKind::Middle,
                    );
                }
                DrawCommand::FillRect { min, size, color } => {
                    painter.rect_filled(
                        egui::Rect::from_two_pos(to_screen(min), to_screen(min + size)),
                        0.0,
                        color32(color),
                    );
                }
                DrawCommand::CircleOutline {
                    center,
                    radius,
                    width,
                    color,
                } => {
                    painter.circle_stroke(to_screen(center), radius * self.zoom, stroke(width, color));
                }
            }
        }
    }

    /// Builds the central panel where the sketch is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Sketches started from now on fill the visible area.
            self.fit_canvas(Vec2::new(rect.width(), rect.height()) / self.zoom);

            // Pan with the secondary button; the primary button draws.
            if response.dragged_by(egui::PointerButton::Secondary) {
                self.pan += response.drag_delta();
            }

            if self.settings.kind == SketchKind::Tree {
                if response.dragged_by(egui::PointerButton::Primary)
                    && let Some(p) = response.interact_pointer_pos()
                {
                    let now = ctx.input(|i| i.time);
                    let pos = self.screen_to_world(p, rect);
                    self.stroke_to(pos, now);
                }
                if response.drag_stopped_by(egui::PointerButton::Primary) {
                    self.stroke = None;
                }
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());

                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            self.paint_canvas(&painter, rect);

            // Auto-run the sketch if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.settings.tick_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (stop, cont) = ctx.input(|i| (i.key_pressed(egui::Key::Space), i.key_pressed(egui::Key::C)));
        if stop {
            self.stop_drawing();
        }
        if cont {
            self.continue_drawing();
        }
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Handles keyboard shortcuts.
    /// - Renders the top control bar and status bar.
    /// - Renders the settings side panel.
    /// - Draws the central canvas and handles interactions.
    /// - Saves settings that changed.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.save_if_dirty(ctx);
    }
}

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgb(c[0], c[1], c[2])
}

fn build_shapes(settings: &Settings) -> DividedShapes<StdRng> {
    let rng = StdRng::seed_from_u64(settings.seed);
    let mut shapes = match DividedShapes::new(settings.divide.clone(), rng) {
        Ok(s) => s,
        Err(err) => {
            warn!("divide settings rejected ({err}), using defaults");
            DividedShapes::with_rng(StdRng::seed_from_u64(settings.seed))
        }
    };
    shapes.set_background(settings.background);
    shapes
}

fn build_grove(settings: &Settings, center: Vec2) -> Grove<StdRng> {
    // A different stream than the shapes, so both sketches are independent.
    let rng = StdRng::seed_from_u64(settings.seed.wrapping_add(1));
    let mut grove = match Grove::new(settings.branch.clone(), rng, center) {
        Ok(g) => g,
        Err(err) => {
            warn!("branch settings rejected ({err}), using defaults");
            Grove::with_rng(StdRng::seed_from_u64(settings.seed.wrapping_add(1)), center)
        }
    };
    grove.set_background(settings.background);
    grove
}
