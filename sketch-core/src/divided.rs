//! Driver for the "divided shapes" sketches.
//!
//! [`DividedShapes`] owns everything one sketch instance needs: the
//! region collection, the pending split queue, the random source and the
//! recorded canvas. The frontend calls [`DividedShapes::tick`] on a timer;
//! each tick does a bounded amount of work and draws what changed.

use crate::{
    collection::{Advance, RegionCollection},
    config::{ConfigError, DivideConfig},
    queue::{SplitQueue, SplitTask, TaskOutcome},
    region::{CircleRegion, Rect, RectRegion, RectStyle, Region},
    subdivide::{Boundary, diagonals},
    surface::{Canvas, Surface},
    types::{Color, Orientation, WHITE},
};
use glam::Vec2;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeMode {
    /// Straight k-d cuts, driven by the split queue and the largest-first picker.
    Rectangles,
    /// Diagonal cuts, largest-first picker only.
    AngledRectangles,
    /// Nested circles, largest-first picker only.
    Circles,
}

pub struct DividedShapes<R: Rng> {
    cfg: DivideConfig,
    rng: R,
    mode: ShapeMode,
    regions: RegionCollection,
    queue: SplitQueue,
    canvas: Canvas,
    background: Color,
    active: bool,
    ticks: u64,
}

impl<R: Rng> DividedShapes<R> {
    /// Creates an idle sketch; nothing is drawn until [`DividedShapes::start`].
    pub fn new(cfg: DivideConfig, rng: R) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            ..Self::with_rng(rng)
        })
    }

    /// Idle sketch with [`DivideConfig::default`].
    pub fn with_rng(rng: R) -> Self {
        Self {
            cfg: DivideConfig::default(),
            rng,
            mode: ShapeMode::Rectangles,
            regions: RegionCollection::new(),
            queue: SplitQueue::new(),
            canvas: Canvas::new(),
            background: WHITE,
            active: false,
            ticks: 0,
        }
    }

    /// Clears the canvas and starts a fresh subdivision of a canvas of
    /// size `bounds`.
    ///
    /// - `Rectangles`: the central rectangle is drawn and handed to the
    ///   split queue, which feeds its children to the collection.
    /// - `AngledRectangles`: the central rectangle's diagonals are drawn
    ///   and the rectangle seeds the collection.
    /// - `Circles`: a circle of radius 3/8 of the shorter side, centred on
    ///   the canvas, is drawn and seeds the collection.
    pub fn start(&mut self, mode: ShapeMode, bounds: Vec2) {
        self.mode = mode;
        self.regions.clear();
        self.queue.clear();
        self.canvas.clear(self.background);
        self.ticks = 0;
        self.active = true;

        let stroke = self.cfg.initial_stroke;
        let color = self.cfg.color;
        match mode {
            ShapeMode::Rectangles => {
                let rect = Rect::inset_of(bounds);
                self.canvas
                    .rect_outline(rect.min(), rect.size(), stroke, color);
                self.queue.push(SplitTask {
                    rect,
                    orientation: Orientation::Vertical,
                    probability: 1.0,
                    stroke,
                });
            }
            ShapeMode::AngledRectangles => {
                let rect = Rect::inset_of(bounds);
                for d in diagonals(&rect) {
                    self.canvas.line(d, stroke, color);
                }
                self.regions.push(RectRegion {
                    rect,
                    stroke,
                    orientation: Orientation::Vertical,
                    style: RectStyle::Angled,
                });
            }
            ShapeMode::Circles => {
                let circle = CircleRegion {
                    center: bounds / 2.0,
                    radius: bounds.min_element() * 3.0 / 8.0,
                    stroke,
                };
                self.canvas
                    .circle_outline(circle.center, circle.radius, stroke, color);
                self.regions.push(circle);
            }
        }

        info!("started {mode:?} on {}x{}", bounds.x, bounds.y);
    }

    /// Advances the sketch by one tick.
    ///
    /// Does nothing while the sketch is stopped. Otherwise runs up to
    /// `cfg.queue_batch` pending splits, pushing every produced child into
    /// the collection, then one [`RegionCollection::pick_and_advance`].
    ///
    /// ### Returns
    /// `true` if the tick ran.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let outcomes = self
            .queue
            .drain(&self.cfg, &mut self.rng, self.cfg.queue_batch);
        for outcome in outcomes {
            if let TaskOutcome::Split { task, split } = outcome {
                let parent = task.region();
                self.canvas.rect_outline(
                    parent.rect.min(),
                    parent.rect.size(),
                    parent.stroke,
                    self.cfg.color,
                );
                self.canvas
                    .line(split.boundary, parent.stroke, self.cfg.color);
                self.regions.push(split.left);
                self.regions.push(split.right);
            }
        }

        if let Advance::Split { parent, split } =
            self.regions.pick_and_advance(&self.cfg, &mut self.rng)
        {
            draw_split(&mut self.canvas, &parent, &split.boundary, self.cfg.color);
        }

        self.ticks += 1;
        true
    }

    /// Stops scheduling; the current state stays on the canvas.
    pub fn stop(&mut self) {
        if self.active {
            info!("stopped {:?} after {} ticks", self.mode, self.ticks);
        }
        self.active = false;
    }

    /// Resumes a stopped sketch where it left off.
    pub fn resume(&mut self) {
        self.active = true;
    }

    /// Wipes the canvas and all pending work, leaving the sketch stopped.
    pub fn clear(&mut self) {
        self.active = false;
        self.regions.clear();
        self.queue.clear();
        self.canvas.clear(self.background);
    }

    /// Replaces the parameters; they apply from the next tick on.
    pub fn set_config(&mut self, cfg: DivideConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        self.cfg = cfg;
        Ok(())
    }

    /// Repaints the canvas with a new background; pending work is kept.
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
        self.canvas.clear(background);
    }

    pub fn config(&self) -> &DivideConfig {
        &self.cfg
    }

    pub fn mode(&self) -> ShapeMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn regions(&self) -> &RegionCollection {
        &self.regions
    }

    pub fn queue(&self) -> &SplitQueue {
        &self.queue
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Draws the visible result of a scheduler split.
fn draw_split(surface: &mut impl Surface, parent: &Region, boundary: &Boundary, color: Color) {
    match (parent, boundary) {
        (Region::Rect(r), Boundary::Line(line)) => {
            surface.rect_outline(r.rect.min(), r.rect.size(), r.stroke, color);
            surface.line(*line, r.stroke, color);
        }
        (Region::Rect(r), Boundary::Diagonals(lines)) => {
            for line in lines {
                surface.line(*line, r.stroke, color);
            }
        }
        (_, Boundary::Circle(c)) => {
            surface.circle_outline(c.center, c.radius, c.stroke, color);
        }
        (Region::Circle(_), _) => {}
    }
}
