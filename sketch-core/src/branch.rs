//! Branch growth for the generative-tree sketch.
//!
//! A [`Branch`] walks forward in fixed steps along a slowly curving
//! heading, thinning linearly towards `min_thickness`. Near the end of its
//! length budget it may sprout up to three children per step. A [`Grove`]
//! owns all growing branches of one sketch, draws their segments and
//! implements stroke seeding, rotational replication and stop/continue.

use crate::{
    config::{BranchConfig, ConfigError},
    region::LineSegment,
    surface::{Canvas, Surface},
    types::{Color, Generation, WHITE},
};
use glam::Vec2;
use log::{debug, info};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

/// Scales the per-check spawn chance.
const SPAWN_DAMPING: f32 = 0.95;

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub pos: Vec2,
    /// Heading in radians.
    pub angle: f32,
    /// Total length budget.
    pub length: f32,
    /// Length grown so far.
    pub travelled: f32,
    pub thickness: f32,
    pub initial_thickness: f32,
    /// Thickness lost per step; never negative.
    pub decrement: f32,
    pub generation: Generation,
    /// Children sprouted so far.
    pub sprouted: u32,
}

/// A child branch requested by [`Branch::grow`]; the owner picks its length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprout {
    pub pos: Vec2,
    pub angle: f32,
    pub thickness: f32,
    pub generation: Generation,
}

/// End state of a branch, used to continue growth later.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tip {
    pub pos: Vec2,
    pub angle: f32,
    pub thickness: f32,
    pub generation: Generation,
}

/// One growth step: the drawn segment and any sprouts.
#[derive(Clone, Debug, PartialEq)]
pub struct Growth {
    pub segment: LineSegment,
    /// Thickness the segment is drawn with.
    pub width: f32,
    pub sprouts: Vec<Sprout>,
}

impl Branch {
    /// Creates a branch at `pos` heading along `angle`.
    ///
    /// The decrement is chosen so thickness reaches `cfg.min_thickness`
    /// after the whole budget; a branch that starts thinner than that
    /// keeps its thickness. A non-finite or non-positive `length` yields a
    /// branch that is finished from the start.
    pub fn new(
        pos: Vec2,
        angle: f32,
        length: f32,
        thickness: f32,
        generation: Generation,
        cfg: &BranchConfig,
    ) -> Self {
        let length = if length.is_finite() && length > 0.0 {
            length
        } else {
            0.0
        };
        let steps = length / cfg.step;
        let decrement = if steps > 0.0 {
            (thickness - cfg.min_thickness).max(0.0) / steps
        } else {
            0.0
        };

        Self {
            pos,
            angle,
            length,
            travelled: 0.0,
            thickness,
            initial_thickness: thickness,
            decrement,
            generation,
            sprouted: 0,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        !(self.travelled < self.length)
    }

    pub fn tip(&self) -> Tip {
        Tip {
            pos: self.pos,
            angle: self.angle,
            thickness: self.thickness,
            generation: self.generation,
        }
    }

    /// Advances the branch by one step.
    ///
    /// 1. Emit a segment of length `cfg.step` along the current heading,
    ///    drawn with the current thickness.
    /// 2. Thin the branch, add the step to `travelled` and bend the
    ///    heading by `(u - 0.5) * cfg.curvature`.
    /// 3. Once past `cfg.spawn_zone` of the budget and still thicker than
    ///    `cfg.min_thickness`, roll three spawn checks: +45° and −45° with
    ///    chance `p`, +90° with `p / 2`, where
    ///    `p = initial_thickness / line_width * branch_probability * 0.95`.
    ///
    /// ### Returns
    /// `None` once the budget is used up.
    pub fn grow(&mut self, cfg: &BranchConfig, rng: &mut impl Rng) -> Option<Growth> {
        if self.is_finished() {
            return None;
        }

        let end = self.pos + Vec2::from_angle(self.angle) * cfg.step;
        let segment = LineSegment::new(self.pos, end);
        let width = self.thickness;
        let curve = (rng.random::<f32>() - 0.5) * cfg.curvature;

        self.pos = end;
        self.thickness -= self.decrement;
        if self.initial_thickness > cfg.min_thickness {
            self.thickness = self.thickness.max(cfg.min_thickness);
        }
        self.travelled += cfg.step;
        self.angle += curve;

        let mut sprouts = Vec::new();
        if self.travelled >= self.length * cfg.spawn_zone && self.thickness > cfg.min_thickness {
            let p = self.initial_thickness / cfg.line_width * cfg.branch_probability * SPAWN_DAMPING;
            let thickness = self.thickness * cfg.child_thickness;
            for (turn, chance) in [(FRAC_PI_4, p), (-FRAC_PI_4, p), (FRAC_PI_2, p / 2.0)] {
                if rng.random::<f32>() < chance {
                    sprouts.push(Sprout {
                        pos: self.pos,
                        angle: self.angle + turn,
                        thickness,
                        generation: self.generation + 1,
                    });
                }
            }
            self.sprouted += sprouts.len() as u32;
        }

        Some(Growth {
            segment,
            width,
            sprouts,
        })
    }
}

/// Rotates a point and heading by `turn` radians about `center`.
pub fn rotate_about(pos: Vec2, angle: f32, center: Vec2, turn: f32) -> (Vec2, f32) {
    (
        center + Vec2::from_angle(turn).rotate(pos - center),
        angle + turn,
    )
}

/// All growing branches of one tree sketch.
pub struct Grove<R: Rng> {
    cfg: BranchConfig,
    rng: R,
    active: Vec<Branch>,
    tips: Vec<Tip>,
    /// Branches started since the last stroke began; drives the long-branch rule.
    counter: u32,
    growing: bool,
    center: Vec2,
    canvas: Canvas,
    background: Color,
}

impl<R: Rng> Grove<R> {
    /// Creates an empty grove replicating strokes about `center`.
    pub fn new(cfg: BranchConfig, rng: R, center: Vec2) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            ..Self::with_rng(rng, center)
        })
    }

    /// Grove with [`BranchConfig::default`].
    pub fn with_rng(rng: R, center: Vec2) -> Self {
        Self {
            cfg: BranchConfig::default(),
            rng,
            active: Vec::with_capacity(64),
            tips: Vec::new(),
            counter: 0,
            growing: true,
            center,
            canvas: Canvas::new(),
            background: WHITE,
        }
    }

    /// Starts a branch, applying the long-branch rule: while the counter
    /// is a multiple of `long_branch_every`, the budget is multiplied by
    /// `long_branch_factor`.
    fn start_branch(
        &mut self,
        pos: Vec2,
        angle: f32,
        length: f32,
        thickness: f32,
        generation: Generation,
    ) {
        let every = self.cfg.long_branch_every;
        let length = if every != 0 && self.counter % every == 0 {
            length * self.cfg.long_branch_factor
        } else {
            length
        };
        self.active
            .push(Branch::new(pos, angle, length, thickness, generation, &self.cfg));
    }

    fn random_length(&mut self, (min, max): (f32, f32)) -> f32 {
        self.rng.random_range(min..max)
    }

    /// Marks the start of a new pointer stroke.
    pub fn begin_stroke(&mut self) {
        self.counter = 0;
    }

    /// Seeds branches along the stroke segment `from -> to`.
    ///
    /// Seeds are placed every `stroke_spacing` units (the last one exactly
    /// on `to`), each with a random heading and a length budget drawn from
    /// `seed_length`. Faster strokes give thinner branches:
    /// `max(line_width * (3 - speed), 1)`. Every seed is also replicated
    /// `divisions - 1` times, rotated evenly about the grove's centre.
    ///
    /// ### Parameters
    /// - `from`, `to` - Stroke segment in canvas coordinates.
    /// - `speed` - Pointer speed in units per millisecond.
    ///
    /// ### Returns
    /// The number of branches started. Nothing is seeded while stopped.
    pub fn seed_stroke(&mut self, from: Vec2, to: Vec2, speed: f32) -> usize {
        let dist = LineSegment::new(from, to).length();
        if !self.growing || !(dist > 0.0) {
            return 0;
        }

        let thickness = (self.cfg.line_width * (3.0 - speed)).max(1.0);
        let n = (dist / self.cfg.stroke_spacing).ceil() as usize;
        let divisions = self.cfg.divisions.max(1);
        let before = self.active.len();

        for i in 1..=n {
            let pos = from.lerp(to, i as f32 / n as f32);
            let angle = self.rng.random_range(0.0..TAU);
            for k in 0..divisions {
                let turn = TAU * k as f32 / divisions as f32;
                let (p, a) = rotate_about(pos, angle, self.center, turn);
                let length = self.random_length(self.cfg.seed_length);
                self.start_branch(p, a, length, thickness, 0);
            }
        }

        let started = self.active.len() - before;
        debug!("seeded {started} branches");
        started
    }

    /// Grows every active branch by one step.
    ///
    /// Finished branches leave the active set; leaves (branches that never
    /// sprouted) record their [`Tip`]. Sprouts start as new branches with a
    /// budget drawn from `child_length`.
    ///
    /// ### Returns
    /// `false` while stopped.
    pub fn tick(&mut self) -> bool {
        if !self.growing {
            return false;
        }

        let mut sprouts = Vec::new();
        for branch in &mut self.active {
            if let Some(growth) = branch.grow(&self.cfg, &mut self.rng) {
                self.canvas
                    .line(growth.segment, growth.width, self.cfg.color);
                sprouts.extend(growth.sprouts);
            }
        }

        let tips = &mut self.tips;
        self.active.retain(|b| {
            if !b.is_finished() {
                return true;
            }
            if b.sprouted == 0 {
                tips.push(b.tip());
            }
            false
        });

        for s in sprouts {
            self.counter += 1;
            let length = self.random_length(self.cfg.child_length);
            self.start_branch(s.pos, s.angle, length, s.thickness, s.generation);
        }
        true
    }

    /// Halts all growth. Active branches end where they are and record
    /// their tips so [`Grove::resume`] can pick them up.
    pub fn stop(&mut self) {
        self.growing = false;
        let tips: Vec<Tip> = self.active.drain(..).map(|b| b.tip()).collect();
        info!("stopped growth, {} tips", self.tips.len() + tips.len());
        self.tips.extend(tips);
    }

    /// Restarts growth from every recorded tip with a fresh budget from
    /// `seed_length`, then forgets the tips.
    pub fn resume(&mut self) {
        self.growing = true;
        let tips = std::mem::take(&mut self.tips);
        info!("continuing from {} tips", tips.len());
        for t in tips {
            let length = self.random_length(self.cfg.seed_length);
            self.start_branch(t.pos, t.angle, length, t.thickness, t.generation);
        }
    }

    /// Wipes the canvas, growing branches and tips.
    pub fn clear(&mut self) {
        self.active.clear();
        self.tips.clear();
        self.counter = 0;
        self.canvas.clear(self.background);
    }

    pub fn set_config(&mut self, cfg: BranchConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        self.cfg = cfg;
        Ok(())
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Repaints the canvas with a new background. Growing branches and
    /// recorded tips are kept, so growth carries on over the fresh canvas.
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
        self.canvas.clear(background);
    }

    pub fn config(&self) -> &BranchConfig {
        &self.cfg
    }

    pub fn active(&self) -> &[Branch] {
        &self.active
    }

    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    pub fn is_growing(&self) -> bool {
        self.growing
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}
