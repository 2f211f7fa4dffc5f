use crate::types::{BLACK, Color};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Split fractions used by the divided-shapes sketches.
pub const DEFAULT_FRACTIONS: [f32; 5] = [1.0 / 4.0, 1.0 / 3.0, 1.0 / 2.0, 2.0 / 3.0, 3.0 / 4.0];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("fraction table is empty")]
    EmptyFractions,
    #[error("split fraction {0} is outside (0, 1)")]
    FractionOutOfRange(f32),
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must be in (0, 1], got {value}")]
    BadFactor { name: &'static str, value: f32 },
    #[error("{name} must be in [0, 1], got {value}")]
    BadChance { name: &'static str, value: f32 },
    #[error("length range {min}..{max} is empty")]
    EmptyLengthRange { min: f32, max: f32 },
    #[error("queue batch must be at least 1")]
    ZeroBatch,
    #[error("divisions must be at least 1")]
    ZeroDivisions,
}

/// Parameters for the rectangle and circle subdivision sketches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivideConfig {
    /// Regions whose width or height (radius for circles) is at or below
    /// this value never split.
    pub min_dimension: f32,
    /// Child stroke width is the parent's multiplied by this factor...
    pub stroke_decay: f32,
    /// ...but never drops below this floor.
    pub min_stroke: f32,
    /// Amount subtracted from the split probability at every level.
    pub probability_decay: f32,
    /// Discrete table the split fraction is drawn from.
    pub fractions: Vec<f32>,
    /// Chance that a scheduler tick picks (and splits) the largest region.
    pub pick_largest_chance: f32,
    /// Stroke width of the outermost region.
    pub initial_stroke: f32,
    /// Pending split tasks processed per tick.
    pub queue_batch: usize,
    pub color: Color,
}

impl Default for DivideConfig {
    fn default() -> Self {
        Self {
            min_dimension: 5.0,
            stroke_decay: 0.8,
            min_stroke: 1.0,
            probability_decay: 0.1,
            fractions: DEFAULT_FRACTIONS.to_vec(),
            pick_largest_chance: 0.9,
            initial_stroke: 7.0,
            queue_batch: 1,
            color: BLACK,
        }
    }
}

impl DivideConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fractions.is_empty() {
            return Err(ConfigError::EmptyFractions);
        }
        if let Some(&f) = self.fractions.iter().find(|f| !(**f > 0.0 && **f < 1.0)) {
            return Err(ConfigError::FractionOutOfRange(f));
        }
        positive("min_dimension", self.min_dimension)?;
        positive("min_stroke", self.min_stroke)?;
        positive("initial_stroke", self.initial_stroke)?;
        positive("probability_decay", self.probability_decay)?;
        factor("stroke_decay", self.stroke_decay)?;
        chance("pick_largest_chance", self.pick_largest_chance)?;
        if self.queue_batch == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        Ok(())
    }

    /// Stroke width handed to the children of a region drawn with `stroke`.
    #[inline]
    pub fn child_stroke(&self, stroke: f32) -> f32 {
        (stroke * self.stroke_decay).max(self.min_stroke)
    }
}

/// Parameters for the generative-tree sketch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    /// Length of one growth step.
    pub step: f32,
    /// Maximum heading change per step, in radians (the draw is centred on zero).
    pub curvature: f32,
    /// Thickness a branch shrinks towards; at or below it no children spawn.
    pub min_thickness: f32,
    /// Fraction of the length budget after which children may spawn.
    pub spawn_zone: f32,
    /// Thickness factor for child branches.
    pub child_thickness: f32,
    /// User-facing branching multiplier.
    pub branch_probability: f32,
    /// Reference line width; also the base thickness of stroke-seeded branches.
    pub line_width: f32,
    /// Length budget range for spawned children.
    pub child_length: (f32, f32),
    /// Length budget range for branches seeded by a stroke or a continue.
    pub seed_length: (f32, f32),
    /// Every n-th branch gets a longer budget.
    pub long_branch_every: u32,
    pub long_branch_factor: f32,
    /// Rotational copies of a stroke (1 means no replication).
    pub divisions: u32,
    /// Distance between branch seeds along a stroke.
    pub stroke_spacing: f32,
    pub color: Color,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            step: 2.0,
            curvature: 0.2,
            min_thickness: 0.5,
            spawn_zone: 0.8,
            child_thickness: 0.7,
            branch_probability: 1.0,
            line_width: 1.0,
            child_length: (2.0, 30.0),
            seed_length: (22.0, 50.0),
            long_branch_every: 10,
            long_branch_factor: 4.0,
            divisions: 4,
            stroke_spacing: 2.0,
            color: BLACK,
        }
    }
}

impl BranchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("step", self.step)?;
        positive("line_width", self.line_width)?;
        positive("stroke_spacing", self.stroke_spacing)?;
        positive("long_branch_factor", self.long_branch_factor)?;
        if !(self.min_thickness >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "min_thickness",
                value: self.min_thickness,
            });
        }
        if !(self.branch_probability >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "branch_probability",
                value: self.branch_probability,
            });
        }
        factor("spawn_zone", self.spawn_zone)?;
        factor("child_thickness", self.child_thickness)?;
        for (min, max) in [self.child_length, self.seed_length] {
            if !(min < max) || min <= 0.0 {
                return Err(ConfigError::EmptyLengthRange { min, max });
            }
        }
        if self.divisions == 0 {
            return Err(ConfigError::ZeroDivisions);
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn factor(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::BadFactor { name, value })
    }
}

fn chance(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::BadChance { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DivideConfig::default().validate(), Ok(()));
        assert_eq!(BranchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn child_stroke_decays_to_floor() {
        let cfg = DivideConfig::default();
        assert!((cfg.child_stroke(7.0) - 5.6).abs() < 1e-5);
        assert_eq!(cfg.child_stroke(1.1), 1.0);
        assert_eq!(cfg.child_stroke(1.0), 1.0);
    }

    #[test]
    fn divide_config_rejects_bad_fraction_tables() {
        let mut cfg = DivideConfig::default();
        cfg.fractions.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyFractions));

        cfg.fractions = vec![0.5, 1.0];
        assert_eq!(cfg.validate(), Err(ConfigError::FractionOutOfRange(1.0)));

        cfg.fractions = vec![0.0];
        assert_eq!(cfg.validate(), Err(ConfigError::FractionOutOfRange(0.0)));
    }

    #[test]
    fn divide_config_rejects_out_of_range_values() {
        let mut cfg = DivideConfig::default();
        cfg.stroke_decay = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BadFactor { name: "stroke_decay", .. })
        ));

        let mut cfg = DivideConfig::default();
        cfg.pick_largest_chance = -0.1;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadChance { .. })));

        let mut cfg = DivideConfig::default();
        cfg.min_dimension = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::NotPositive { .. })));

        let mut cfg = DivideConfig::default();
        cfg.queue_batch = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBatch));
    }

    #[test]
    fn branch_config_rejects_empty_length_range() {
        let mut cfg = BranchConfig::default();
        cfg.child_length = (10.0, 10.0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EmptyLengthRange { .. })
        ));

        let mut cfg = BranchConfig::default();
        cfg.divisions = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDivisions));
    }
}
