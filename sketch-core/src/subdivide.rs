//! Subdivision engine: probabilistic splitting of rectangles and circles.
//!
//! Three split shapes are supported:
//! 1. [`subdivide`] — straight k-d cut of a rectangle, used both by the
//!    recursive [`crate::queue::SplitQueue`] and the largest-first
//!    scheduler.
//! 2. [`split_angled`] — a rectangle crossed by its diagonals, children
//!    placed along the main diagonal.
//! 3. [`split_circle`] — a concentric inner circle plus its complement
//!    circle.
//!
//! None of them fail: undersized or malformed input simply yields `None`.

use crate::{
    config::DivideConfig,
    region::{CircleRegion, LineSegment, Rect, RectRegion, RectStyle, Region},
    types::Orientation,
};
use glam::Vec2;
use log::trace;
use rand::{Rng, seq::IndexedRandom};

/// Result of a straight rectangle split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectSplit {
    /// The cut line, spanning the full parent extent.
    pub boundary: LineSegment,
    /// Left (vertical cut) or top (horizontal cut) child.
    pub left: RectRegion,
    /// Right (vertical cut) or bottom (horizontal cut) child.
    pub right: RectRegion,
    /// Split probability the children should be tried with.
    pub probability: f32,
}

/// What to draw when a region splits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boundary {
    Line(LineSegment),
    Diagonals([LineSegment; 2]),
    Circle(CircleRegion),
}

/// Shape-independent split result used by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionSplit {
    pub boundary: Boundary,
    pub children: [Region; 2],
    pub probability: f32,
}

/// Draws one fraction uniformly from the table.
///
/// Falls back to `0.5` for an empty table so the caller never divides
/// by an undefined fraction; [`DivideConfig::validate`] rejects such
/// tables up front.
pub fn pick_fraction(fractions: &[f32], rng: &mut impl Rng) -> f32 {
    fractions.choose(rng).copied().unwrap_or(0.5)
}

/// Probabilities at or below this count as zero, so rounding in the
/// repeated decay cannot add an extra level.
const MIN_PROBABILITY: f32 = 1e-6;

/// Rolls the split test: `true` means "do split".
///
/// A non-positive (or NaN) probability never splits; otherwise a uniform
/// draw in `[0, 1)` must not exceed it.
fn roll(probability: f32, rng: &mut impl Rng) -> bool {
    if !(probability > MIN_PROBABILITY) {
        return false;
    }
    rng.random::<f32>() <= probability
}

/// Probabilistically splits a rectangle in two.
///
/// The size floor is checked first, so an undersized region never
/// consumes a random draw. After a successful split test, a fraction is
/// drawn from `cfg.fractions` and the rectangle is cut perpendicular to
/// `orientation` at that fraction.
///
/// ### Parameters
/// - `rect` - Region to split. Zero, negative or non-finite sizes never split.
/// - `orientation` - `Vertical` cuts the width, `Horizontal` the height.
/// - `probability` - Chance of splitting at this level.
/// - `stroke` - Stroke width the parent is drawn with.
/// - `cfg` - Size floor, decay factors and fraction table.
/// - `rng` - Injected random source.
///
/// ### Returns
/// `None` when the region does not split, otherwise the cut line and the
/// two children. Children carry the flipped orientation and the decayed
/// stroke width; [`RectSplit::probability`] is the decayed probability.
pub fn subdivide(
    rect: Rect,
    orientation: Orientation,
    probability: f32,
    stroke: f32,
    cfg: &DivideConfig,
    rng: &mut impl Rng,
) -> Option<RectSplit> {
    if !rect.exceeds(cfg.min_dimension) || !roll(probability, rng) {
        return None;
    }

    let fraction = pick_fraction(&cfg.fractions, rng);
    let child = |r: Rect| RectRegion {
        rect: r,
        stroke: cfg.child_stroke(stroke),
        orientation: orientation.flipped(),
        style: RectStyle::Straight,
    };

    let (boundary, left, right) = match orientation {
        Orientation::Vertical => {
            let left_w = rect.width * fraction;
            let cut_x = rect.x + left_w;
            (
                LineSegment::new(
                    Vec2::new(cut_x, rect.y),
                    Vec2::new(cut_x, rect.y + rect.height),
                ),
                Rect::new(rect.x, rect.y, left_w, rect.height),
                Rect::new(cut_x, rect.y, rect.width - left_w, rect.height),
            )
        }
        Orientation::Horizontal => {
            let top_h = rect.height * fraction;
            let cut_y = rect.y + top_h;
            (
                LineSegment::new(
                    Vec2::new(rect.x, cut_y),
                    Vec2::new(rect.x + rect.width, cut_y),
                ),
                Rect::new(rect.x, rect.y, rect.width, top_h),
                Rect::new(rect.x, cut_y, rect.width, rect.height - top_h),
            )
        }
    };

    trace!("split {rect:?} {orientation:?} at {fraction}");

    Some(RectSplit {
        boundary,
        left: child(left),
        right: child(right),
        probability: probability - cfg.probability_decay,
    })
}

/// Splits a rectangle along its main diagonal.
///
/// Both diagonals of the parent are the boundary. The first child is the
/// parent scaled by the fraction `f` from the top-left corner, the second
/// is the parent scaled by `1 - f` from the bottom-right corner, so the
/// two touch at the point `f` along the main diagonal.
///
/// ### Returns
/// `None` under the same size-floor and probability rules as [`subdivide`].
pub fn split_angled(
    region: &RectRegion,
    probability: f32,
    cfg: &DivideConfig,
    rng: &mut impl Rng,
) -> Option<RegionSplit> {
    let rect = region.rect;
    if !rect.exceeds(cfg.min_dimension) || !roll(probability, rng) {
        return None;
    }

    let f = pick_fraction(&cfg.fractions, rng);
    let first = Rect::new(rect.x, rect.y, rect.width * f, rect.height * f);
    let second = Rect::new(
        rect.x + first.width,
        rect.y + first.height,
        rect.width - first.width,
        rect.height - first.height,
    );
    let child = |r: Rect| {
        Region::Rect(RectRegion {
            rect: r,
            stroke: cfg.child_stroke(region.stroke),
            orientation: region.orientation.flipped(),
            style: RectStyle::Angled,
        })
    };

    Some(RegionSplit {
        boundary: Boundary::Diagonals(diagonals(&rect)),
        children: [child(first), child(second)],
        probability: probability - cfg.probability_decay,
    })
}

/// The two diagonals of a rectangle, main diagonal first.
pub fn diagonals(rect: &Rect) -> [LineSegment; 2] {
    let min = rect.min();
    let max = rect.max();
    [
        LineSegment::new(min, max),
        LineSegment::new(Vec2::new(max.x, min.y), Vec2::new(min.x, max.y)),
    ]
}

/// Splits a circle into a concentric inner circle and a complement.
///
/// The inner circle has radius `r * f`. The complement has radius
/// `r - r * f` and is centred that same distance to the right of the
/// parent centre. The inner circle is the drawn boundary.
pub fn split_circle(
    circle: &CircleRegion,
    probability: f32,
    cfg: &DivideConfig,
    rng: &mut impl Rng,
) -> Option<RegionSplit> {
    if !circle.exceeds(cfg.min_dimension) || !roll(probability, rng) {
        return None;
    }

    let f = pick_fraction(&cfg.fractions, rng);
    let stroke = cfg.child_stroke(circle.stroke);
    let inner_r = circle.radius * f;
    let outer_r = circle.radius - inner_r;
    let inner = CircleRegion {
        center: circle.center,
        radius: inner_r,
        stroke,
    };
    let outer = CircleRegion {
        center: circle.center + Vec2::new(outer_r, 0.0),
        radius: outer_r,
        stroke,
    };

    Some(RegionSplit {
        boundary: Boundary::Circle(inner),
        children: [inner.into(), outer.into()],
        probability: probability - cfg.probability_decay,
    })
}

/// Dispatches to the split matching the region's shape and style.
pub fn split_region(
    region: &Region,
    probability: f32,
    cfg: &DivideConfig,
    rng: &mut impl Rng,
) -> Option<RegionSplit> {
    match region {
        Region::Rect(r) => match r.style {
            RectStyle::Straight => {
                subdivide(r.rect, r.orientation, probability, r.stroke, cfg, rng).map(|s| {
                    RegionSplit {
                        boundary: Boundary::Line(s.boundary),
                        children: [s.left.into(), s.right.into()],
                        probability: s.probability,
                    }
                })
            }
            RectStyle::Angled => split_angled(r, probability, cfg, rng),
        },
        Region::Circle(c) => split_circle(c, probability, cfg, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn halves() -> DivideConfig {
        DivideConfig {
            fractions: vec![0.5],
            ..DivideConfig::default()
        }
    }

    #[test]
    fn fixed_fraction_splits_square_in_half() {
        let cfg = halves();
        let mut rng = StdRng::seed_from_u64(42);

        let split = subdivide(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Orientation::Vertical,
            1.0,
            7.0,
            &cfg,
            &mut rng,
        )
        .expect("probability 1.0 always splits");

        assert_eq!(split.left.rect, Rect::new(0.0, 0.0, 50.0, 100.0));
        assert_eq!(split.right.rect, Rect::new(50.0, 0.0, 50.0, 100.0));
        assert!((split.left.stroke - 5.6).abs() < 1e-5);
        assert_eq!(split.left.stroke, split.right.stroke);
        assert_eq!(split.left.orientation, Orientation::Horizontal);
        assert_eq!(
            split.boundary,
            LineSegment::new(Vec2::new(50.0, 0.0), Vec2::new(50.0, 100.0))
        );
        assert!((split.probability - 0.9).abs() < 1e-6);
    }

    #[test]
    fn horizontal_split_cuts_height() {
        let cfg = halves();
        let mut rng = StdRng::seed_from_u64(1);

        let split = subdivide(
            Rect::new(10.0, 20.0, 40.0, 60.0),
            Orientation::Horizontal,
            1.0,
            2.0,
            &cfg,
            &mut rng,
        )
        .unwrap();

        assert_eq!(split.left.rect, Rect::new(10.0, 20.0, 40.0, 30.0));
        assert_eq!(split.right.rect, Rect::new(10.0, 50.0, 40.0, 30.0));
        assert_eq!(split.left.orientation, Orientation::Vertical);
        assert_eq!(split.boundary.length(), 40.0);
    }

    #[test]
    fn undersized_regions_never_split() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        for seed_rect in [
            Rect::new(0.0, 0.0, 4.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 5.0),
            Rect::new(0.0, 0.0, 5.0, 5.0),
            Rect::new(0.0, 0.0, 0.0, 100.0),
            Rect::new(0.0, 0.0, -50.0, -50.0),
        ] {
            for _ in 0..50 {
                for o in [Orientation::Vertical, Orientation::Horizontal] {
                    assert!(subdivide(seed_rect, o, 1.0, 7.0, &cfg, &mut rng).is_none());
                }
            }
        }
    }

    #[test]
    fn undersized_regions_do_not_consume_draws() {
        let cfg = DivideConfig::default();
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);

        assert!(
            subdivide(
                Rect::new(0.0, 0.0, 4.0, 40.0),
                Orientation::Vertical,
                1.0,
                1.0,
                &cfg,
                &mut a
            )
            .is_none()
        );
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn non_positive_probability_never_splits() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);

        for p in [0.0, -0.1, f32::NAN] {
            for _ in 0..100 {
                assert!(subdivide(rect, Orientation::Vertical, p, 3.0, &cfg, &mut rng).is_none());
            }
        }
    }

    #[test]
    fn children_widths_sum_to_parent() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let parent = Rect::new(13.0, 7.0, 301.0, 217.0);

        for _ in 0..200 {
            let v = subdivide(parent, Orientation::Vertical, 1.0, 7.0, &cfg, &mut rng).unwrap();
            assert!((v.left.rect.width + v.right.rect.width - parent.width).abs() < 1e-4);
            assert_eq!(v.left.rect.height, parent.height);
            assert_eq!(v.right.rect.x, v.left.rect.x + v.left.rect.width);

            let h = subdivide(parent, Orientation::Horizontal, 1.0, 7.0, &cfg, &mut rng).unwrap();
            assert!((h.left.rect.height + h.right.rect.height - parent.height).abs() < 1e-4);
            assert_eq!(h.left.rect.width, parent.width);
        }
    }

    #[test]
    fn exact_fractions_lose_nothing() {
        let cfg = DivideConfig {
            fractions: vec![0.25, 0.5, 0.75],
            ..DivideConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let parent = Rect::new(0.0, 0.0, 256.0, 128.0);

        for _ in 0..50 {
            let s = subdivide(parent, Orientation::Vertical, 1.0, 7.0, &cfg, &mut rng).unwrap();
            assert_eq!(s.left.rect.width + s.right.rect.width, parent.width);
            assert_eq!(s.left.rect.area() + s.right.rect.area(), parent.area());
        }
    }

    #[test]
    fn fraction_is_drawn_from_table() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let f = pick_fraction(&cfg.fractions, &mut rng);
            assert!(cfg.fractions.contains(&f));
        }
        assert_eq!(pick_fraction(&[], &mut rng), 0.5);
    }

    #[test]
    fn recursion_chain_decays_and_terminates() {
        // Follow the left child down with an always-splitting table.
        let cfg = halves();
        let mut rng = StdRng::seed_from_u64(99);
        let mut rect = Rect::new(0.0, 0.0, 1.0e6, 1.0e6);
        let mut orientation = Orientation::Vertical;
        let mut probability = 1.0;
        let mut stroke = 7.0;
        let mut depth = 0;

        while let Some(split) = subdivide(rect, orientation, probability, stroke, &cfg, &mut rng) {
            assert!((probability - split.probability - 0.1).abs() < 1e-6);
            assert!(split.left.stroke <= stroke);
            assert_eq!(split.left.stroke, (stroke * 0.8).max(1.0));
            assert_eq!(split.left.orientation, orientation.flipped());

            rect = split.left.rect;
            orientation = split.left.orientation;
            probability = split.probability;
            stroke = split.left.stroke;
            depth += 1;
            assert!(depth <= 10, "recursion should end once probability hits zero");
        }
    }

    #[test]
    fn angled_split_places_children_on_diagonal() {
        let cfg = DivideConfig {
            fractions: vec![0.25],
            ..DivideConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let region = RectRegion {
            rect: Rect::new(0.0, 0.0, 200.0, 100.0),
            stroke: 7.0,
            orientation: Orientation::Vertical,
            style: RectStyle::Angled,
        };

        let split = split_angled(&region, 1.0, &cfg, &mut rng).unwrap();
        let [Region::Rect(a), Region::Rect(b)] = split.children else {
            panic!("angled split must yield rectangles");
        };

        assert_eq!(a.rect, Rect::new(0.0, 0.0, 50.0, 25.0));
        assert_eq!(b.rect, Rect::new(50.0, 25.0, 150.0, 75.0));
        assert_eq!(a.style, RectStyle::Angled);
        assert_eq!(a.orientation, Orientation::Horizontal);
        assert_eq!(
            split.boundary,
            Boundary::Diagonals([
                LineSegment::new(Vec2::ZERO, Vec2::new(200.0, 100.0)),
                LineSegment::new(Vec2::new(200.0, 0.0), Vec2::new(0.0, 100.0)),
            ])
        );
    }

    #[test]
    fn circle_split_nests_and_complements() {
        let cfg = DivideConfig {
            fractions: vec![0.25],
            ..DivideConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let circle = CircleRegion {
            center: Vec2::new(100.0, 100.0),
            radius: 80.0,
            stroke: 7.0,
        };

        let split = split_circle(&circle, 1.0, &cfg, &mut rng).unwrap();
        let [Region::Circle(inner), Region::Circle(outer)] = split.children else {
            panic!("circle split must yield circles");
        };

        assert_eq!(inner.center, circle.center);
        assert_eq!(inner.radius, 20.0);
        assert_eq!(outer.radius, 60.0);
        assert_eq!(outer.center, Vec2::new(160.0, 100.0));
        assert_eq!(inner.stroke, outer.stroke);
        assert!(inner.stroke < circle.stroke);
        assert_eq!(split.boundary, Boundary::Circle(inner));
    }

    #[test]
    fn tiny_or_malformed_circles_never_split() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        for radius in [5.0, 1.0, 0.0, -10.0, f32::NAN] {
            let c = CircleRegion {
                center: Vec2::ZERO,
                radius,
                stroke: 1.0,
            };
            assert!(split_circle(&c, 1.0, &cfg, &mut rng).is_none());
        }
    }

    #[test]
    fn undersized_or_malformed_angled_rects_never_split() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let angled = |rect: Rect| RectRegion {
            rect,
            stroke: 7.0,
            orientation: Orientation::Vertical,
            style: RectStyle::Angled,
        };

        for rect in [
            Rect::new(0.0, 0.0, 5.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 4.0),
            Rect::new(0.0, 0.0, -50.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, f32::NAN),
            Rect::new(0.0, 0.0, f32::NAN, f32::NAN),
        ] {
            for _ in 0..20 {
                assert!(split_angled(&angled(rect), 1.0, &cfg, &mut rng).is_none());
            }
        }

        let big = angled(Rect::new(0.0, 0.0, 100.0, 100.0));
        for p in [0.0, -0.5, f32::NAN] {
            for _ in 0..20 {
                assert!(split_angled(&big, p, &cfg, &mut rng).is_none());
            }
        }
    }

    #[test]
    fn split_region_dispatches_by_style() {
        let cfg = halves();
        let mut rng = StdRng::seed_from_u64(17);
        let straight = Region::Rect(RectRegion {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            stroke: 7.0,
            orientation: Orientation::Vertical,
            style: RectStyle::Straight,
        });

        let split = split_region(&straight, 1.0, &cfg, &mut rng).unwrap();
        assert!(matches!(split.boundary, Boundary::Line(_)));
        assert_eq!(split.children[0].size_key(), 5000.0);
    }
}
