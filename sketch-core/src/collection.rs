use crate::{
    config::DivideConfig,
    region::Region,
    subdivide::{RegionSplit, split_region},
};
use log::debug;
use rand::Rng;

/// Working set of regions that may still be split.
#[derive(Debug, Default)]
pub struct RegionCollection {
    pub regions: Vec<Region>,
}

/// What a single [`RegionCollection::pick_and_advance`] call did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// Nothing was picked this tick (empty collection or the pick roll failed).
    Idle,
    /// The largest region was picked but did not split; it was dropped.
    Dropped(Region),
    /// The largest region was picked and replaced by its two children.
    Split { parent: Region, split: RegionSplit },
}

impl RegionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, region: impl Into<Region>) {
        self.regions.push(region.into());
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Orders regions by descending [`Region::size_key`]. The sort is
    /// stable, so equal-sized regions keep their insertion order.
    pub fn sort_largest_first(&mut self) {
        self.regions
            .sort_by(|a, b| b.size_key().total_cmp(&a.size_key()));
    }

    /// Performs one scheduling step over the whole collection.
    ///
    /// 1. Sort regions largest first.
    /// 2. With chance `cfg.pick_largest_chance`, take the largest region
    ///    out of the collection.
    /// 3. Split it once with probability `1.0` (no recursion) using its
    ///    stored orientation and stroke.
    /// 4. Push both children back, or drop the region if it did not split.
    ///
    /// A call therefore removes at most one region and inserts at most
    /// two, so the length changes by -1, 0 or +1.
    ///
    /// ### Parameters
    /// - `cfg` - Subdivision parameters and the pick chance.
    /// - `rng` - Injected random source.
    ///
    /// ### Returns
    /// What happened, so the caller can draw it.
    pub fn pick_and_advance(&mut self, cfg: &DivideConfig, rng: &mut impl Rng) -> Advance {
        if self.regions.is_empty() {
            return Advance::Idle;
        }

        self.sort_largest_first();

        if !(rng.random::<f32>() < cfg.pick_largest_chance) {
            return Advance::Idle;
        }

        let parent = self.regions.remove(0);
        match split_region(&parent, 1.0, cfg, rng) {
            Some(split) => {
                self.regions.extend(split.children);
                debug!(
                    "split largest region (stroke {}), {} regions",
                    parent.stroke(),
                    self.regions.len()
                );
                Advance::Split { parent, split }
            }
            None => {
                debug!(
                    "dropped largest region (stroke {}), {} regions",
                    parent.stroke(),
                    self.regions.len()
                );
                Advance::Dropped(parent)
            }
        }
    }
}
