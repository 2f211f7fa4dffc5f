//! Work queue of pending rectangle splits.
//!
//! Recursive subdivision is flattened into a FIFO of [`SplitTask`]s: a
//! successful split enqueues its two children instead of recursing, so a
//! driver can process one task (or a small batch) per tick and render in
//! between. The queue always drains, because every child task carries a
//! probability that is `probability_decay` lower than its parent's.

use crate::{
    config::DivideConfig,
    region::{Rect, RectRegion, RectStyle},
    subdivide::{RectSplit, subdivide},
    types::Orientation,
};
use log::debug;
use rand::Rng;
use std::collections::VecDeque;

/// One deferred call to [`subdivide`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitTask {
    pub rect: Rect,
    pub orientation: Orientation,
    pub probability: f32,
    pub stroke: f32,
}

impl SplitTask {
    /// Task for a region from the collection, tried with `probability`.
    pub fn for_region(region: &RectRegion, probability: f32) -> Self {
        Self {
            rect: region.rect,
            orientation: region.orientation,
            probability,
            stroke: region.stroke,
        }
    }

    /// The region this task describes, as it would sit in a collection.
    pub fn region(&self) -> RectRegion {
        RectRegion {
            rect: self.rect,
            stroke: self.stroke,
            orientation: self.orientation,
            style: RectStyle::Straight,
        }
    }
}

/// Outcome of processing a single task.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TaskOutcome {
    /// The task split; both children were enqueued.
    Split { task: SplitTask, split: RectSplit },
    /// The task failed the split test and is final.
    Finished(SplitTask),
}

#[derive(Debug, Default)]
pub struct SplitQueue {
    tasks: VecDeque<SplitTask>,
}

impl SplitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: SplitTask) {
        self.tasks.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Pops the oldest task and runs one split step on it.
    ///
    /// ### Returns
    /// `None` if the queue is empty, otherwise what happened to the task.
    pub fn step(&mut self, cfg: &DivideConfig, rng: &mut impl Rng) -> Option<TaskOutcome> {
        let task = self.tasks.pop_front()?;

        let outcome = match subdivide(
            task.rect,
            task.orientation,
            task.probability,
            task.stroke,
            cfg,
            rng,
        ) {
            Some(split) => {
                for child in [split.left, split.right] {
                    self.tasks
                        .push_back(SplitTask::for_region(&child, split.probability));
                }
                TaskOutcome::Split { task, split }
            }
            None => TaskOutcome::Finished(task),
        };

        debug!("queue step, {} pending", self.tasks.len());
        Some(outcome)
    }

    /// Runs [`SplitQueue::step`] until the queue is empty or `limit`
    /// steps have run, collecting every outcome.
    pub fn drain(
        &mut self,
        cfg: &DivideConfig,
        rng: &mut impl Rng,
        limit: usize,
    ) -> Vec<TaskOutcome> {
        let mut out = Vec::with_capacity(self.tasks.len().min(limit));
        for _ in 0..limit {
            match self.step(cfg, rng) {
                Some(o) => out.push(o),
                None => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn root(probability: f32) -> SplitTask {
        SplitTask {
            rect: Rect::new(0.0, 0.0, 400.0, 300.0),
            orientation: Orientation::Vertical,
            probability,
            stroke: 7.0,
        }
    }

    #[test]
    fn step_on_empty_queue_is_none() {
        let mut q = SplitQueue::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(q.step(&DivideConfig::default(), &mut rng).is_none());
    }

    #[test]
    fn split_enqueues_both_children_with_decayed_probability() {
        let mut q = SplitQueue::new();
        let mut rng = StdRng::seed_from_u64(42);
        let cfg = DivideConfig::default();
        q.push(root(1.0));

        let outcome = q.step(&cfg, &mut rng).unwrap();

        assert!(matches!(outcome, TaskOutcome::Split { .. }));
        assert_eq!(q.len(), 2);
        for t in &q.tasks {
            assert!((t.probability - 0.9).abs() < 1e-6);
            assert_eq!(t.orientation, Orientation::Horizontal);
            assert!((t.stroke - 5.6).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_probability_task_finishes() {
        let mut q = SplitQueue::new();
        let mut rng = StdRng::seed_from_u64(42);
        q.push(root(0.0));

        let outcome = q.step(&DivideConfig::default(), &mut rng).unwrap();

        assert_eq!(outcome, TaskOutcome::Finished(root(0.0)));
        assert!(q.is_empty());
    }

    #[test]
    fn queue_always_drains() {
        let cfg = DivideConfig::default();
        for seed in 0..20 {
            let mut q = SplitQueue::new();
            let mut rng = StdRng::seed_from_u64(seed);
            q.push(SplitTask {
                rect: Rect::new(0.0, 0.0, 1.0e5, 1.0e5),
                ..root(1.0)
            });

            // A full binary tree of depth 10 has fewer than 2^11 nodes.
            let outcomes = q.drain(&cfg, &mut rng, 1 << 12);

            assert!(q.is_empty(), "seed {seed} left tasks behind");
            assert!(outcomes.len() < 1 << 11);

            let splits = outcomes
                .iter()
                .filter(|o| matches!(o, TaskOutcome::Split { .. }))
                .count();
            // Each split adds two tasks to the single root.
            assert_eq!(outcomes.len(), 1 + 2 * splits);
        }
    }

    #[test]
    fn drain_respects_limit() {
        let cfg = DivideConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut q = SplitQueue::new();
        q.push(root(1.0));

        let outcomes = q.drain(&cfg, &mut rng, 1);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(q.len(), 2);
    }
}
