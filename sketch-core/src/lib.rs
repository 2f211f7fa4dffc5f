//! Core library for generative subdivision sketches.
//!
//! Main components:
//! - [`subdivide`] — probabilistic rectangle / circle splitting.
//! - [`queue`] — work queue replacing recursive subdivision.
//! - [`collection`] — region working set and the largest-first scheduler.
//! - [`divided`] — driver for the divided-shapes sketches.
//! - [`branch`] — branch growth and the tree-sketch driver.
//! - [`surface`] — drawing seam and the recording canvas.
//! - [`region`] — rectangles, circles and line segments.
//! - [`config`] — tunable parameters and their validation.
//! - [`types`] — shared small types.

pub mod branch;
pub mod collection;
pub mod config;
pub mod divided;
pub mod queue;
pub mod region;
pub mod subdivide;
pub mod surface;
pub mod types;
