//! Drawing seam between the sketches and whatever renders them.
//!
//! The sketches only ever talk to a [`Surface`]. [`Canvas`] is the
//! in-memory implementation: it records every call so a frontend can
//! replay the accumulated picture each frame, and tests can inspect it.

use crate::{region::LineSegment, types::Color};
use glam::Vec2;

pub trait Surface {
    fn line(&mut self, segment: LineSegment, width: f32, color: Color);
    fn rect_outline(&mut self, min: Vec2, size: Vec2, width: f32, color: Color);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn circle_outline(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    /// Wipes everything drawn so far and fills the surface with `background`.
    fn clear(&mut self, background: Color);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line {
        segment: LineSegment,
        width: f32,
        color: Color,
    },
    RectOutline {
        min: Vec2,
        size: Vec2,
        width: f32,
        color: Color,
    },
    FillRect {
        min: Vec2,
        size: Vec2,
        color: Color,
    },
    CircleOutline {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
}

/// Recording [`Surface`].
#[derive(Debug, Default)]
pub struct Canvas {
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of line commands; handy for counting drawn cuts and segments.
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }
}

impl Surface for Canvas {
    fn line(&mut self, segment: LineSegment, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            segment,
            width,
            color,
        });
    }

    fn rect_outline(&mut self, min: Vec2, size: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::RectOutline {
            min,
            size,
            width,
            color,
        });
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect { min, size, color });
    }

    fn circle_outline(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.commands.push(DrawCommand::CircleOutline {
            center,
            radius,
            width,
            color,
        });
    }

    fn clear(&mut self, background: Color) {
        // Earlier commands are fully covered, so there is no point replaying them.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(background));
    }
}
