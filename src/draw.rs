//! Draw primitives emitted by scenes, one ordered list per frame.
//!
//! Coordinates are absolute canvas units (the viewport origin already
//! applied). The driver converts them to its own pixel format.

use crate::color::Rgba;
use glam::DVec2;

/// The rectangle a scene draws into this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Viewport {
    pub fn new(origin: DVec2, size: DVec2) -> Self {
        Viewport { origin, size }
    }

    /// Viewport anchored at (0, 0).
    pub fn sized(width: f64, height: f64) -> Self {
        Viewport {
            origin: DVec2::ZERO,
            size: DVec2::new(width, height),
        }
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size * 0.5
    }

    /// Smaller of width and height; scenes scale relative sizes against it.
    pub fn base_size(&self) -> f64 {
        self.size.min_element()
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x <= self.origin.x + self.size.x
            && point.y <= self.origin.y + self.size.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    CircleFilled {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
    Circle {
        center: DVec2,
        radius: f64,
        color: Rgba,
        thickness: f64,
    },
    RectFilled {
        min: DVec2,
        max: DVec2,
        color: Rgba,
    },
    Rect {
        min: DVec2,
        max: DVec2,
        color: Rgba,
        thickness: f64,
    },
    Line {
        from: DVec2,
        to: DVec2,
        color: Rgba,
        thickness: f64,
    },
}

impl DrawCommand {
    pub fn color(&self) -> Rgba {
        match *self {
            DrawCommand::CircleFilled { color, .. }
            | DrawCommand::Circle { color, .. }
            | DrawCommand::RectFilled { color, .. }
            | DrawCommand::Rect { color, .. }
            | DrawCommand::Line { color, .. } => color,
        }
    }
}

/// Ordered primitives for one frame, painted back to front.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        DrawList::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        DrawList {
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn circle_filled(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::CircleFilled { center, radius, color });
    }

    pub fn circle(&mut self, center: DVec2, radius: f64, color: Rgba, thickness: f64) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            thickness,
        });
    }

    pub fn rect_filled(&mut self, min: DVec2, max: DVec2, color: Rgba) {
        self.commands.push(DrawCommand::RectFilled { min, max, color });
    }

    pub fn rect(&mut self, min: DVec2, max: DVec2, color: Rgba, thickness: f64) {
        self.commands.push(DrawCommand::Rect {
            min,
            max,
            color,
            thickness,
        });
    }

    pub fn line(&mut self, from: DVec2, to: DVec2, color: Rgba, thickness: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            thickness,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
