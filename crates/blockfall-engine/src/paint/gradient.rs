use crate::coords::Vec2;

use super::Color;

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

/// A single gradient stop at `t` in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Linear gradient over a node's surface.
///
/// `start` and `end` are in surface UV space (`0..1` on both axes, +V up).
/// Stops are premultiplied linear colors.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        Self {
            start,
            end,
            stops,
            spread,
        }
    }

    /// Two-stop gradient from the top edge (`top`) to the bottom edge (`bottom`).
    pub fn vertical(top: Color, bottom: Color) -> Self {
        Self::new(
            Vec2::new(0.5, 1.0),
            Vec2::new(0.5, 0.0),
            vec![ColorStop::new(0.0, top), ColorStop::new(1.0, bottom)],
            SpreadMode::Pad,
        )
    }

    /// Returns true when the gradient definition is structurally usable.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.stops.iter().all(|s| s.t.is_finite() && s.color.is_finite())
            && self.stops.len() >= 2
            && (self.end.x != self.start.x || self.end.y != self.start.y)
    }

    /// Colour at parameter `t`, applying `spread` outside `[0, 1]`.
    ///
    /// Assumes stops are sorted by `t`. Returns transparent when there are no stops.
    pub fn sample(&self, t: f32) -> Color {
        let t = match self.spread {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t.rem_euclid(1.0),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        };

        let Some(first) = self.stops.first() else {
            return Color::transparent();
        };
        if t <= first.t {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                let k = if span > 0.0 { (t - a.t) / span } else { 1.0 };
                return Color::from_premul_lerp(a.color, b.color, k);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}
