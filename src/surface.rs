use crate::geom::{Rgba, Size, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LineCap {
    Butt,
    Round,
}

/// Stroke style. Consecutive segments of a stroked path always meet with round joins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Stroke {
    pub(crate) color: Rgba,
    pub(crate) width: f32,
    pub(crate) cap: LineCap,
}

impl Stroke {
    pub(crate) fn new(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Butt,
        }
    }

    pub(crate) fn round(mut self) -> Self {
        self.cap = LineCap::Round;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RadialGradient {
    pub(crate) center: Vec2,
    pub(crate) radius: f32,
    /// (offset in 0..1, color), sorted by offset.
    pub(crate) stops: Vec<(f32, Rgba)>,
}

impl RadialGradient {
    pub(crate) fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            stops: Vec::new(),
        }
    }

    pub(crate) fn stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push((offset.clamp(0.0, 1.0), color));
        self.stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }

    pub(crate) fn color_at(&self, p: Vec2) -> Rgba {
        let Some(&(first_off, first)) = self.stops.first() else {
            return Rgba::TRANSPARENT;
        };
        let t = if self.radius <= 1e-6 {
            1.0
        } else {
            (p - self.center).len() / self.radius
        };
        if t <= first_off {
            return first;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = (o1 - o0).max(1e-6);
                return c0.lerp(c1, (t - o0) / span);
            }
        }
        self.stops.last().map(|s| s.1).unwrap_or(first)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Paint {
    Solid(Rgba),
    Radial(RadialGradient),
}

impl Paint {
    pub(crate) fn color_at(&self, p: Vec2) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Radial(g) => g.color_at(p),
        }
    }
}

/// Polyline made of one or more subpaths.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Path {
    pub(crate) subpaths: Vec<Subpath>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Subpath {
    pub(crate) points: Vec<Vec2>,
    pub(crate) closed: bool,
}

impl Path {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn move_to(mut self, x: f32, y: f32) -> Self {
        self.subpaths.push(Subpath {
            points: vec![Vec2::new(x, y)],
            closed: false,
        });
        self
    }

    pub(crate) fn line_to(mut self, x: f32, y: f32) -> Self {
        match self.subpaths.last_mut() {
            Some(sp) if !sp.closed => sp.points.push(Vec2::new(x, y)),
            _ => return self.move_to(x, y),
        }
        self
    }

    pub(crate) fn close(mut self) -> Self {
        if let Some(sp) = self.subpaths.last_mut() {
            sp.closed = true;
        }
        self
    }
}

/// The drawing surface the scene renders into.
///
/// Coordinates are logical units with the origin at the top-left corner and y
/// growing downward. `size()` may change between frames.
pub(crate) trait Surface {
    fn size(&self) -> Size;
    fn clear(&mut self);

    fn save(&mut self);
    /// No-op when nothing was saved.
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, sx: f32, sy: f32);

    fn fill_rect(&mut self, origin: Vec2, size: Size, paint: &Paint);
    fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, r: f32, stroke: &Stroke);
    fn fill_path(&mut self, path: &Path, color: Rgba);
    fn stroke_path(&mut self, path: &Path, stroke: &Stroke);

    fn fill_circle(&mut self, center: Vec2, r: f32, color: Rgba) {
        self.fill_ellipse(center, r, r, color);
    }
}

#[cfg(test)]
pub(crate) use recorder::{DrawCommand, Recorder};
