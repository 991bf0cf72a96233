use super::{entry_x, has_exited, Entity};
use crate::geom::{Rgba, Size, Vec2};
use crate::random::{between, direction, unit};
use crate::surface::{Path, Surface};
use rand::Rng;

/// How far past either edge a fish swims before it is recycled.
pub(crate) const EDGE_MARGIN: f32 = 50.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Fish {
    pub(crate) pos: Vec2,
    /// +1 swims right, -1 swims left.
    pub(crate) direction: f32,
    pub(crate) speed: f32,
    pub(crate) size: f32,
    pub(crate) color: Rgba,
}

impl Fish {
    pub(crate) fn new<R: Rng + ?Sized>(bounds: Size, rng: &mut R) -> Self {
        let mut fish = Self {
            pos: Vec2::default(),
            direction: 1.0,
            speed: 0.0,
            size: 0.0,
            color: Rgba::WHITE,
        };
        fish.reset(bounds, rng);
        fish.pos.y = unit(rng) * bounds.height * 0.8;
        fish.size = between(rng, 15.0, 40.0);
        fish.color = Rgba::from_hsl(unit(rng) * 360.0, 0.7, 0.5);
        fish.speed = between(rng, 1.0, 3.0);
        fish
    }

    /// Re-enter from a freshly chosen edge.
    fn reset<R: Rng + ?Sized>(&mut self, bounds: Size, rng: &mut R) {
        self.direction = direction(rng);
        self.pos.x = entry_x(self.direction, bounds.width, EDGE_MARGIN);
    }
}

impl Entity for Fish {
    fn update<R: Rng + ?Sized>(&mut self, bounds: Size, rng: &mut R) {
        self.pos.x += self.speed * self.direction;
        if has_exited(self.pos.x, self.direction, bounds.width, EDGE_MARGIN) {
            self.reset(bounds, rng);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let s = self.size;
        surface.save();
        surface.translate(self.pos.x, self.pos.y);
        surface.scale(self.direction, 1.0);

        surface.fill_ellipse(Vec2::new(0.0, 0.0), s, s / 2.0, self.color);

        let tail = Path::new()
            .move_to(-s, 0.0)
            .line_to(-s * 1.5, -s / 2.0)
            .line_to(-s * 1.5, s / 2.0)
            .close();
        surface.fill_path(&tail, self.color);

        surface.restore();
    }
}
