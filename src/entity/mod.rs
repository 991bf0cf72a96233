mod bubble;
mod crab;
mod fish;
mod seaweed;

pub(crate) use bubble::Bubble;
pub(crate) use crab::Crab;
pub(crate) use fish::Fish;
pub(crate) use seaweed::Seaweed;

use crate::geom::Size;
use crate::surface::Surface;
use rand::Rng;

/// The two-step contract the scene drives every tick.
///
/// `update` advances motion state by one tick against the current surface
/// bounds. `draw` renders the current state and must not mutate it.
pub(crate) trait Entity {
    fn update<R: Rng + ?Sized>(&mut self, bounds: Size, rng: &mut R);
    fn draw(&self, surface: &mut dyn Surface);
}

/// Where a side-walking entity re-enters after leaving the band `[-margin, width + margin]`.
pub(crate) fn entry_x(direction: f32, width: f32, margin: f32) -> f32 {
    if direction < 0.0 {
        width + margin
    } else {
        -margin
    }
}

/// True once an entity moving in `direction` has crossed the far edge of its band.
pub(crate) fn has_exited(x: f32, direction: f32, width: f32, margin: f32) -> bool {
    (direction > 0.0 && x > width + margin) || (direction < 0.0 && x < -margin)
}
