use super::Entity;
use crate::geom::{Rgba, Size, Vec2};
use crate::random::{between, unit};
use crate::surface::{Stroke, Surface};
use rand::Rng;

/// A bubble is dead once it has risen this far above the top edge.
pub(crate) const POP_Y: f32 = -20.0;
/// Ambient bubbles start this far below the bottom edge.
const SPAWN_DEPTH: f32 = 20.0;
const OUTLINE_WIDTH: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Bubble {
    pub(crate) pos: Vec2,
    pub(crate) radius: f32,
    pub(crate) speed: f32,
    pub(crate) wobble: f32,
    pub(crate) wobble_speed: f32,
    pub(crate) opacity: f32,
    dead: bool,
}

impl Bubble {
    /// `origin` places the bubble explicitly (pointer bursts); `None` picks a
    /// random x just below the bottom edge. An explicit zero coordinate is honored.
    pub(crate) fn new<R: Rng + ?Sized>(bounds: Size, origin: Option<Vec2>, rng: &mut R) -> Self {
        let pos = match origin {
            Some(p) => p,
            None => Vec2::new(unit(rng) * bounds.width, bounds.height + SPAWN_DEPTH),
        };
        Self {
            pos,
            radius: between(rng, 2.0, 10.0),
            speed: between(rng, 1.0, 3.0),
            wobble: 0.0,
            wobble_speed: between(rng, 0.02, 0.05),
            opacity: between(rng, 0.5, 1.0),
            dead: false,
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Entity for Bubble {
    fn update<R: Rng + ?Sized>(&mut self, _bounds: Size, _rng: &mut R) {
        self.pos.y -= self.speed;
        self.wobble += self.wobble_speed;
        self.pos.x += self.wobble.sin() * 0.5;

        if self.pos.y < POP_Y {
            self.dead = true;
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let stroke = Stroke::new(Rgba::WHITE.with_alpha(self.opacity), OUTLINE_WIDTH);
        surface.stroke_circle(self.pos, self.radius, &stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRng;
    use crate::surface::{DrawCommand, Recorder};

    const BOUNDS: Size = Size::new(800.0, 600.0);

    #[test]
    fn ambient_bubble_starts_below_bottom_edge() {
        let mut rng = ScriptedRng::new(vec![0.25, 0.5, 0.5, 0.0, 1.0 / 3.0], 0.0);
        let b = Bubble::new(BOUNDS, None, &mut rng);
        assert_eq!(b.pos, Vec2::new(200.0, 620.0));
        assert_eq!(b.radius, 6.0);
        assert_eq!(b.speed, 2.0);
        assert_eq!(b.wobble_speed, 0.02);
        assert!(!b.is_dead());
        assert_eq!(rng.draws, 5);
    }

    #[test]
    fn explicit_zero_origin_is_kept() {
        let mut rng = ScriptedRng::constant(0.7);
        let b = Bubble::new(BOUNDS, Some(Vec2::new(0.0, 0.0)), &mut rng);
        assert_eq!(b.pos, Vec2::new(0.0, 0.0));
        assert_eq!(rng.draws, 4);
    }

    #[test]
    fn rises_and_wobbles() {
        let mut rng = ScriptedRng::constant(0.0);
        let mut b = Bubble::new(BOUNDS, Some(Vec2::new(100.0, 300.0)), &mut rng);
        b.speed = 1.5;
        b.wobble_speed = 0.04;
        b.update(BOUNDS, &mut rng);
        assert_eq!(b.pos.y, 298.5);
        assert!((b.wobble - 0.04).abs() < 1e-6);
        assert!((b.pos.x - (100.0 + 0.04f32.sin() * 0.5)).abs() < 1e-5);
    }

    #[test]
    fn dies_only_below_pop_line_and_stays_dead() {
        let mut rng = ScriptedRng::constant(0.0);
        let mut b = Bubble::new(BOUNDS, Some(Vec2::new(10.0, -18.0)), &mut rng);
        b.speed = 2.0;
        b.update(BOUNDS, &mut rng);
        assert_eq!(b.pos.y, -20.0);
        assert!(!b.is_dead(), "exactly at the line is still alive");

        b.update(BOUNDS, &mut rng);
        assert!(b.is_dead());

        // Pushed back down, a dead bubble stays dead.
        b.pos.y = 500.0;
        b.update(BOUNDS, &mut rng);
        assert!(b.is_dead());
    }

    #[test]
    fn draw_is_a_single_stroked_circle() {
        let mut rng = ScriptedRng::constant(0.0);
        let b = Bubble::new(BOUNDS, Some(Vec2::new(40.0, 50.0)), &mut rng);
        let mut rec = Recorder::new(800.0, 600.0);
        b.draw(&mut rec);
        b.draw(&mut rec);
        let cmds = rec.take();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], cmds[1]);
        match &cmds[0] {
            DrawCommand::StrokeCircle(c, r, s) => {
                assert_eq!(*c, Vec2::new(40.0, 50.0));
                assert_eq!(*r, 2.0);
                assert_eq!(s.color.a, 0.5);
                assert_eq!(s.width, 2.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
