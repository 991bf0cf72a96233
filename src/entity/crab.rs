use super::{entry_x, has_exited, Entity};
use crate::geom::{Rgba, Size, Vec2};
use crate::random::{between, direction};
use crate::surface::{Path, Stroke, Surface};
use rand::Rng;

const SHELL: Rgba = Rgba::rgb(0xd9, 0x4f, 0x2b);
const CLAW: Rgba = Rgba::rgb(0xe8, 0x62, 0x3a);
const EYE: Rgba = Rgba::rgb(0xf4, 0xf1, 0xde);
const LEGS_PER_SIDE: usize = 3;
const GAIT_STEP: f32 = 0.1;
const GAIT_SWING: f32 = 0.2;
const BOB_HEIGHT: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Crab {
    pub(crate) pos: Vec2,
    pub(crate) direction: f32,
    pub(crate) speed: f32,
    pub(crate) leg_phase: f32,
    pub(crate) body_bob: f32,
    pub(crate) size: f32,
}

impl Crab {
    pub(crate) fn new<R: Rng + ?Sized>(bounds: Size, rng: &mut R) -> Self {
        let size = between(rng, 14.0, 24.0);
        let mut crab = Self {
            pos: Vec2::new(0.0, ground_y(bounds, size)),
            direction: 1.0,
            speed: 0.0,
            leg_phase: 0.0,
            body_bob: 0.0,
            size,
        };
        crab.reset(bounds, rng);
        crab
    }

    pub(crate) fn margin(&self) -> f32 {
        self.size * 2.0
    }

    fn reset<R: Rng + ?Sized>(&mut self, bounds: Size, rng: &mut R) {
        self.direction = direction(rng);
        self.pos.x = entry_x(self.direction, bounds.width, self.margin());
        self.speed = between(rng, 0.3, 0.9);
    }
}

/// Crabs walk along the floor; the body sits one size above the bottom edge.
fn ground_y(bounds: Size, size: f32) -> f32 {
    bounds.height - size
}

impl Entity for Crab {
    fn update<R: Rng + ?Sized>(&mut self, bounds: Size, rng: &mut R) {
        self.pos.x += self.speed * self.direction;
        self.pos.y = ground_y(bounds, self.size);
        self.leg_phase += GAIT_STEP;
        self.body_bob += GAIT_STEP;

        if has_exited(self.pos.x, self.direction, bounds.width, self.margin()) {
            self.reset(bounds, rng);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let s = self.size;
        let bob = self.body_bob.sin() * BOB_HEIGHT;

        surface.save();
        surface.translate(self.pos.x, self.pos.y + bob);
        surface.scale(self.direction, 1.0);

        // Legs first so the shell covers their roots.
        let leg = Stroke::new(SHELL, (s * 0.12).max(1.0)).round();
        for i in 0..LEGS_PER_SIDE {
            let swing = (self.leg_phase + i as f32).sin() * GAIT_SWING;
            let root_y = s * (0.05 + 0.18 * i as f32);
            let reach = s * 0.75;
            for side in [-1.0f32, 1.0] {
                // Opposite sides swing against each other.
                let angle = 0.35 + 0.25 * i as f32 + swing * side;
                let root = Vec2::new(side * s * 0.45, root_y);
                let knee = root + Vec2::new(side * angle.cos() * reach * 0.6, -angle.sin() * reach * 0.3);
                let foot = knee + Vec2::new(side * reach * 0.4, reach * 0.55);
                let path = Path::new()
                    .move_to(root.x, root.y)
                    .line_to(knee.x, knee.y)
                    .line_to(foot.x, foot.y);
                surface.stroke_path(&path, &leg);
            }
        }

        surface.fill_circle(Vec2::new(0.0, 0.0), s * 0.5, SHELL);

        // Claws sit up and out, slightly ahead of centre.
        let claw_r = s * 0.24;
        surface.fill_circle(Vec2::new(s * 0.78, -s * 0.42), claw_r * 1.1, CLAW);
        surface.fill_circle(Vec2::new(-s * 0.62, -s * 0.42), claw_r, CLAW);

        let eye_r = (s * 0.09).max(1.0);
        surface.fill_circle(Vec2::new(s * 0.28, -s * 0.46), eye_r, EYE);
        surface.fill_circle(Vec2::new(s * 0.02, -s * 0.46), eye_r, EYE);

        surface.restore();
    }
}
