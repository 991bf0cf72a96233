use super::Entity;
use crate::geom::{Rgba, Size, Vec2};
use crate::random::between;
use crate::surface::{Path, Stroke, Surface};
use rand::Rng;

pub(crate) const SEGMENTS: usize = 10;
const SWAY: f32 = 15.0;
const PHASE_STEP: f32 = 0.02;
const SEGMENT_LAG: f32 = 0.3;
const KELP: Rgba = Rgba::rgb(0x00, 0xaa, 0x55);

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Seaweed {
    /// Base position along the bottom edge.
    pub(crate) x: f32,
    /// Per segment: x is the animated sway, y the fixed height above the base.
    pub(crate) points: [Vec2; SEGMENTS],
    pub(crate) time: f32,
    pub(crate) width: f32,
}

impl Seaweed {
    /// Stalk `index` of `count`, spaced evenly across the width.
    pub(crate) fn new<R: Rng + ?Sized>(bounds: Size, index: usize, count: usize, rng: &mut R) -> Self {
        let spacing = bounds.width / (count + 1) as f32;
        let rise = bounds.height / SEGMENTS as f32;
        let mut points = [Vec2::default(); SEGMENTS];
        for (i, p) in points.iter_mut().enumerate() {
            p.y = rise * i as f32;
        }
        Self {
            x: spacing * (index + 1) as f32,
            points,
            time: between(rng, 0.0, 100.0),
            width: between(rng, 20.0, 40.0),
        }
    }

    pub(crate) fn sway_at(time: f32, segment: usize) -> f32 {
        (time + segment as f32 * SEGMENT_LAG).sin() * SWAY
    }
}

impl Entity for Seaweed {
    fn update<R: Rng + ?Sized>(&mut self, _bounds: Size, _rng: &mut R) {
        self.time += PHASE_STEP;
        let time = self.time;
        for (i, p) in self.points.iter_mut().enumerate() {
            p.x = Self::sway_at(time, i);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let floor = surface.size().height;
        surface.save();
        surface.translate(self.x, floor);

        let path = self
            .points
            .iter()
            .fold(Path::new().move_to(0.0, 0.0), |path, p| path.line_to(p.x, -p.y));
        surface.stroke_path(&path, &Stroke::new(KELP, self.width).round());

        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRng;
    use crate::surface::{DrawCommand, LineCap, Recorder};

    const BOUNDS: Size = Size::new(800.0, 600.0);

    fn stalk(index: usize) -> Seaweed {
        let mut rng = ScriptedRng::new(vec![0.5, 0.5], 0.0);
        Seaweed::new(BOUNDS, index, 8, &mut rng)
    }

    #[test]
    fn stalks_are_spaced_by_ninths() {
        let xs: Vec<f32> = (0..8).map(|i| stalk(i).x).collect();
        for (i, x) in xs.iter().enumerate() {
            let want = 800.0 / 9.0 * (i + 1) as f32;
            assert!((x - want).abs() < 1e-3, "stalk {i}: {x} vs {want}");
        }
        // Eight stalks never reach the right edge.
        assert!((xs[7] - 6400.0 / 9.0).abs() < 1e-3);
    }

    #[test]
    fn construction_draws_phase_and_width() {
        let s = stalk(0);
        assert_eq!(s.time, 50.0);
        assert_eq!(s.width, 30.0);
        assert_eq!(s.points[0].y, 0.0);
        assert_eq!(s.points[9].y, 540.0);
    }

    #[test]
    fn heights_never_move_and_sway_follows_phase() {
        let mut s = stalk(3);
        let heights: Vec<f32> = s.points.iter().map(|p| p.y).collect();
        let mut rng = ScriptedRng::constant(0.0);
        for _ in 0..500 {
            s.update(BOUNDS, &mut rng);
            let now: Vec<f32> = s.points.iter().map(|p| p.y).collect();
            assert_eq!(now, heights);
            for (i, p) in s.points.iter().enumerate() {
                assert_eq!(p.x, (s.time + i as f32 * 0.3).sin() * 15.0);
            }
        }
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn draws_one_rounded_stroke_from_the_floor() {
        let mut s = stalk(0);
        let mut rng = ScriptedRng::constant(0.0);
        s.update(BOUNDS, &mut rng);

        let mut rec = Recorder::new(800.0, 600.0);
        s.draw(&mut rec);
        let cmds = rec.take();
        assert_eq!(cmds[1], DrawCommand::Translate(s.x, 600.0));
        let DrawCommand::StrokePath(path, stroke) = &cmds[2] else {
            panic!("expected a stroked path, got {:?}", cmds[2]);
        };
        assert_eq!(stroke.cap, LineCap::Round);
        assert_eq!(stroke.width, 30.0);
        let pts = &path.subpaths[0].points;
        assert_eq!(pts.len(), SEGMENTS + 1);
        assert_eq!(pts[0], Vec2::new(0.0, 0.0));
        assert_eq!(pts[10], Vec2::new(s.points[9].x, -540.0));

        s.draw(&mut rec);
        assert_eq!(cmds, rec.take());
    }
}
