use crate::entity::{Bubble, Crab, Entity, Fish, Seaweed};
use crate::geom::{Rgba, Size, Vec2};
use crate::random::{between, count_in, unit};
use crate::surface::{Paint, RadialGradient, Surface};
use log::{debug, trace};
use rand::RngCore;

const BURST_MIN: usize = 3;
const BURST_MAX: usize = 6;
const BURST_JITTER: f32 = 10.0;
const LIGHT_PEAK: f32 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SceneConfig {
    pub(crate) fish_count: usize,
    pub(crate) seaweed_count: usize,
    pub(crate) crab_count: usize,
    /// Chance per tick of one ambient bubble rising from the floor.
    pub(crate) bubble_chance: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fish_count: 10,
            seaweed_count: 8,
            crab_count: 2,
            bubble_chance: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SceneStats {
    pub(crate) ticks: u64,
    pub(crate) ambient_spawned: u64,
    pub(crate) burst_spawned: u64,
}

/// Owns every entity and advances them one frame per `tick`.
pub(crate) struct Aquarium<R: RngCore> {
    rng: R,
    bounds: Size,
    config: SceneConfig,
    pub(crate) fish: Vec<Fish>,
    pub(crate) bubbles: Vec<Bubble>,
    pub(crate) seaweed: Vec<Seaweed>,
    pub(crate) crabs: Vec<Crab>,
    stats: SceneStats,
}

impl<R: RngCore> Aquarium<R> {
    pub(crate) fn new(config: SceneConfig, bounds: Size, mut rng: R) -> Self {
        let fish = (0..config.fish_count)
            .map(|_| Fish::new(bounds, &mut rng))
            .collect();
        let seaweed = (0..config.seaweed_count)
            .map(|i| Seaweed::new(bounds, i, config.seaweed_count, &mut rng))
            .collect();
        let crabs = (0..config.crab_count)
            .map(|_| Crab::new(bounds, &mut rng))
            .collect();

        debug!(
            "aquarium {}x{}: {} fish, {} seaweed, {} crabs",
            bounds.width, bounds.height, config.fish_count, config.seaweed_count, config.crab_count
        );

        Self {
            rng,
            bounds,
            config,
            fish,
            bubbles: Vec::new(),
            seaweed,
            crabs,
            stats: SceneStats::default(),
        }
    }

    pub(crate) fn bounds(&self) -> Size {
        self.bounds
    }

    pub(crate) fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Existing entities keep their positions; the next update sees the new bounds.
    pub(crate) fn on_resize(&mut self, bounds: Size) {
        debug!(
            "resize {}x{} -> {}x{}",
            self.bounds.width, self.bounds.height, bounds.width, bounds.height
        );
        self.bounds = bounds;
    }

    /// Releases a burst of bubbles at a surface-local point.
    pub(crate) fn on_pointer_down(&mut self, at: Vec2) {
        let n = count_in(&mut self.rng, BURST_MIN, BURST_MAX);
        for _ in 0..n {
            let jitter = between(&mut self.rng, -BURST_JITTER, BURST_JITTER);
            let origin = Vec2::new(at.x + jitter, at.y);
            let bubble = Bubble::new(self.bounds, Some(origin), &mut self.rng);
            self.bubbles.push(bubble);
        }
        self.stats.burst_spawned += n as u64;
        debug!("burst of {n} at ({:.1}, {:.1})", at.x, at.y);
    }

    /// One frame. Draw order is back to front.
    pub(crate) fn tick(&mut self, surface: &mut dyn Surface) {
        let bounds = self.bounds;
        self.stats.ticks += 1;

        surface.clear();
        paint_light(surface, bounds);

        for weed in &mut self.seaweed {
            weed.update(bounds, &mut self.rng);
            weed.draw(surface);
        }

        for fish in &mut self.fish {
            fish.update(bounds, &mut self.rng);
            fish.draw(surface);
        }

        if unit(&mut self.rng) < self.config.bubble_chance {
            let bubble = Bubble::new(bounds, None, &mut self.rng);
            trace!("ambient bubble at x={:.1}", bubble.pos.x);
            self.bubbles.push(bubble);
            self.stats.ambient_spawned += 1;
        }

        self.bubbles.retain(|b| !b.is_dead());
        for bubble in &mut self.bubbles {
            bubble.update(bounds, &mut self.rng);
            bubble.draw(surface);
        }

        for crab in &mut self.crabs {
            crab.update(bounds, &mut self.rng);
            crab.draw(surface);
        }
    }
}

/// Soft daylight from the middle of the top edge, fading out by the floor.
fn paint_light(surface: &mut dyn Surface, bounds: Size) {
    let gradient = RadialGradient::new(Vec2::new(bounds.width / 2.0, 0.0), bounds.height)
        .stop(0.0, Rgba::WHITE.with_alpha(LIGHT_PEAK))
        .stop(1.0, Rgba::WHITE.with_alpha(0.0));
    surface.fill_rect(Vec2::new(0.0, 0.0), bounds, &Paint::Radial(gradient));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRng;
    use crate::surface::{DrawCommand, Recorder};
    use rand::{rngs::StdRng, SeedableRng};

    const BOUNDS: Size = Size::new(800.0, 600.0);

    fn empty_config() -> SceneConfig {
        SceneConfig {
            fish_count: 0,
            seaweed_count: 0,
            crab_count: 0,
            ..SceneConfig::default()
        }
    }

    #[test]
    fn initial_population() {
        let aq = Aquarium::new(SceneConfig::default(), BOUNDS, ScriptedRng::constant(0.9));
        assert_eq!(aq.fish.len(), 10);
        assert_eq!(aq.seaweed.len(), 8);
        assert_eq!(aq.crabs.len(), 2);
        assert!(aq.bubbles.is_empty());
        for (i, weed) in aq.seaweed.iter().enumerate() {
            let want = 800.0 / 9.0 * (i + 1) as f32;
            assert!((weed.x - want).abs() < 1e-3);
        }
    }

    #[test]
    fn pointer_burst_adds_jittered_bubbles_at_pointer_height() {
        let mut aq = Aquarium::new(empty_config(), BOUNDS, ScriptedRng::constant(0.0));
        // 0.3 picks a burst of four; each bubble takes one jitter draw plus four attribute draws.
        let mut script = vec![0.3];
        for jitter in [0.0, 0.25, 0.75, 0.999] {
            script.extend([jitter, 0.5, 0.5, 0.5, 0.5]);
        }
        aq.rng = ScriptedRng::new(script, 0.0);

        aq.on_pointer_down(Vec2::new(250.0, 120.0));
        assert_eq!(aq.bubbles.len(), 4);
        assert_eq!(aq.stats().burst_spawned, 4);
        for b in &aq.bubbles {
            assert_eq!(b.pos.y, 120.0);
            assert!(b.pos.x >= 240.0 && b.pos.x <= 260.0, "x = {}", b.pos.x);
        }
        assert_eq!(aq.bubbles[0].pos.x, 240.0);
        assert_eq!(aq.bubbles[1].pos.x, 245.0);
    }

    #[test]
    fn burst_size_is_three_to_six() {
        let mut aq = Aquarium::new(empty_config(), BOUNDS, StdRng::seed_from_u64(3));
        for _ in 0..200 {
            let before = aq.bubbles.len();
            aq.on_pointer_down(Vec2::new(400.0, 300.0));
            let added = aq.bubbles.len() - before;
            assert!((3..=6).contains(&added));
        }
    }

    #[test]
    fn ambient_spawns_match_draws_below_chance() {
        // Decision draws land on 0.005, 0.015, ... 0.995; a spawn eats five more draws.
        struct Cycle(u32);
        impl Cycle {
            fn next(&mut self) -> f32 {
                let v = ((self.0 % 100) as f32 + 0.5) / 100.0;
                self.0 = self.0.wrapping_mul(7).wrapping_add(13);
                v
            }
        }

        let mut aq = Aquarium::new(empty_config(), BOUNDS, ScriptedRng::constant(0.0));
        let mut source = Cycle(1);
        let mut expected = 0u64;
        let mut rec = Recorder::new(800.0, 600.0);
        for _ in 0..100_000 {
            let decision = source.next();
            let mut script = vec![decision];
            if decision < 0.1 {
                expected += 1;
                script.extend([0.5, 0.5, 0.5, 0.5, 0.5]);
            }
            aq.rng = ScriptedRng::new(script, 0.0);
            aq.tick(&mut rec);
            rec.commands.clear();
        }
        assert!(expected > 0);
        assert_eq!(aq.stats().ambient_spawned, expected);
        assert_eq!(aq.stats().ticks, 100_000);
    }

    #[test]
    fn tick_draws_in_layer_order() {
        let config = SceneConfig {
            fish_count: 1,
            seaweed_count: 1,
            crab_count: 1,
            bubble_chance: 0.1,
        };
        let mut aq = Aquarium::new(config, BOUNDS, ScriptedRng::constant(0.2));
        aq.rng = ScriptedRng::new(vec![0.05], 0.2);
        let mut rec = Recorder::new(800.0, 600.0);
        aq.tick(&mut rec);
        let cmds = rec.take();

        assert_eq!(cmds[0], DrawCommand::Clear);
        assert!(matches!(cmds[1], DrawCommand::FillRect(_, _, Paint::Radial(_))));
        let stroke_path = cmds.iter().position(|c| matches!(c, DrawCommand::StrokePath(..))).unwrap();
        let fish_body = cmds.iter().position(|c| matches!(c, DrawCommand::FillEllipse(..))).unwrap();
        let bubble = cmds.iter().position(|c| matches!(c, DrawCommand::StrokeCircle(..))).unwrap();
        let crab_leg = cmds.iter().rposition(|c| matches!(c, DrawCommand::StrokePath(..))).unwrap();
        assert!(stroke_path < fish_body);
        assert!(fish_body < bubble);
        assert!(bubble < crab_leg);
    }

    #[test]
    fn light_overlay_is_centered_on_top_edge() {
        let mut rec = Recorder::new(800.0, 600.0);
        paint_light(&mut rec, BOUNDS);
        let DrawCommand::FillRect(origin, size, Paint::Radial(g)) = &rec.commands[0] else {
            panic!("expected a radial fill");
        };
        assert_eq!(*origin, Vec2::new(0.0, 0.0));
        assert_eq!(*size, BOUNDS);
        assert_eq!(g.center, Vec2::new(400.0, 0.0));
        assert_eq!(g.radius, 600.0);
        assert_eq!(g.stops[0].1.a, 0.2);
        assert_eq!(g.stops[1].1.a, 0.0);
    }

    #[test]
    fn resize_keeps_entities_in_place() {
        let mut aq = Aquarium::new(SceneConfig::default(), BOUNDS, StdRng::seed_from_u64(5));
        let fish_x: Vec<f32> = aq.fish.iter().map(|f| f.pos.x).collect();
        aq.on_resize(Size::new(400.0, 300.0));
        assert_eq!(aq.bounds(), Size::new(400.0, 300.0));
        let after: Vec<f32> = aq.fish.iter().map(|f| f.pos.x).collect();
        assert_eq!(fish_x, after);
    }

    #[test]
    fn recycling_uses_new_width_on_the_next_tick() {
        let config = SceneConfig {
            fish_count: 1,
            ..empty_config()
        };
        let mut aq = Aquarium::new(config, BOUNDS, ScriptedRng::constant(0.2));
        let narrow = Size::new(400.0, 300.0);
        aq.fish[0].pos.x = narrow.width + 49.0;
        aq.fish[0].direction = 1.0;
        aq.fish[0].speed = 2.0;

        aq.on_resize(narrow);
        // The recycle draw of 0.9 turns the fish left; the spawn draw then misses.
        aq.rng = ScriptedRng::new(vec![0.9], 0.9);
        let mut rec = Recorder::new(400.0, 300.0);
        aq.tick(&mut rec);

        let fish = &aq.fish[0];
        assert_eq!(fish.direction, -1.0);
        assert_eq!(fish.pos.x, narrow.width + 50.0);
        assert!(aq.bubbles.is_empty());
    }

    #[test]
    fn single_ambient_bubble_lifecycle() {
        let mut aq = Aquarium::new(SceneConfig::default(), BOUNDS, ScriptedRng::constant(0.9));
        assert_eq!(aq.fish.len(), 10);
        assert_eq!(aq.seaweed.len(), 8);
        assert_eq!(aq.crabs.len(), 2);
        assert_eq!(aq.bubbles.len(), 0);

        // Spawn draw, then x, radius, speed (0.5 -> 2.0), wobble speed, opacity.
        aq.rng = ScriptedRng::new(vec![0.05, 0.5, 0.5, 0.5, 0.5, 0.5], 0.9);
        let mut rec = Recorder::new(800.0, 600.0);
        aq.tick(&mut rec);
        assert_eq!(aq.bubbles.len(), 1);
        assert_eq!(aq.bubbles[0].speed, 2.0);
        // Already risen once during its first tick.
        assert_eq!(aq.bubbles[0].pos.y, 618.0);

        for _ in 1..320 {
            aq.tick(&mut rec);
            rec.commands.clear();
        }
        // 320 updates: y = 620 - 640 = -20, not yet past the line.
        assert_eq!(aq.bubbles.len(), 1);
        assert_eq!(aq.bubbles[0].pos.y, -20.0);
        assert!(!aq.bubbles[0].is_dead());

        aq.tick(&mut rec);
        assert_eq!(aq.bubbles.len(), 1);
        assert!(aq.bubbles[0].is_dead());

        aq.tick(&mut rec);
        assert!(aq.bubbles.is_empty());
        assert_eq!(aq.stats().ambient_spawned, 1);
    }

    #[test]
    fn dead_bubbles_are_gone_within_one_tick() {
        let mut aq = Aquarium::new(empty_config(), BOUNDS, StdRng::seed_from_u64(9));
        let mut rec = Recorder::new(800.0, 600.0);
        aq.on_pointer_down(Vec2::new(100.0, 5.0));
        for _ in 0..2_000 {
            let dead_before = aq.bubbles.iter().filter(|b| b.is_dead()).count();
            let total_before = aq.bubbles.len();
            aq.tick(&mut rec);
            rec.commands.clear();
            // Every bubble that was dead is gone; at most one ambient spawn was added.
            assert!(aq.bubbles.len() <= total_before - dead_before + 1);
            assert!(aq.bubbles.iter().all(|b| b.is_dead() == (b.pos.y < -20.0)));
        }
    }
}
