use crate::canvas::PixelCanvas;
use crate::config::Settings;
use crate::geom::{Rgba, Vec2};
use crate::input::{collect_actions, Action};
use crate::scene::Aquarium;
use crate::surface::Surface;
use crate::term::{draw_text, CellBuffer, Terminal};
use crossterm::style::Color;
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};

const WATER: Rgba = Rgba::rgb(4, 38, 72);
const HUD_FG: Color = Color::Rgb {
    r: 170,
    g: 225,
    b: 235,
};
const HUD_BG: Color = Color::Rgb { r: 2, g: 20, b: 40 };

pub(crate) struct App {
    settings: Settings,
    term: Terminal,
    canvas: PixelCanvas,
    aquarium: Aquarium<StdRng>,
    paused: bool,
    show_hud: bool,
    should_quit: bool,
    fps_est: f32,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let term = Terminal::begin()?;
        let canvas = PixelCanvas::new(term.cols, term.rows, settings.pixel_scale);
        let aquarium = Aquarium::new(settings.scene(), canvas.size(), StdRng::from_entropy());
        info!(
            "terminal {}x{} -> surface {:.0}x{:.0}",
            term.cols,
            term.rows,
            canvas.size().width,
            canvas.size().height
        );

        Ok(Self {
            show_hud: settings.show_hud,
            settings,
            term,
            canvas,
            aquarium,
            paused: false,
            should_quit: false,
            fps_est: 0.0,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);

        let mut fps_acc = 0.0f32;
        let mut fps_frames = 0u32;
        let mut last = Instant::now();

        while !self.should_quit {
            let frame_start = Instant::now();

            for action in collect_actions(frame_dt)? {
                self.apply(action)?;
                if self.should_quit {
                    break;
                }
            }
            // Some terminals never report resizes; poll the size too.
            if self.term.resize_if_needed()? {
                self.rebuild_canvas();
            }

            if !self.paused {
                self.aquarium.tick(&mut self.canvas);
            }
            self.render()?;

            let now = Instant::now();
            fps_acc += (now - last).as_secs_f32();
            fps_frames += 1;
            last = now;
            if fps_acc >= 0.5 {
                self.fps_est = fps_frames as f32 / fps_acc;
                fps_acc = 0.0;
                fps_frames = 0;
            }

            spin_sleep(frame_dt, frame_start);
        }

        let stats = self.aquarium.stats();
        info!(
            "quit after {} ticks ({} ambient bubbles, {} from bursts)",
            stats.ticks, stats.ambient_spawned, stats.burst_spawned
        );
        self.term.end()
    }

    fn apply(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => self.paused = !self.paused,
            Action::ToggleHud => self.show_hud = !self.show_hud,
            Action::Burst { col, row } => {
                let at = self.canvas.surface_point(col, row);
                self.aquarium.on_pointer_down(at);
            }
            Action::BurstCentre => {
                let size = self.aquarium.bounds();
                self.aquarium
                    .on_pointer_down(Vec2::new(size.width / 2.0, size.height / 2.0));
            }
            Action::Resized { cols, rows } => {
                debug!("terminal resized to {cols}x{rows}");
                if self.term.resize_if_needed()? {
                    self.rebuild_canvas();
                }
            }
        }
        Ok(())
    }

    fn rebuild_canvas(&mut self) {
        self.canvas = PixelCanvas::new(self.term.cols, self.term.rows, self.settings.pixel_scale);
        self.aquarium.on_resize(self.canvas.size());
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.canvas
            .to_cells(&mut self.term.cur, WATER, self.settings.ink_alpha);
        if self.show_hud {
            self.draw_hud();
        }
        self.term.present()
    }

    fn draw_hud(&mut self) {
        let buf: &mut CellBuffer = &mut self.term.cur;
        if buf.h < 2 {
            return;
        }
        let aq = &self.aquarium;
        let stats = aq.stats();
        let line = format!(
            " Aquarium | fish {} | seaweed {} | crabs {} | bubbles {} | ambient {} burst {} | tick {} | {} | {:.0} fps ",
            aq.fish.len(),
            aq.seaweed.len(),
            aq.crabs.len(),
            aq.bubbles.len(),
            stats.ambient_spawned,
            stats.burst_spawned,
            stats.ticks,
            if self.paused { "paused" } else { "running" },
            self.fps_est
        );
        let hint = " click: bubbles  B: burst  P/space: pause  H: hud  Q: quit ";

        draw_text(buf, 0, 0, &line, HUD_FG, HUD_BG, true);
        draw_text(buf, 0, 1, hint, HUD_FG, HUD_BG, false);
    }
}

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    let mut app = App::init(settings)?;
    app.run()
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
