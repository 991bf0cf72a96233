use crate::geom::{Rgba, Size, Vec2};
use crate::surface::{LineCap, Paint, Path, Stroke, Surface};
use crate::term::{Cell, CellBuffer};
use crossterm::style::Color;

// Braille: each terminal cell is 2x4 subpixels.
pub(crate) const SUB_X: u32 = 2;
pub(crate) const SUB_Y: u32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Translation plus axis scale; the only transforms the scene needs.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Transform {
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
}

impl Transform {
    fn scaled(s: f32) -> Self {
        Self {
            sx: s,
            sy: s,
            tx: 0.0,
            ty: 0.0,
        }
    }
    fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }
    fn len_scale(&self) -> f32 {
        (self.sx.abs() + self.sy.abs()) * 0.5
    }
}

/// RGBA subpixel raster behind the braille terminal output.
///
/// Logical units are mapped to subpixels by `pixel_scale`, so the scene sees
/// a surface `pixel_scale` times smaller in resolution than it draws at.
pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
    pixel_scale: f32,
    current: Transform,
    stack: Vec<Transform>,
}

impl PixelCanvas {
    pub(crate) fn new(cols: u16, rows: u16, pixel_scale: f32) -> Self {
        let w = cols as u32 * SUB_X;
        let h = rows as u32 * SUB_Y;
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
            pixel_scale,
            current: Transform::scaled(pixel_scale),
            stack: Vec::new(),
        }
    }

    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    /// Logical point at the centre of a terminal cell.
    pub(crate) fn surface_point(&self, col: u16, row: u16) -> Vec2 {
        let sx = col as f32 * SUB_X as f32 + SUB_X as f32 * 0.5;
        let sy = row as f32 * SUB_Y as f32 + SUB_Y as f32 * 0.5;
        Vec2::new(sx / self.pixel_scale, sy / self.pixel_scale)
    }

    fn blend_over(&mut self, x: i32, y: i32, src: Rgba, coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let sa = (src.a * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }

    /// Device-space bounding box clipped to the raster, as pixel index ranges.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(i32, i32, i32, i32)> {
        let x0 = (min.x.floor() as i32).max(0);
        let y0 = (min.y.floor() as i32).max(0);
        let x1 = (max.x.ceil() as i32).min(self.w as i32 - 1);
        let y1 = (max.y.ceil() as i32).min(self.h as i32 - 1);
        if x0 > x1 || y0 > y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    /// Inverse of the current transform, device pixel centre back to logical space.
    fn to_logical(&self, x: i32, y: i32) -> Vec2 {
        let t = &self.current;
        Vec2::new(
            (x as f32 + 0.5 - t.tx) / t.sx,
            (y as f32 + 0.5 - t.ty) / t.sy,
        )
    }

    fn stroke_segments(&mut self, segments: &[(Vec2, Vec2)], stroke: &Stroke, first: usize, last: usize) {
        let half = (stroke.width * self.current.len_scale() * 0.5).max(0.5);
        let mut min = Vec2::new(f32::MAX, f32::MAX);
        let mut max = Vec2::new(f32::MIN, f32::MIN);
        let dev: Vec<(Vec2, Vec2)> = segments
            .iter()
            .map(|&(a, b)| (self.current.apply(a), self.current.apply(b)))
            .collect();
        for &(a, b) in &dev {
            min = Vec2::new(min.x.min(a.x).min(b.x), min.y.min(a.y).min(b.y));
            max = Vec2::new(max.x.max(a.x).max(b.x), max.y.max(a.y).max(b.y));
        }
        let pad = Vec2::new(half + 1.0, half + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(min - pad, max + pad) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let mut best = f32::MAX;
                for (k, &(a, b)) in dev.iter().enumerate() {
                    let ab = b - a;
                    let len2 = ab.dot(ab);
                    let mut t = if len2 <= 1e-9 { 0.0 } else { (p - a).dot(ab) / len2 };
                    if stroke.cap == LineCap::Butt && ((k == first && t < 0.0) || (k == last && t > 1.0)) {
                        continue;
                    }
                    t = t.clamp(0.0, 1.0);
                    best = best.min((p - (a + ab * t)).len());
                }
                let coverage = (half + 0.5 - best).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_over(x, y, stroke.color, coverage);
                }
            }
        }
    }

    /// Rasterizes into terminal cells. Subpixels at or above `ink_alpha` become
    /// braille dots; everything else tints the cell background over `water`.
    pub(crate) fn to_cells(&self, out: &mut CellBuffer, water: Rgba, ink_alpha: u8) {
        let cols = out.w as u32;
        let rows = out.h as u32;

        for cy in 0..rows {
            for cx in 0..cols {
                let px0 = cx * SUB_X;
                let py0 = cy * SUB_Y;

                let mut mask: u8 = 0;
                let mut ink = [0u32; 3];
                let mut ink_count = 0u32;
                let mut wash = [0f32; 4];
                let mut samples = 0u32;

                for dy in 0..SUB_Y {
                    for dx in 0..SUB_X {
                        let x = px0 + dx;
                        let y = py0 + dy;
                        if x >= self.w || y >= self.h {
                            continue;
                        }
                        let p = self.px[self.idx(x, y)];
                        samples += 1;
                        if p.a >= ink_alpha {
                            mask |= braille_bit(dx, dy);
                            ink[0] += p.r as u32;
                            ink[1] += p.g as u32;
                            ink[2] += p.b as u32;
                            ink_count += 1;
                        } else {
                            let a = p.a as f32 / 255.0;
                            wash[0] += p.r as f32 * a;
                            wash[1] += p.g as f32 * a;
                            wash[2] += p.b as f32 * a;
                            wash[3] += a;
                        }
                    }
                }

                let bg = if samples > 0 && wash[3] > 0.0 {
                    let a = wash[3] / samples as f32;
                    let tint = Rgba::rgb(
                        (wash[0] / wash[3]) as u8,
                        (wash[1] / wash[3]) as u8,
                        (wash[2] / wash[3]) as u8,
                    );
                    water.lerp(tint, a)
                } else {
                    water
                };

                let fg = if ink_count > 0 {
                    Color::Rgb {
                        r: (ink[0] / ink_count) as u8,
                        g: (ink[1] / ink_count) as u8,
                        b: (ink[2] / ink_count) as u8,
                    }
                } else {
                    Color::Reset
                };

                let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
                out.set(
                    cx as u16,
                    cy as u16,
                    Cell {
                        ch,
                        fg,
                        bg: Color::Rgb {
                            r: bg.r,
                            g: bg.g,
                            b: bg.b,
                        },
                        bold: false,
                    },
                );
            }
        }
    }
}

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> Size {
        Size::new(
            self.w as f32 / self.pixel_scale,
            self.h as f32 / self.pixel_scale,
        )
    }

    fn clear(&mut self) {
        self.px.fill(Pixel::default());
    }

    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.current = t;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.current.tx += dx * self.current.sx;
        self.current.ty += dy * self.current.sy;
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.current.sx *= sx;
        self.current.sy *= sy;
    }

    fn fill_rect(&mut self, origin: Vec2, size: Size, paint: &Paint) {
        let a = self.current.apply(origin);
        let b = self.current.apply(origin + Vec2::new(size.width, size.height));
        let min = Vec2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vec2::new(a.x.max(b.x), a.y.max(b.y));
        let Some((x0, y0, x1, y1)) = self.clip(min, max - Vec2::new(1.0, 1.0)) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let color = paint.color_at(self.to_logical(x, y));
                self.blend_over(x, y, color, 1.0);
            }
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgba) {
        let c = self.current.apply(center);
        let rx = (rx * self.current.sx).abs().max(0.5);
        let ry = (ry * self.current.sy).abs().max(0.5);
        let Some((x0, y0, x1, y1)) = self.clip(c - Vec2::new(rx, ry), c + Vec2::new(rx, ry)) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f32 + 0.5 - c.x) / rx;
                let dy = (y as f32 + 0.5 - c.y) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend_over(x, y, color, 1.0);
                }
            }
        }
    }

    fn stroke_circle(&mut self, center: Vec2, r: f32, stroke: &Stroke) {
        let c = self.current.apply(center);
        let r = r * self.current.len_scale();
        let half = (stroke.width * self.current.len_scale() * 0.5).max(0.5);
        let reach = Vec2::new(r + half + 1.0, r + half + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(c - reach, c + reach) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - c).len();
                let coverage = (half + 0.5 - (d - r).abs()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_over(x, y, stroke.color, coverage);
                }
            }
        }
    }

    fn fill_path(&mut self, path: &Path, color: Rgba) {
        // Even-odd fill over all subpaths, each implicitly closed.
        let polys: Vec<Vec<Vec2>> = path
            .subpaths
            .iter()
            .filter(|sp| sp.points.len() >= 3)
            .map(|sp| sp.points.iter().map(|&p| self.current.apply(p)).collect())
            .collect();
        if polys.is_empty() {
            return;
        }
        let mut min = Vec2::new(f32::MAX, f32::MAX);
        let mut max = Vec2::new(f32::MIN, f32::MIN);
        for p in polys.iter().flatten() {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };
        for y in y0..=y1 {
            let py = y as f32 + 0.5;
            for x in x0..=x1 {
                let px = x as f32 + 0.5;
                let mut inside = false;
                for poly in &polys {
                    let n = poly.len();
                    for i in 0..n {
                        let a = poly[i];
                        let b = poly[(i + 1) % n];
                        if (a.y > py) != (b.y > py) {
                            let cross = a.x + (py - a.y) / (b.y - a.y) * (b.x - a.x);
                            if px < cross {
                                inside = !inside;
                            }
                        }
                    }
                }
                if inside {
                    self.blend_over(x, y, color, 1.0);
                }
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        for sp in &path.subpaths {
            let mut segments: Vec<(Vec2, Vec2)> =
                sp.points.windows(2).map(|w| (w[0], w[1])).collect();
            if sp.closed && sp.points.len() > 2 {
                if let (Some(&last), Some(&first)) = (sp.points.last(), sp.points.first()) {
                    segments.push((last, first));
                }
            }
            if segments.is_empty() {
                continue;
            }
            // A closed outline has no ends to cap.
            let (first, last) = if sp.closed {
                (usize::MAX, usize::MAX)
            } else {
                (0, segments.len() - 1)
            };
            self.stroke_segments(&segments, stroke, first, last);
        }
    }
}
