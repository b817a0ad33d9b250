//! Pixel buffer. Coordinates here are buffer coordinates: row 0 is the top.
//! Flipping the language's bottom-up y is the interpreter's job.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };

    pub const fn gray(level: u8) -> Self {
        Rgba { r: level, g: level, b: level, a: 255 }
    }

    /// Ink density 0 (white) to 100 (black), clamped, as an opaque gray.
    pub fn from_ink(ink: i64) -> Self {
        let ink = ink.clamp(0, 100);
        Self::gray(((100 - ink) * 255 / 100) as u8)
    }

    /// Ink density read back from the red channel. Transparent reads as 100.
    pub fn ink(&self) -> i64 {
        let r16 = self.r as i64 * 257;
        100 - r16 * 100 / 65535
    }

    fn distance(&self, other: &Rgba) -> u32 {
        let d = |a: u8, b: u8| (a as i32 - b as i32).unsigned_abs().pow(2);
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b) + d(self.a, other.a)
    }

    /// Index of the closest entry in `palette`, by squared channel distance.
    pub fn nearest(&self, palette: &[Rgba]) -> usize {
        palette.iter()
            .enumerate()
            .min_by_key(|(_, c)| self.distance(c))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// A fully transparent canvas.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![Rgba::TRANSPARENT; width * height] }
    }

    pub fn square(length: usize) -> Self {
        Self::new(length, length)
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    /// Row-major, top row first.
    pub fn pixels(&self) -> &[Rgba] { &self.pixels }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let inside = x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64;
        inside.then(|| y as usize * self.width + x as usize)
    }

    /// Transparent outside the canvas.
    pub fn pixel(&self, x: i64, y: i64) -> Rgba {
        self.index(x, y).map_or(Rgba::TRANSPARENT, |i| self.pixels[i])
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Writes outside the canvas are dropped.
    pub fn set(&mut self, x: i64, y: i64, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Integer line between two points, endpoints included. The endpoints
    /// are put in order first, so swapping them draws the same pixels.
    pub fn line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgba) {
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64);
        let (mut a, mut b) = ((clamp(x1), clamp(y1)), (clamp(x2), clamp(y2)));
        if a > b { std::mem::swap(&mut a, &mut b); }
        let ((x1, y1), (x2, y2)) = (a, b);
        let (dx, dy) = (x2 - x1, y2 - y1);

        if dx == 0 && dy == 0 {
            self.set(x1, y1, color);
        } else if dy == 0 {
            let (from, to) = (x1.max(0), x2.min(self.width as i64 - 1));
            for x in from..=to { self.set(x, y1, color); }
        } else if dx == 0 {
            let (from, to) = (y1.max(0), y2.min(self.height as i64 - 1));
            for y in from..=to { self.set(x1, y, color); }
        } else if dx == dy.abs() {
            let sy = dy.signum();
            let Some((from, to)) = visible_steps(x1, 1, dx, self.width) else { return };
            for step in from..=to { self.set(x1 + step, y1 + step * sy, color); }
        } else {
            self.bresenham(x1, y1, dx, dy, color);
        }
    }

    /// General case with `dx > 0`, `dy != 0` and `|dx| != |dy|`. Only the
    /// steps whose major coordinate lies on the canvas are walked.
    fn bresenham(&mut self, x1: i64, y1: i64, dx: i64, dy: i64, color: Rgba) {
        let sy = dy.signum();
        let dy = dy.abs();
        if dx > dy {
            let Some((from, to)) = visible_steps(x1, 1, dx, self.width) else { return };
            for (step, minor) in walk(dx, dy, from, to) {
                self.set(x1 + step, y1 + minor * sy, color);
            }
        } else {
            let Some((from, to)) = visible_steps(y1, sy, dy, self.height) else { return };
            for (step, minor) in walk(dy, dx, from, to) {
                self.set(x1 + minor, y1 + step * sy, color);
            }
        }
    }

    /// Each pixel becomes a `factor × factor` block. Factors below 2 copy.
    pub fn scaled(&self, factor: usize) -> Canvas {
        if factor < 2 {
            return self.clone();
        }
        let (width, height) = (self.width * factor, self.height * factor);
        let mut pixels = Vec::with_capacity(width * height);
        for row in self.pixels.chunks(self.width.max(1)) {
            let wide: Vec<Rgba> = row.iter()
                .flat_map(|p| std::iter::repeat_n(*p, factor))
                .collect();
            for _ in 0..factor {
                pixels.extend_from_slice(&wide);
            }
        }
        Canvas { width, height, pixels }
    }

    /// Flat `r g b a` bytes in row-major order.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect()
    }
}

/// Steps `k` in `0..=len` for which `start + k * sign` falls in `0..limit`.
fn visible_steps(start: i64, sign: i64, len: i64, limit: usize) -> Option<(i64, i64)> {
    let last = limit as i64 - 1;
    let (lo, hi) = if sign > 0 { (-start, last - start) } else { (start - last, start) };
    let (from, to) = (lo.max(0), hi.min(len));
    (limit > 0 && from <= to).then_some((from, to))
}

/// Bresenham steps `from..=to` along the major axis, yielding the step and
/// the minor offset. The error term at `from` is computed directly, so
/// skipping an off-canvas prefix costs nothing.
fn walk(major: i64, minor: i64, from: i64, to: i64) -> impl Iterator<Item = (i64, i64)> {
    let (major_w, minor_w, k) = (i128::from(major), i128::from(minor), i128::from(from));
    // offset = ceil((2k*minor - major) / 2major)
    let offset = -(major_w - 2 * k * minor_w).div_euclid(2 * major_w);
    let mut err = (2 * (k + 1) * minor_w - major_w - 2 * offset * major_w) as i64;
    let mut offset = offset as i64;
    (from..=to).map(move |step| {
        let point = (step, offset);
        if err > 0 {
            offset += 1;
            err -= 2 * major;
        }
        err += 2 * minor;
        point
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(canvas: &Canvas) -> Vec<(i64, i64)> {
        let mut out = Vec::new();
        for y in 0..canvas.height() as i64 {
            for x in 0..canvas.width() as i64 {
                if canvas.pixel(x, y) == Rgba::BLACK { out.push((x, y)); }
            }
        }
        out
    }

    fn drawn(x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<(i64, i64)> {
        let mut c = Canvas::square(10);
        c.line(x1, y1, x2, y2, Rgba::BLACK);
        lit(&c)
    }

    #[test]
    fn ink_mapping() {
        assert_eq!(Rgba::from_ink(0), Rgba::WHITE);
        assert_eq!(Rgba::from_ink(100), Rgba::BLACK);
        assert_eq!(Rgba::from_ink(50), Rgba::gray(127));
        assert_eq!(Rgba::from_ink(10), Rgba::gray(229));
        assert_eq!(Rgba::from_ink(250), Rgba::BLACK);
        assert_eq!(Rgba::from_ink(-5), Rgba::WHITE);
    }

    #[test]
    fn ink_read_back() {
        assert_eq!(Rgba::WHITE.ink(), 0);
        assert_eq!(Rgba::BLACK.ink(), 100);
        assert_eq!(Rgba::TRANSPARENT.ink(), 100);
        assert_eq!(Rgba::from_ink(50).ink(), 51);
    }

    #[test]
    fn new_canvas_is_transparent() {
        let c = Canvas::new(3, 2);
        assert_eq!(c.pixels().len(), 6);
        assert!(c.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn out_of_bounds_is_clipped() {
        let mut c = Canvas::square(4);
        c.set(-1, 0, Rgba::BLACK);
        c.set(4, 0, Rgba::BLACK);
        c.set(0, 100, Rgba::BLACK);
        assert!(lit(&c).is_empty());
        assert_eq!(c.pixel(-1, -1), Rgba::TRANSPARENT);
    }

    #[test]
    fn single_point() {
        assert_eq!(drawn(3, 4, 3, 4), vec![(3, 4)]);
    }

    #[test]
    fn horizontal_and_vertical() {
        assert_eq!(drawn(1, 2, 4, 2), vec![(1, 2), (2, 2), (3, 2), (4, 2)]);
        assert_eq!(drawn(5, 3, 5, 1), vec![(5, 1), (5, 2), (5, 3)]);
    }

    #[test]
    fn diagonal() {
        assert_eq!(drawn(0, 0, 3, 3), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_eq!(drawn(0, 3, 3, 0), vec![(3, 0), (2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn shallow_line_has_no_gaps() {
        let px = drawn(0, 0, 8, 3);
        assert_eq!(px.len(), 9);
        let mut xs: Vec<i64> = px.iter().map(|p| p.0).collect();
        xs.sort();
        assert_eq!(xs, (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn steep_line_has_no_gaps() {
        let px = drawn(1, 0, 3, 8);
        assert_eq!(px.len(), 9);
        assert!(px.contains(&(1, 0)) && px.contains(&(3, 8)));
    }

    #[test]
    fn swapped_endpoints_draw_the_same_pixels() {
        for (x1, y1, x2, y2) in [(0, 0, 8, 3), (1, 9, 6, 0), (2, 2, 2, 7), (0, 5, 9, 5), (7, 1, 0, 4)] {
            assert_eq!(drawn(x1, y1, x2, y2), drawn(x2, y2, x1, y1));
        }
    }

    #[test]
    fn line_partly_off_canvas() {
        let px = drawn(-5, 1, 20, 1);
        assert_eq!(px.len(), 10);
    }

    /// Unclipped walk over every step, for comparison.
    fn every_step(x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<(i64, i64)> {
        let (mut a, mut b) = ((x1, y1), (x2, y2));
        if a > b { std::mem::swap(&mut a, &mut b); }
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let sy = dy.signum();
        let mut c = Canvas::square(10);
        if dx > dy.abs() {
            for (k, n) in walk(dx, dy.abs(), 0, dx) { c.set(a.0 + k, a.1 + n * sy, Rgba::BLACK); }
        } else {
            for (k, n) in walk(dy.abs(), dx, 0, dy.abs()) { c.set(a.0 + n, a.1 + k * sy, Rgba::BLACK); }
        }
        lit(&c)
    }

    #[test]
    fn clipped_lines_match_the_full_walk() {
        for (x1, y1, x2, y2) in [(-7, -2, 15, 6), (-3, 12, 14, -9), (4, -20, 6, 30), (-30, 5, 25, 7), (12, 3, -4, 1)] {
            assert_eq!(drawn(x1, y1, x2, y2), every_step(x1, y1, x2, y2));
        }
    }

    #[test]
    fn huge_lines_only_walk_the_canvas() {
        assert_eq!(drawn(0, 0, 2_000_000_000, 1), (0..10).map(|x| (x, 0)).collect::<Vec<_>>());
        assert!(drawn(-4_000_000_000, 0, 0, 4_000_000_001).is_empty());
        assert_eq!(drawn(i64::MIN, i64::MIN, i64::MAX, i64::MAX), (0..10).map(|i| (i, i)).collect::<Vec<_>>());
        // The step to x = 4 happens just below y = 0.
        assert_eq!(drawn(3, 1_000_000_000, 4, -1_000_000_000), (0..10).map(|y| (3, y)).collect::<Vec<_>>());
    }

    #[test]
    fn scaling_replicates_pixels() {
        let mut c = Canvas::square(2);
        c.set(1, 0, Rgba::BLACK);
        let s = c.scaled(3);
        assert_eq!((s.width(), s.height()), (6, 6));
        assert_eq!(s.pixel(3, 0), Rgba::BLACK);
        assert_eq!(s.pixel(5, 2), Rgba::BLACK);
        assert_eq!(s.pixel(2, 0), Rgba::TRANSPARENT);
        assert_eq!(s.pixel(3, 3), Rgba::TRANSPARENT);
        assert_eq!(c.scaled(1), c);
    }

    #[test]
    fn rgba_bytes() {
        let mut c = Canvas::new(2, 1);
        c.fill(Rgba::WHITE);
        c.set(1, 0, Rgba::gray(7));
        assert_eq!(c.to_rgba_bytes(), vec![255, 255, 255, 255, 7, 7, 7, 255]);
    }

    #[test]
    fn nearest_palette_entry() {
        let palette = [Rgba::WHITE, Rgba::BLACK];
        assert_eq!(Rgba::gray(20).nearest(&palette), 1);
        assert_eq!(Rgba::gray(200).nearest(&palette), 0);
    }
}
