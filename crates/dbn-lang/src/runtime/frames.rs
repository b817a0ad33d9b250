use std::collections::HashMap;

use log::{trace, warn};

use crate::runtime::canvas::{Canvas, Rgba};

/// Most colors a frame palette holds, the limit of an indexed animation.
pub const MAX_PALETTE: usize = 256;

/// Paletted snapshot of the (scaled) canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// Distinct colors in first-seen row-major order.
    pub palette: Vec<Rgba>,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
    /// Hundredths of a second before the next frame.
    pub delay: u16,
}

impl Frame {
    /// Quantizes `canvas`. Once the palette is full, further colors map to
    /// their nearest entry.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        let mut palette = Vec::new();
        let mut seen: HashMap<Rgba, u8> = HashMap::new();
        let mut indices = Vec::with_capacity(canvas.pixels().len());

        for px in canvas.pixels() {
            let index = match seen.get(px) {
                Some(i) => *i,
                None if palette.len() < MAX_PALETTE => {
                    let i = palette.len() as u8;
                    palette.push(*px);
                    seen.insert(*px, i);
                    i
                }
                None => px.nearest(&palette) as u8,
            };
            indices.push(index);
        }

        Self { width: canvas.width(), height: canvas.height(), palette, indices, delay: 0 }
    }

    /// Color at buffer coordinates; transparent outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        let index = self.indices[y * self.width + x] as usize;
        self.palette.get(index).copied().unwrap_or_default()
    }

    pub fn to_canvas(&self) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                canvas.set(x as i64, y as i64, self.pixel(x, y));
            }
        }
        canvas
    }
}

// ─── Recorder ────────────────────────────────────────────────────────────────

/// Collects frames while a program runs. Disabled recorders ignore captures;
/// a non-zero `max` silently drops captures past the cap.
#[derive(Debug, Default)]
pub struct Recorder {
    enabled: bool,
    max: usize,
    scale: usize,
    frames: Vec<Frame>,
    capped: bool,
}

impl Recorder {
    pub fn new(enabled: bool, max: usize, scale: usize) -> Self {
        Self { enabled, max, scale: scale.max(1), frames: Vec::new(), capped: false }
    }

    pub fn capture(&mut self, canvas: &Canvas) {
        if !self.enabled {
            return;
        }
        if self.max > 0 && self.frames.len() >= self.max {
            if !self.capped {
                warn!("frame cap of {} reached; further frames are dropped", self.max);
                self.capped = true;
            }
            return;
        }
        trace!("capturing frame {}", self.frames.len());
        self.frames.push(Frame::from_canvas(&canvas.scaled(self.scale)));
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}
