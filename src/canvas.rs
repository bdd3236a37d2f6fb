// The persistent drawing layer and the compositor that mixes it over the live feed.
// Visual: strokes accumulate here frame after frame; the camera image changes
// underneath while the canvas stays put until Reset.

use crate::draw::draw_thick_line;
use crate::error::Error;
use crate::types::FrameBuffer;
use crate::ui::Stroke;

/// Stroke layer the same size as the camera frame. Zero pixels are "nothing drawn".
pub struct Canvas {
    buf: FrameBuffer,
}

impl Canvas {
    /// A blank canvas of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { buf: FrameBuffer::new(width, height) }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buf
    }

    #[cfg(test)]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.buf.width, self.buf.height)
    }

    /// Stamp a line segment with the given brush.
    pub fn stamp_line(&mut self, from: (i32, i32), to: (i32, i32), stroke: Stroke) {
        draw_thick_line(&mut self.buf, from.0, from.1, to.0, to.1, stroke.width, stroke.color);
    }

    /// Throw every stroke away: a fresh all-zero buffer of the same size.
    pub fn reset(&mut self) {
        self.buf = FrameBuffer::new(self.buf.width, self.buf.height);
    }
}

/// Mix one 8-bit channel 50/50. An exact .5 rounds to the even neighbour,
/// so 0.5 -> 0 and 1.5 -> 2.
#[inline]
fn half_mix(a: u32, b: u32) -> u32 {
    let sum = a + b;
    let q = sum >> 1;
    if sum & 1 == 1 && q & 1 == 1 { q + 1 } else { q }
}

/// Blend `frame` and `canvas` with equal weights into `out`.
/// Plain per-channel average of the stored values (no gamma, banker's rounding).
pub fn blend_half(frame: &FrameBuffer, canvas: &FrameBuffer, out: &mut FrameBuffer) -> Result<(), Error> {
    if frame.width != canvas.width || frame.height != canvas.height {
        return Err(Error::CameraFrame("blend: dimension mismatch frame↔canvas".into()));
    }
    if out.width != frame.width || out.height != frame.height {
        *out = FrameBuffer::new(frame.width, frame.height);
    }

    for ((dst, &pf), &pc) in out.pixels.iter_mut().zip(&frame.pixels).zip(&canvas.pixels) {
        let r = half_mix((pf >> 16) & 0xFF, (pc >> 16) & 0xFF);
        let g = half_mix((pf >> 8) & 0xFF, (pc >> 8) & 0xFF);
        let b = half_mix(pf & 0xFF, pc & 0xFF);
        *dst = (r << 16) | (g << 8) | b;
    }
    Ok(())
}
