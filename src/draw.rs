// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the composited camera + canvas image.
// 2) Filled/outlined rectangles, discs and thick lines for the palette and strokes.
// 3) A tiny 5x7 bitmap font, scaled up for button labels.

use crate::error::Error;
use crate::types::{Color, FrameBuffer, PointerSample};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Where finished frames go, plus the input the loop polls each tick.
pub trait Display {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error>;
    /// False once the user closed the window.
    fn is_open(&self) -> bool;
    /// True on the tick the quit key went down.
    fn quit_pressed(&self) -> bool;
    fn pointer(&self) -> Option<PointerSample>;
}

pub struct Drawer {
    window: Window, // the on-screen window you see
    quit_key: Key,
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, quit_key: Key) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window, quit_key })
    }
}

impl Display for Drawer {
    /// Push the pixels for this frame to the screen. This also pumps window events.
    fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn quit_pressed(&self) -> bool {
        self.window.is_key_pressed(self.quit_key, KeyRepeat::No)
    }

    /// Mouse position in window pixels; None while the cursor is outside the window.
    fn pointer(&self) -> Option<PointerSample> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| PointerSample {
                x,
                y,
                pressed: self.window.get_mouse_down(MouseButton::Left),
            })
    }
}

/* ---------- Software drawing: pixels, rectangles, lines, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Fill the rectangle with corners (x1,y1) and (x2,y2), both inclusive.
pub fn fill_rect(fb: &mut FrameBuffer, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
    let (x1, x2) = (x1.min(x2), x1.max(x2));
    let (y1, y2) = (y1.min(y2), y1.max(y2));
    // Clip once so huge rects don't loop over off-screen pixels.
    let x1 = x1.max(0);
    let y1 = y1.max(0);
    let x2 = x2.min(fb.width as i32 - 1);
    let y2 = y2.min(fb.height as i32 - 1);
    for y in y1..=y2 {
        for x in x1..=x2 {
            put_pixel(fb, x, y, color);
        }
    }
}

/// Outline a rectangle with a border `thickness` pixels wide, centred on its edges.
pub fn stroke_rect(
    fb: &mut FrameBuffer,
    x1: i32, y1: i32,
    x2: i32, y2: i32,
    thickness: i32,
    color: Color,
) {
    let lo = thickness / 2;
    let hi = thickness - 1 - lo;
    fill_rect(fb, x1 - lo, y1 - lo, x2 + hi, y1 + hi, color); // top
    fill_rect(fb, x1 - lo, y2 - lo, x2 + hi, y2 + hi, color); // bottom
    fill_rect(fb, x1 - lo, y1 - lo, x1 + hi, y2 + hi, color); // left
    fill_rect(fb, x2 - lo, y1 - lo, x2 + hi, y2 + hi, color); // right
}

/// Solid disc of `radius` pixels around (cx,cy).
pub fn fill_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: Color) {
    if radius < 0 {
        return;
    }
    let r2 = radius as i64 * radius as i64;
    // Scan only the part of the bounding box that is on screen.
    let x_lo = cx.saturating_sub(radius).max(0);
    let y_lo = cy.saturating_sub(radius).max(0);
    let x_hi = cx.saturating_add(radius).min(fb.width as i32 - 1);
    let y_hi = cy.saturating_add(radius).min(fb.height as i32 - 1);
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let (dx, dy) = (x as i64 - cx as i64, y as i64 - cy as i64);
            if dx * dx + dy * dy <= r2 {
                put_pixel(fb, x, y, color);
            }
        }
    }
}

/// Walk the Bresenham line from (x0,y0) to (x1,y1), calling `plot` on every pixel.
fn for_each_line_pixel(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    for_each_line_pixel(x0, y0, x1, y1, |x, y| put_pixel(fb, x, y, color));
}

/// Draw a line `width` pixels thick with round caps.
/// Every touched pixel lies within width/2 of the segment.
pub fn draw_thick_line(
    fb: &mut FrameBuffer,
    x0: i32, y0: i32,
    x1: i32, y1: i32,
    width: i32,
    color: Color,
) {
    // Nothing is gained past the buffer's diagonal.
    let diagonal = (fb.width + fb.height) as i32;
    let radius = (width / 2).clamp(0, diagonal);
    if radius == 0 {
        draw_line(fb, x0, y0, x1, y1, color);
        return;
    }
    for_each_line_pixel(x0, y0, x1, y1, |x, y| fill_disc(fb, x, y, radius, color));
}

/* ---------- 5x7 bitmap font (the letters our button labels need) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), each font pixel a `scale`x`scale` block.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, scale: i32, color: Color) {
    if let Some(rows) = glyph5x7(ch) {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    let px = x + rx * scale;
                    let py = y + ry as i32 * scale;
                    fill_rect(fb, px, py, px + scale - 1, py + scale - 1, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs with (x,y) as the top-left corner.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, scale: i32, color: Color) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, scale, color);
        x += 6 * scale; // 5 pixels glyph width + 1 pixel spacing
    }
}
