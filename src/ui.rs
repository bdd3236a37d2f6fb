//! Palette, buttons and brush state: the screen regions the fingertip can
//! press and how they are painted onto each outgoing frame.

use crate::draw::{draw_text_5x7, draw_thick_line, fill_disc, fill_rect, stroke_rect};
use crate::gesture::{to_pixels, HandLandmarks, CONNECTIVITY};
use crate::types::{rgb, Color, FrameBuffer};

/// Blue, green, red, cyan, magenta, yellow, white.
pub const PALETTE: [Color; 7] = [
    rgb(0, 0, 255),
    rgb(0, 255, 0),
    rgb(255, 0, 0),
    rgb(0, 255, 255),
    rgb(255, 0, 255),
    rgb(255, 255, 0),
    rgb(255, 255, 255),
];

/// Canvas background; erasing paints this.
pub const BACKGROUND: Color = 0;

// Swatch geometry.
const SWATCH_LEFT: i32 = 10;
const SWATCH_STRIDE: i32 = 90;
const SWATCH_WIDTH: i32 = 80;
const SWATCH_TOP: i32 = 10;
const SWATCH_BOTTOM: i32 = 80;

// Button geometry, anchored to the bottom corners.
const BUTTON_MARGIN: i32 = 10;
const BUTTON_WIDTH: i32 = 120;
const BUTTON_HEIGHT: i32 = 50;

const SELECTION_BORDER: i32 = 3;
const LABEL_SCALE: i32 = 2;

/// Color and width a segment is stamped with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stroke {
    pub color: Color,
    pub width: i32,
}

/// What the fingertip paints with. Only one mode exists at a time, so the
/// swatch highlight and the eraser can never both be active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushMode {
    /// Painting with `PALETTE[index]`.
    Color(usize),
    /// Erasing; `remembered` is the swatch that was selected before.
    Eraser { remembered: usize },
}

#[derive(Debug)]
pub struct Brush {
    mode: BrushMode,
    brush_size: i32,
    eraser_size: i32,
}

impl Brush {
    pub fn new(brush_size: i32, eraser_size: i32) -> Self {
        Self { mode: BrushMode::Color(0), brush_size, eraser_size }
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn is_erasing(&self) -> bool {
        matches!(self.mode, BrushMode::Eraser { .. })
    }

    /// The palette index currently selected (or remembered while erasing).
    pub fn selected_index(&self) -> usize {
        match self.mode {
            BrushMode::Color(i) | BrushMode::Eraser { remembered: i } => i,
        }
    }

    /// Paint with palette entry `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < PALETTE.len() {
            self.mode = BrushMode::Color(index);
        }
    }

    /// Switch to the eraser, keeping the selected swatch in memory.
    pub fn erase(&mut self) {
        self.mode = BrushMode::Eraser { remembered: self.selected_index() };
    }

    pub fn stroke(&self) -> Stroke {
        match self.mode {
            BrushMode::Color(i) => Stroke { color: PALETTE[i], width: self.brush_size },
            BrushMode::Eraser { .. } => Stroke { color: BACKGROUND, width: self.eraser_size },
        }
    }
}

/// Axis-aligned rectangle in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Strictly inside; points on the border don't count.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 < x && x < self.x2 && self.y1 < y && y < self.y2
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    SelectColor(usize),
    Reset,
    Eraser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub action: UiAction,
    pub rect: Rect,
}

/// All pressable regions for a frame of `width`x`height`, in hit-test priority
/// order: swatches left to right, then Reset, then Eraser.
pub fn layout(width: usize, height: usize, palette_len: usize) -> Vec<Region> {
    let (w, h) = (width as i32, height as i32);
    let mut regions = Vec::with_capacity(palette_len + 2);

    for i in 0..palette_len {
        let x1 = SWATCH_LEFT + i as i32 * SWATCH_STRIDE;
        regions.push(Region {
            action: UiAction::SelectColor(i),
            rect: Rect { x1, y1: SWATCH_TOP, x2: x1 + SWATCH_WIDTH, y2: SWATCH_BOTTOM },
        });
    }

    let y1 = h - BUTTON_MARGIN - BUTTON_HEIGHT;
    let y2 = h - BUTTON_MARGIN;
    regions.push(Region {
        action: UiAction::Reset,
        rect: Rect { x1: BUTTON_MARGIN, y1, x2: BUTTON_MARGIN + BUTTON_WIDTH, y2 },
    });
    regions.push(Region {
        action: UiAction::Eraser,
        rect: Rect { x1: w - BUTTON_MARGIN - BUTTON_WIDTH, y1, x2: w - BUTTON_MARGIN, y2 },
    });

    regions
}

/// Every region that strictly contains `pos`, in layout order. Regions only
/// overlap on very narrow frames; then all of them fire and the last wins.
pub fn hit_test(regions: &[Region], pos: (i32, i32)) -> Vec<UiAction> {
    regions
        .iter()
        .filter(|r| r.rect.contains(pos.0, pos.1))
        .map(|r| r.action)
        .collect()
}

/// Paint swatches, the selection border and both buttons onto `fb`.
pub fn draw_overlay(fb: &mut FrameBuffer, regions: &[Region], brush: &Brush) {
    for region in regions {
        let Rect { x1, y1, x2, y2 } = region.rect;
        match region.action {
            UiAction::SelectColor(i) => {
                fill_rect(fb, x1, y1, x2, y2, PALETTE[i % PALETTE.len()]);
                if brush.mode() == BrushMode::Color(i) {
                    stroke_rect(fb, x1, y1, x2, y2, SELECTION_BORDER, rgb(0, 0, 0));
                }
            }
            UiAction::Reset => {
                fill_rect(fb, x1, y1, x2, y2, rgb(255, 255, 255));
                draw_label(fb, x1 + 20, y2, "Reset");
            }
            UiAction::Eraser => {
                fill_rect(fb, x1, y1, x2, y2, rgb(200, 200, 200));
                draw_label(fb, x1 + 10, y2, "Eraser");
            }
        }
    }
}

/// Button label; `bottom` is the button's lower edge.
fn draw_label(fb: &mut FrameBuffer, x: i32, bottom: i32, text: &str) {
    let glyph_h = 7 * LABEL_SCALE;
    draw_text_5x7(fb, x, bottom - 15 - glyph_h, text, LABEL_SCALE, rgb(0, 0, 0));
}

/// Draw a detected hand's bones and joints onto the outgoing frame.
pub fn draw_hand(fb: &mut FrameBuffer, hand: &HandLandmarks) {
    let (w, h) = (fb.width, fb.height);
    for &(a, b) in CONNECTIVITY {
        let (x0, y0) = to_pixels(hand.get(a), w, h);
        let (x1, y1) = to_pixels(hand.get(b), w, h);
        draw_thick_line(fb, x0, y0, x1, y1, 2, rgb(224, 224, 224));
    }
    for &lm in hand.points() {
        let (x, y) = to_pixels(lm, w, h);
        fill_disc(fb, x, y, 2, rgb(255, 0, 0));
    }
}
