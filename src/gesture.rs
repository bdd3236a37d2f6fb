//! Turns one hand's landmarks into a stylus: where the fingertip points and
//! whether the hand is in the drawing pose.

use crate::canvas::Canvas;
use crate::ui::Stroke;

/// Number of landmarks in the hand model.
pub const NUM_LANDMARKS: usize = 21;

/// Landmark indices of the 21-point hand model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Bones drawn when visualizing a hand.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Palm:
        (Wrist, ThumbCmc),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// A landmark in normalized image coordinates: x and y in [0,1] (may stray
/// slightly outside), y growing downwards. `z` is relative depth and unused here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; NUM_LANDMARKS],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn get(&self, idx: LandmarkIdx) -> Landmark {
        self.points[idx as usize]
    }

    pub fn set(&mut self, idx: LandmarkIdx, lm: Landmark) {
        self.points[idx as usize] = lm;
    }

    pub fn points(&self) -> &[Landmark; NUM_LANDMARKS] {
        &self.points
    }

    /// Index finger extended and middle finger curled.
    pub fn is_drawing_pose(&self) -> bool {
        drawing_pose(
            self.get(LandmarkIdx::IndexFingerTip).y,
            self.get(LandmarkIdx::IndexFingerPip).y,
            self.get(LandmarkIdx::MiddleFingerTip).y,
            self.get(LandmarkIdx::MiddleFingerPip).y,
        )
    }

    /// Index fingertip in frame pixels.
    pub fn pointer(&self, width: usize, height: usize) -> (i32, i32) {
        to_pixels(self.get(LandmarkIdx::IndexFingerTip), width, height)
    }
}

/// A finger counts as extended when its tip is above (smaller y than) its PIP joint.
#[inline]
pub fn drawing_pose(index_tip_y: f32, index_pip_y: f32, middle_tip_y: f32, middle_pip_y: f32) -> bool {
    let index_extended = index_tip_y < index_pip_y;
    let middle_extended = middle_tip_y < middle_pip_y;
    index_extended && !middle_extended
}

/// Scale a normalized landmark to pixel coordinates (truncating).
#[inline]
pub fn to_pixels(lm: Landmark, width: usize, height: usize) -> (i32, i32) {
    ((lm.x * width as f32) as i32, (lm.y * height as f32) as i32)
}

/// Remembers where the last stroke ended so consecutive ticks join up.
#[derive(Debug, Default)]
pub struct Stylus {
    last: Option<(i32, i32)>,
}

impl Stylus {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<(i32, i32)> {
        self.last
    }

    /// Feed one hand's state for this tick.
    ///
    /// While drawing, stamps a segment from the previous position to `pos`
    /// (nothing on the first tick of a stroke). Leaving the pose forgets the
    /// position so the next stroke starts fresh instead of jumping across.
    pub fn update(&mut self, drawing: bool, pos: (i32, i32), stroke: Stroke, canvas: &mut Canvas) {
        if !drawing {
            self.last = None;
            return;
        }
        if let Some(prev) = self.last {
            canvas.stamp_line(prev, pos, stroke);
        }
        self.last = Some(pos);
    }
}
