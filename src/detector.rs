//! Hand landmark detection behind a narrow interface.
//!
//! The loop hands over an RGB image and gets back zero or more hands, each
//! with the 21 landmarks of [`LandmarkIdx`]. How they are produced is opaque:
//!
//! * [`MouseHand`] (default) fakes a single hand from the mouse, so the app
//!   runs with no model at all. Holding the left button is the drawing pose.
//! * `OnnxHandLandmarker` (feature `onnx`) runs a 21-point hand landmark
//!   model through ONNX Runtime.

use crate::error::Error;
use crate::gesture::{HandLandmarks, Landmark, LandmarkIdx, NUM_LANDMARKS};
use crate::types::PointerSample;
use image::RgbImage;

pub trait LandmarkDetector {
    /// Hands found in `image`; empty when there are none.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<HandLandmarks>, Error>;

    /// Window pointer for this tick, in normalized coordinates. Only
    /// simulated detectors care.
    fn observe_pointer(&mut self, _pointer: Option<PointerSample>) {}

    fn name(&self) -> &'static str;
}

// Offsets (normalized) used to pose the simulated fingers.
const SIM_JOINT_OFFSET: f32 = 0.04;

/// Pretends the mouse cursor is an index fingertip.
#[derive(Debug, Default)]
pub struct MouseHand {
    pointer: Option<PointerSample>,
}

impl MouseHand {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synthetic hand with its index tip at (x,y).
    /// `drawing` extends the index finger and curls the middle one;
    /// otherwise both fingers are curled (a fist that still points).
    pub fn synth_hand(x: f32, y: f32, drawing: bool) -> HandLandmarks {
        let at = |dy: f32| Landmark { x, y: y + dy, z: 0.0 };
        let mut hand = HandLandmarks::new([at(2.0 * SIM_JOINT_OFFSET); NUM_LANDMARKS]);
        hand.set(LandmarkIdx::IndexFingerTip, at(0.0));
        let pip = if drawing { SIM_JOINT_OFFSET } else { -SIM_JOINT_OFFSET };
        hand.set(LandmarkIdx::IndexFingerPip, at(pip));
        hand.set(LandmarkIdx::MiddleFingerPip, at(SIM_JOINT_OFFSET));
        hand.set(LandmarkIdx::MiddleFingerTip, at(1.5 * SIM_JOINT_OFFSET));
        hand
    }
}

impl LandmarkDetector for MouseHand {
    fn detect(&mut self, _image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
        Ok(self
            .pointer
            .map(|p| vec![Self::synth_hand(p.x, p.y, p.pressed)])
            .unwrap_or_default())
    }

    fn observe_pointer(&mut self, pointer: Option<PointerSample>) {
        self.pointer = pointer;
    }

    fn name(&self) -> &'static str {
        "mouse simulation"
    }
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxHandLandmarker;

#[cfg(feature = "onnx")]
mod onnx {
    use super::*;
    use image::imageops::{self, FilterType};
    use ndarray::Array4;
    use ort::session::Session;
    use ort::value::TensorRef;
    use std::path::Path;

    // Square NHWC input, RGB scaled to [0,1].
    const INPUT_SIZE: u32 = 224;
    const LANDMARK_VALUES: usize = NUM_LANDMARKS * 3;

    fn load_err(model_path: &str, e: impl std::fmt::Display) -> Error {
        Error::Detector(format!("load {model_path}: {e}"))
    }

    /// Single-hand landmark model run on the whole frame.
    ///
    /// Expects the common export layout: one output of 63 values (x, y, z per
    /// landmark, in input pixels) followed by a one-value hand presence score.
    pub struct OnnxHandLandmarker {
        session: Session,
        output_count: usize,
        min_presence: f32,
    }

    impl OnnxHandLandmarker {
        pub fn load(model_path: &str, min_presence: f32) -> Result<Self, Error> {
            if !Path::new(model_path).exists() {
                return Err(Error::Detector(format!("model file not found: {model_path}")));
            }

            let session = Session::builder()
                .map_err(|e| load_err(model_path, e))?
                .with_intra_threads(2)
                .map_err(|e| load_err(model_path, e))?
                .commit_from_file(model_path)
                .map_err(|e| load_err(model_path, e))?;

            let output_names: Vec<String> =
                session.outputs().iter().map(|o| o.name().to_string()).collect();
            log::info!("loaded hand landmark model {model_path} (outputs: {output_names:?})");

            Ok(Self { session, output_count: output_names.len(), min_presence })
        }

        fn preprocess(image: &RgbImage) -> Array4<f32> {
            let resized = imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
            let n = INPUT_SIZE as usize;
            let mut tensor = Array4::<f32>::zeros((1, n, n, 3));
            for (x, y, px) in resized.enumerate_pixels() {
                for c in 0..3 {
                    tensor[[0, y as usize, x as usize, c]] = px[c] as f32 / 255.0;
                }
            }
            tensor
        }
    }

    impl LandmarkDetector for OnnxHandLandmarker {
        fn detect(&mut self, image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
            let input = Self::preprocess(image);
            let tensor = TensorRef::from_array_view(input.view())
                .map_err(|e| Error::Detector(format!("input tensor: {e}")))?;
            let outputs = self
                .session
                .run(ort::inputs![tensor])
                .map_err(|e| Error::Detector(format!("inference: {e}")))?;

            let mut coords: Option<Vec<f32>> = None;
            let mut presence: Option<f32> = None;
            for idx in 0..self.output_count {
                let Ok((_, data)) = outputs[idx].try_extract_tensor::<f32>() else { continue };
                if coords.is_none() && data.len() == LANDMARK_VALUES {
                    coords = Some(data.to_vec());
                } else if presence.is_none() && data.len() == 1 {
                    presence = Some(data[0]);
                }
            }

            let coords = coords
                .ok_or_else(|| Error::Detector(format!("no {LANDMARK_VALUES}-value landmark output")))?;
            if presence.unwrap_or(0.0) < self.min_presence {
                return Ok(Vec::new());
            }

            let scale = INPUT_SIZE as f32;
            let mut points = [Landmark::default(); NUM_LANDMARKS];
            for (lm, xyz) in points.iter_mut().zip(coords.chunks_exact(3)) {
                *lm = Landmark { x: xyz[0] / scale, y: xyz[1] / scale, z: xyz[2] / scale };
            }
            Ok(vec![HandLandmarks::new(points)])
        }

        fn name(&self) -> &'static str {
            "onnx hand landmarks"
        }
    }
}
