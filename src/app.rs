//! The application loop: read a frame, draw the UI, let each detected hand
//! draw or press buttons, composite with the canvas, show it.

use std::time::{Duration, Instant};

use crate::camera::FrameSource;
use crate::canvas::{blend_half, Canvas};
use crate::config::Config;
use crate::detector::LandmarkDetector;
use crate::draw::Display;
use crate::error::Error;
use crate::gesture::Stylus;
use crate::types::{FrameBuffer, PointerSample};
use crate::ui::{draw_hand, draw_overlay, hit_test, layout, Brush, BrushMode, UiAction, PALETTE};

/// Everything that survives from one tick to the next.
pub struct AirCanvas {
    brush: Brush,
    stylus: Stylus,
    /// Created on the first frame, sized to it.
    canvas: Option<Canvas>,
    /// Reusable output buffer (what you actually see).
    screen: FrameBuffer,
}

impl AirCanvas {
    pub fn new(config: &Config) -> Self {
        Self {
            brush: Brush::new(config.brush_size, config.eraser_size),
            stylus: Stylus::new(),
            canvas: None,
            screen: FrameBuffer::new(0, 0),
        }
    }

    #[cfg(test)]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    #[cfg(test)]
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Run one frame through the pipeline and return the image to display.
    pub fn process_frame<D>(&mut self, mut frame: FrameBuffer, detector: &mut D) -> Result<&FrameBuffer, Error>
    where
        D: LandmarkDetector + ?Sized,
    {
        frame.mirror_horizontal();
        let (w, h) = (frame.width, frame.height);
        let canvas = self.canvas.get_or_insert_with(|| Canvas::new(w, h));

        let regions = layout(w, h, PALETTE.len());
        draw_overlay(&mut frame, &regions, &self.brush);

        // A failed detection costs one tick of input, nothing more.
        let hands = detector.detect(&frame.to_rgb_image()).unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        });

        // Hands are handled in detector order; on conflicting buttons the last one wins.
        for hand in &hands {
            draw_hand(&mut frame, hand);

            let pos = hand.pointer(w, h);
            self.stylus.update(hand.is_drawing_pose(), pos, self.brush.stroke(), canvas);

            for action in hit_test(&regions, pos) {
                match action {
                    UiAction::SelectColor(i) => {
                        if self.brush.mode() != BrushMode::Color(i) {
                            log::debug!("color {i} selected");
                        }
                        self.brush.select(i);
                    }
                    UiAction::Reset => {
                        log::debug!("canvas reset");
                        canvas.reset();
                    }
                    UiAction::Eraser => {
                        if !self.brush.is_erasing() {
                            log::debug!("eraser on");
                        }
                        self.brush.erase();
                    }
                }
            }
        }

        blend_half(&frame, canvas.buffer(), &mut self.screen)?;
        Ok(&self.screen)
    }
}

/// Counts presented frames and logs the rate once per second.
struct FpsCounter {
    since: Instant,
    frames: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self { since: Instant::now(), frames: 0 }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::debug!("FPS: {:.1}", self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

/// Loop until the quit key, a closed window, or the end of the frame stream.
///
/// A failed read ends the session normally (no retry). Errors from the
/// display itself are returned.
pub fn run<S, D, W>(app: &mut AirCanvas, source: &mut S, detector: &mut D, display: &mut W) -> Result<(), Error>
where
    S: FrameSource + ?Sized,
    D: LandmarkDetector + ?Sized,
    W: Display + ?Sized,
{
    let mut fps = FpsCounter::new();

    while display.is_open() {
        let frame = match source.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}; ending session");
                break;
            }
        };

        let (w, h) = (frame.width.max(1) as f32, frame.height.max(1) as f32);
        detector.observe_pointer(display.pointer().map(|p| PointerSample {
            x: p.x / w,
            y: p.y / h,
            pressed: p.pressed,
        }));

        let screen = app.process_frame(frame, detector)?;
        display.present(screen)?;

        if display.quit_pressed() {
            log::info!("quit key pressed");
            break;
        }
        fps.tick();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::MouseHand;
    use crate::gesture::HandLandmarks;
    use crate::types::rgb;
    use crate::ui::BACKGROUND;
    use image::RgbImage;
    use std::collections::VecDeque;

    /// Yields the queued frames, then reports end of stream.
    struct ScriptedSource {
        frames: VecDeque<FrameBuffer>,
    }

    impl ScriptedSource {
        fn repeat(frame: FrameBuffer, n: usize) -> Self {
            Self { frames: std::iter::repeat_n(frame, n).collect() }
        }
    }

    impl FrameSource for ScriptedSource {
        fn read(&mut self) -> Result<FrameBuffer, Error> {
            self.frames
                .pop_front()
                .ok_or_else(|| Error::CameraFrame("end of stream".into()))
        }
    }

    /// Returns one queued detection result per call; no hands once empty.
    #[derive(Default)]
    struct ScriptedDetector {
        ticks: VecDeque<Result<Vec<HandLandmarks>, Error>>,
    }

    impl ScriptedDetector {
        fn push(&mut self, hands: Vec<HandLandmarks>) -> &mut Self {
            self.ticks.push_back(Ok(hands));
            self
        }
    }

    impl LandmarkDetector for ScriptedDetector {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<HandLandmarks>, Error> {
            self.ticks.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct FakeDisplay {
        presented: usize,
        last: Option<FrameBuffer>,
        quit_after: Option<usize>,
        pointer: Option<PointerSample>,
    }

    impl Display for FakeDisplay {
        fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
            self.presented += 1;
            self.last = Some(frame.clone());
            Ok(())
        }

        fn is_open(&self) -> bool {
            true
        }

        fn quit_pressed(&self) -> bool {
            self.quit_after.is_some_and(|n| self.presented >= n)
        }

        fn pointer(&self) -> Option<PointerSample> {
            self.pointer
        }
    }

    const GRAY: u32 = rgb(100, 60, 20);

    fn app() -> AirCanvas {
        AirCanvas::new(&Config::default())
    }

    /// A hand pointing at pixel (x,y) of a `w`x`h` frame.
    fn hand(x: i32, y: i32, w: usize, h: usize, drawing: bool) -> HandLandmarks {
        MouseHand::synth_hand(x as f32 / w as f32, y as f32 / h as f32, drawing)
    }

    #[test]
    fn idle_session_shows_half_bright_annotated_frame() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut source = ScriptedSource::repeat(FrameBuffer::filled(w, h, GRAY), 10);
        let mut detector = ScriptedDetector::default();
        let mut display = FakeDisplay::default();

        run(&mut app, &mut source, &mut detector, &mut display).unwrap();

        assert_eq!(display.presented, 10);
        assert!(app.canvas().unwrap().buffer().is_blank());

        let mut expected_frame = FrameBuffer::filled(w, h, GRAY);
        draw_overlay(&mut expected_frame, &layout(w, h, PALETTE.len()), app.brush());
        let mut expected = FrameBuffer::new(w, h);
        blend_half(&expected_frame, &FrameBuffer::new(w, h), &mut expected).unwrap();

        let shown = display.last.unwrap();
        assert_eq!(shown, expected);
        assert_eq!(shown.get(400, 300), Some(rgb(50, 30, 10)));
    }

    #[test]
    fn steady_stroke_stamps_a_line_along_the_path() {
        let (w, h) = (800, 400);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        for x in [100, 125, 150, 175, 200] {
            detector.push(vec![hand(x, 100, w, h, true)]);
        }
        for _ in 0..5 {
            app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        }

        let buf = app.canvas().unwrap().buffer();
        let stroke = app.brush().stroke();
        assert_eq!(stroke.color, PALETTE[0]);
        let half = stroke.width / 2;

        for x in 100..=200 {
            for y in (100 - half)..=(100 + half) {
                assert_eq!(buf.get(x, y), Some(stroke.color), "gap at ({x},{y})");
            }
        }
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                if buf.get(x, y) == Some(0) {
                    continue;
                }
                let dx = if x < 100 { 100 - x } else if x > 200 { x - 200 } else { 0 };
                let dy = y - 100;
                assert!(dx * dx + dy * dy <= half * half, "stray stamp at ({x},{y})");
            }
        }
    }

    #[test]
    fn stroke_does_not_bridge_a_pause() {
        let (w, h) = (400, 400);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector
            .push(vec![hand(150, 150, w, h, true)])
            .push(vec![hand(200, 200, w, h, false)])
            .push(vec![hand(300, 250, w, h, true)]);
        for _ in 0..3 {
            app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        }
        assert!(app.canvas().unwrap().buffer().is_blank());
    }

    #[test]
    fn pointing_at_a_swatch_selects_it_without_drawing_pose() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector.push(vec![hand(10 + 3 * 90 + 40, 45, w, h, false)]);
        app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();

        assert_eq!(app.brush().mode(), BrushMode::Color(3));
        assert!(!app.brush().is_erasing());
        assert_eq!(app.brush().stroke().color, PALETTE[3]);
    }

    #[test]
    fn eraser_button_switches_strokes_to_background() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector
            .push(vec![hand(10 + 2 * 90 + 40, 45, w, h, false)]) // pick red
            .push(vec![hand(300, 300, w, h, true)])
            .push(vec![hand(400, 300, w, h, true)])
            .push(vec![hand(730, 565, w, h, false)]) // eraser button
            .push(vec![hand(300, 310, w, h, true)])
            .push(vec![hand(400, 310, w, h, true)]);

        for _ in 0..3 {
            app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        }
        assert_eq!(app.canvas().unwrap().buffer().get(350, 300), Some(PALETTE[2]));

        app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        assert_eq!(app.brush().mode(), BrushMode::Eraser { remembered: 2 });
        assert_eq!(app.brush().stroke().width, 30);

        for _ in 0..2 {
            app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        }
        // A 10px brush along y=310 would miss the red line at y=300; the 30px eraser covers it.
        let buf = app.canvas().unwrap().buffer();
        for y in 295..=305 {
            assert_eq!(buf.get(350, y), Some(BACKGROUND), "red left at y={y}");
        }
    }

    #[test]
    fn reset_button_clears_the_canvas() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector
            .push(vec![hand(300, 300, w, h, true)])
            .push(vec![hand(500, 200, w, h, true)])
            .push(vec![hand(60, 565, w, h, false)]);

        for _ in 0..2 {
            app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        }
        assert!(!app.canvas().unwrap().buffer().is_blank());

        app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        assert!(app.canvas().unwrap().buffer().is_blank());
        assert_eq!(app.canvas().unwrap().dimensions(), (w, h));
    }

    #[test]
    fn last_hand_wins_conflicting_buttons() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector.push(vec![
            hand(10 + 2 * 90 + 40, 45, w, h, false),
            hand(10 + 5 * 90 + 40, 45, w, h, false),
        ]);
        app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        assert_eq!(app.brush().mode(), BrushMode::Color(5));
    }

    #[test]
    fn narrow_frame_fires_every_overlapping_button() {
        let (w, h) = (200, 300);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector
            .push(vec![hand(60, 150, w, h, true)])
            .push(vec![hand(140, 150, w, h, true)])
            .push(vec![hand(100, 265, w, h, false)]); // inside both Reset and Eraser

        for _ in 0..2 {
            app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        }
        assert!(!app.canvas().unwrap().buffer().is_blank());

        app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        assert!(app.canvas().unwrap().buffer().is_blank());
        assert!(app.brush().is_erasing());
    }

    #[test]
    fn detected_hand_skeleton_is_shown() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector.push(vec![hand(400, 300, w, h, false)]);
        let screen = app.process_frame(FrameBuffer::filled(w, h, GRAY), &mut detector).unwrap();
        // Red joint marker over a blank canvas, halved by the blend.
        assert_eq!(screen.get(400, 300), Some(rgb(128, 0, 0)));
        assert_eq!(screen.get(10, 300), Some(rgb(50, 30, 10)));
    }

    #[test]
    fn detector_failure_skips_only_that_tick() {
        let (w, h) = (400, 300);
        let mut app = app();
        let mut detector = ScriptedDetector::default();
        detector.ticks.push_back(Err(Error::Detector("boom".into())));
        detector.push(vec![hand(10 + 90 + 40, 45, w, h, false)]);

        let mut source = ScriptedSource::repeat(FrameBuffer::filled(w, h, GRAY), 2);
        let mut display = FakeDisplay::default();
        run(&mut app, &mut source, &mut detector, &mut display).unwrap();
        assert_eq!(display.presented, 2);
        assert_eq!(app.brush().mode(), BrushMode::Color(1));
    }

    #[test]
    fn quit_key_stops_before_the_stream_ends() {
        let mut app = app();
        let mut source = ScriptedSource::repeat(FrameBuffer::filled(64, 48, GRAY), 10);
        let mut detector = ScriptedDetector::default();
        let mut display = FakeDisplay { quit_after: Some(3), ..Default::default() };
        run(&mut app, &mut source, &mut detector, &mut display).unwrap();
        assert_eq!(display.presented, 3);
        assert_eq!(source.frames.len(), 7);
    }

    #[test]
    fn mouse_pointer_reaches_the_simulated_hand() {
        let (w, h) = (800, 600);
        let mut app = app();
        let mut source = ScriptedSource::repeat(FrameBuffer::filled(w, h, GRAY), 1);
        let mut detector = MouseHand::new();
        let mut display = FakeDisplay {
            pointer: Some(PointerSample { x: 730.0, y: 565.0, pressed: false }),
            ..Default::default()
        };
        run(&mut app, &mut source, &mut detector, &mut display).unwrap();
        assert!(app.brush().is_erasing());
    }

    #[test]
    fn canvas_is_created_lazily_from_the_first_frame() {
        let mut app = app();
        assert!(app.canvas().is_none());
        let mut detector = ScriptedDetector::default();
        app.process_frame(FrameBuffer::filled(320, 240, GRAY), &mut detector).unwrap();
        assert_eq!(app.canvas().unwrap().dimensions(), (320, 240));
    }
}
