// What you SEE:
// • Live (mirrored) camera with a color palette along the top,
//   a Reset button bottom-left and an Eraser button bottom-right.
// • Index finger up, middle finger down: you draw. Any other pose: you don't.
// • Point at a swatch or button to press it. Q quits.
// • Without the `onnx` feature the mouse stands in for the hand:
//   hover to point, hold the left button to draw.

mod app;
mod camera;
mod canvas;
mod config;
mod detector;
mod draw;
mod error;
mod gesture;
mod types;
mod ui;

use app::AirCanvas;
use camera::CameraCapture;
use config::Config;
use detector::LandmarkDetector;
use draw::Drawer;
use error::Error;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::default();

    /* --- Camera + window setup ---
       Visual: window opens sized to whatever the camera delivers. */
    let mut cam = CameraCapture::new(config.camera_index, config.width, config.height)
        .inspect_err(|e| log::error!("Camera not accessible: {e}"))?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new(config.window_title, w as usize, h as usize, config.quit_key)?;

    let mut detector = make_detector(&config)?;
    log::info!("hand tracking: {}", detector.name());

    let mut app = AirCanvas::new(&config);
    app::run(&mut app, &mut cam, detector.as_mut(), &mut drawer)?;

    // Camera stream and window are released as they drop.
    log::info!("bye");
    Ok(())
}

#[cfg(feature = "onnx")]
fn make_detector(config: &Config) -> Result<Box<dyn LandmarkDetector>, Error> {
    let det = detector::OnnxHandLandmarker::load(
        config.detector.model_path,
        config.detector.min_presence,
    )?;
    Ok(Box::new(det))
}

#[cfg(not(feature = "onnx"))]
fn make_detector(_config: &Config) -> Result<Box<dyn LandmarkDetector>, Error> {
    Ok(Box::new(detector::MouseHand::new()))
}
