// What you SEE:
// • Live camera is always the base image, with everything you've written on top.
// • Pinch index finger and thumb (or hold the left mouse button) to write.
// • C clears the ink, space pauses the camera, 1-6 pick a color,
//   [ ] change the width, - = change the detector sensitivity.
// • S saves a PNG, R starts/stops a GIF recording. ESC quits.

use std::fs::File;
use std::io::BufReader;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use minifb::Key;

use air_writing::camera::CameraCapture;
use air_writing::compositor::{Overlay, compose};
use air_writing::config::{Args, Config, LandmarkInput, PALETTE, SENSITIVITY_STEP};
use air_writing::draw::Drawer;
use air_writing::error::Error;
use air_writing::export::{VideoRecorder, save_screenshot};
use air_writing::gamma::GammaLut;
use air_writing::hud::{HudState, Notice, draw_hud};
use air_writing::landmarks::{Detector, Pointer, PointerSource, ScriptSource};
use air_writing::session::Session;
use air_writing::types::FrameBuffer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const COLOR_KEYS: [Key; 6] = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];

fn main() -> Result<(), Error> {
    let config = Config::from(Args::parse());

    init_logging();
    info!("air-writing v{VERSION}");

    /* --- Camera + window setup --- */
    let mut cam = CameraCapture::new(config.camera_index, config.width, config.height)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Air Writing", w as usize, h as usize)?;

    /* --- Landmark source on its own thread --- */
    let pointer = Arc::new(Mutex::new(Pointer::default()));
    let detector = spawn_detector(&config.landmarks, pointer.clone())?;
    info!("Hand landmarks from {}", config.landmarks);
    detector.configure(config.style.confidence());

    /* --- Frame state + reusable buffers ---
       `screen` is the composed frame (what exports see),
       `display` is `screen` plus HUD text (what the window shows).
       Both are resized to the first decoded frame. */
    let mut session = Session::new(config.style.clone());
    let lut = GammaLut::new();
    let mut screen = FrameBuffer::new(w as usize, h as usize);
    let mut display = screen.clone();

    let mut recorder: Option<VideoRecorder> = None;
    let mut notice: Option<Notice> = None;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Session controls */
        if drawer.pressed_once(Key::C) {
            session.clear();
        }
        if drawer.pressed_once(Key::Space) {
            if session.toggle_camera() {
                cam.resume()?;
                info!("Camera resumed");
            } else {
                cam.pause()?;
                info!("Camera paused");
            }
        }
        for (i, key) in COLOR_KEYS.iter().enumerate() {
            if drawer.pressed_once(*key) {
                session.style_mut().color = PALETTE[i];
            }
        }
        if drawer.pressed_once(Key::LeftBracket) {
            let width = session.style().line_width.saturating_sub(1);
            session.style_mut().set_line_width(width);
        }
        if drawer.pressed_once(Key::RightBracket) {
            let width = session.style().line_width + 1;
            session.style_mut().set_line_width(width);
        }
        let sensitivity_step = if drawer.pressed_once(Key::Minus) {
            -SENSITIVITY_STEP
        } else if drawer.pressed_once(Key::Equal) {
            SENSITIVITY_STEP
        } else {
            0.0
        };
        if sensitivity_step != 0.0 {
            let value = session.style().sensitivity + sensitivity_step;
            session.style_mut().set_sensitivity(value);
            detector.configure(session.style().confidence());
        }
        if drawer.pressed_once(Key::S) {
            notice = Some(match save_screenshot(&screen, &config.output_dir) {
                Ok(path) => Notice::new(format!("Saved {}", path.display())),
                Err(e) => {
                    warn!("{e}");
                    Notice::new("Could not save screenshot")
                }
            });
        }
        if drawer.pressed_once(Key::R) {
            match recorder.take() {
                Some(rec) => {
                    let path = rec.finish();
                    notice = Some(Notice::new(format!("Saved {}", path.display())));
                }
                None => match VideoRecorder::start(&config.output_dir) {
                    Ok(rec) => recorder = Some(rec),
                    Err(e) => {
                        warn!("{e}");
                        notice = Some(Notice::new("Recording unavailable"));
                    }
                },
            }
        }

        /* 2) Mouse -> pointer hand (only read by the pointer source) */
        if let Ok(mut p) = pointer.lock() {
            p.position = drawer.mouse_normalized();
            p.pressed = drawer.left_mouse_down();
        }

        /* 3) One camera frame through detection, gesture filter, strokes, compositor.
           While paused nothing is grabbed and the last frame stays up. */
        if session.camera_active() {
            let live = cam.next_frame()?;
            if let Some(report) = session.process_frame(&live, |frame| detector.detect(frame)) {
                if screen.width != live.width || screen.height != live.height {
                    screen = FrameBuffer::new(live.width, live.height);
                }
                let overlay = match (report.hand.as_ref(), report.reading.as_ref()) {
                    (Some(hand), Some(reading)) => Some(Overlay {
                        hand,
                        reading,
                        pen: report.pen,
                        color: session.style().color,
                    }),
                    _ => None,
                };

                match compose(&mut screen, &live, session.ink(), &lut, overlay.as_ref()) {
                    Ok(()) => {
                        if let Some(rec) = recorder.as_mut() {
                            if let Err(e) = rec.push(&screen) {
                                warn!("{e}");
                                notice = Some(Notice::new("Recording stopped: encoder failed"));
                                recorder = None;
                            }
                        }
                    }
                    Err(e) => warn!("Frame skipped: {e}"),
                }
            }
        }

        /* 4) HUD on a copy, then present */
        if notice.as_ref().is_some_and(Notice::expired) {
            notice = None;
        }
        display.clone_from(&screen);
        draw_hud(
            &mut display,
            &HudState {
                style: session.style(),
                camera_active: session.camera_active(),
                tracking_lost: session.tracking_lost(),
                recording: recorder.is_some(),
                fps_text: &fps_text,
                notice: notice.as_ref(),
            },
        );
        drawer.present(&display)?;

        /* 5) FPS counter (logged + HUD once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!("FPS: {fps:.1}");
            fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    if let Some(rec) = recorder {
        rec.finish();
    }
    Ok(())
}

fn spawn_detector(input: &LandmarkInput, pointer: Arc<Mutex<Pointer>>) -> Result<Detector, Error> {
    Ok(match input {
        LandmarkInput::Pointer => Detector::spawn(PointerSource::new(pointer)),
        LandmarkInput::Stdin => Detector::spawn(ScriptSource::new(Box::new(BufReader::new(std::io::stdin())))),
        LandmarkInput::File(path) => {
            let file = File::open(path)
                .map_err(|e| Error::Config(format!("--landmarks {}: {e}", path.display())))?;
            Detector::spawn(ScriptSource::new(Box::new(BufReader::new(file))))
        }
    })
}

fn init_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("nokhwa", LevelFilter::Warn)
        .parse_default_env()
        .init();
}
