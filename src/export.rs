//! Still and moving exports of the composed frame.
//!
//! Screenshots are PNG; recordings are looping animated GIFs encoded while
//! the recording runs, so nothing piles up in memory.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use log::info;

use crate::error::Error;
use crate::types::{FrameBuffer, unpack_rgb};

/// Frames per second written into recordings. Camera frames in between are dropped.
pub const RECORD_FPS: u32 = 15;
/// GIF quantizer speed, 1 (best) ..= 30 (fastest).
const GIF_SPEED: i32 = 20;

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn to_rgb_image(fb: &FrameBuffer) -> RgbImage {
    RgbImage::from_fn(fb.width as u32, fb.height as u32, |x, y| {
        let (r, g, b) = unpack_rgb(fb.pixels[y as usize * fb.width + x as usize]);
        Rgb([r, g, b])
    })
}

fn to_rgba_image(fb: &FrameBuffer) -> RgbaImage {
    RgbaImage::from_fn(fb.width as u32, fb.height as u32, |x, y| {
        let (r, g, b) = unpack_rgb(fb.pixels[y as usize * fb.width + x as usize]);
        Rgba([r, g, b, 255])
    })
}

/// Write `fb` as `air-writing-<unix ms>.png` inside `dir`.
pub fn save_screenshot(fb: &FrameBuffer, dir: &Path) -> Result<PathBuf, Error> {
    let path = dir.join(format!("air-writing-{}.png", unix_millis()));
    to_rgb_image(fb)
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;
    info!("Saved screenshot {}", path.display());
    Ok(path)
}

/// An in-progress GIF recording.
pub struct VideoRecorder {
    encoder: GifEncoder<BufWriter<File>>,
    path: PathBuf,
    frames: u32,
    started: Instant,
    last_frame: Option<Instant>,
}

impl VideoRecorder {
    /// Create `air-writing-video-<unix ms>.gif` inside `dir` and get ready for frames.
    pub fn start(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(format!("air-writing-video-{}.gif", unix_millis()));
        let file = File::create(&path)
            .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), GIF_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;

        info!("Recording to {}", path.display());
        Ok(Self { encoder, path, frames: 0, started: Instant::now(), last_frame: None })
    }

    /// Offer one composed frame. Returns whether it was written
    /// (frames arriving faster than `RECORD_FPS` are skipped).
    pub fn push(&mut self, fb: &FrameBuffer) -> Result<bool, Error> {
        self.push_at(fb, Instant::now())
    }

    fn push_at(&mut self, fb: &FrameBuffer, now: Instant) -> Result<bool, Error> {
        let interval_ms = 1000 / RECORD_FPS;
        if let Some(last) = self.last_frame {
            if now.duration_since(last).as_millis() < interval_ms as u128 {
                return Ok(false);
            }
        }

        let frame = Frame::from_parts(to_rgba_image(fb), 0, 0, Delay::from_numer_denom_ms(interval_ms, 1));
        self.encoder
            .encode_frame(frame)
            .map_err(|e| Error::Export(format!("{}: {e}", self.path.display())))?;
        self.frames += 1;
        self.last_frame = Some(now);
        Ok(true)
    }

    /// Close the file. Returns its path.
    pub fn finish(self) -> PathBuf {
        let VideoRecorder { encoder, path, frames, started, .. } = self;
        // Dropping the encoder writes the GIF trailer; the BufWriter flushes on drop.
        drop(encoder);
        info!(
            "Recording saved to {} ({frames} frames, {:.1}s)",
            path.display(),
            started.elapsed().as_secs_f32()
        );
        path
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}
