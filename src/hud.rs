// On-screen text drawn over the composed frame. Never part of exports.

use std::time::{Duration, Instant};

use crate::config::{Style, format_color};
use crate::draw::{draw_text_5x7, fill_circle, text_width};
use crate::types::FrameBuffer;

const GUIDE: &str = "Pinch index finger and thumb to write, release to stop";
const LOST: &str = "No hand detected - adjust lighting or distance";
const PAUSED: &str = "Camera paused - press space to resume";
const KEYS: &str = "C clear | space camera | 1-6 color | [ ] width | - = sensitivity | S save | R record";

const TEXT: u32 = 0x00_FF_FF_FF;
const WARNING: u32 = 0x00_DC_35_45;
const REC: u32 = 0x00_FF_30_30;

/// How long a notice stays up.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// A short-lived message, e.g. "saved" or an export failure.
pub struct Notice {
    text: String,
    until: Instant,
}

impl Notice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), until: Instant::now() + NOTICE_TTL }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.until
    }
}

/// Everything the HUD shows this frame.
pub struct HudState<'a> {
    pub style: &'a Style,
    pub camera_active: bool,
    pub tracking_lost: bool,
    pub recording: bool,
    pub fps_text: &'a str,
    pub notice: Option<&'a Notice>,
}

/// Text scale that keeps the HUD readable on large frames.
fn scale_for(fb: &FrameBuffer) -> i32 {
    if fb.width >= 1200 { 2 } else { 1 }
}

pub fn draw_hud(fb: &mut FrameBuffer, hud: &HudState) {
    let scale = scale_for(fb);
    let line = 10 * scale;

    // Top: what to do, or what went wrong.
    let (headline, color) = if !hud.camera_active {
        (PAUSED, TEXT)
    } else if hud.tracking_lost {
        (LOST, WARNING)
    } else {
        (GUIDE, TEXT)
    };
    draw_text_5x7(fb, 8, 8, headline, color, scale);

    // Second line: current style and FPS.
    let status = format!(
        "{} | width {} | sensitivity {:.2} | {}",
        format_color(hud.style.color),
        hud.style.line_width,
        hud.style.sensitivity,
        hud.fps_text
    );
    draw_text_5x7(fb, 8, 8 + line, &status, TEXT, scale);

    if hud.recording {
        let x = fb.width as i32 - text_width("REC", scale) - 8;
        fill_circle(fb, (x - 8 * scale) as f32, (8 + 3 * scale) as f32, 3.0 * scale as f32, REC);
        draw_text_5x7(fb, x, 8, "REC", REC, scale);
    }

    if let Some(notice) = hud.notice {
        draw_text_5x7(fb, 8, 8 + 2 * line, &notice.text, TEXT, scale);
    }

    let bottom = fb.height as i32 - 8 - 7 * scale;
    draw_text_5x7(fb, 8, bottom, KEYS, TEXT, scale);
}
