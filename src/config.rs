use std::fmt::Display;
use std::path::PathBuf;

use clap::Parser;

use crate::error::Error;
use crate::landmarks::Confidence;

pub const SENSITIVITY_MIN: f32 = 0.2;
pub const SENSITIVITY_MAX: f32 = 0.8;
pub const SENSITIVITY_STEP: f32 = 0.1;

/// Colors reachable with the number keys 1..6.
pub const PALETTE: [u32; 6] = [
    0x00_FF_3B_30, // red
    0x00_FF_CC_00, // yellow
    0x00_34_C7_59, // green
    0x00_00_7A_FF, // blue
    0x00_AF_52_DE, // purple
    0x00_FF_FF_FF, // white
];

/// Ink settings the user can change while running.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Ink color as 0x00RRGGBB.
    pub color: u32,
    /// Stroke width in pixels, always >= 1.
    pub line_width: u32,
    /// Forwarded verbatim to both landmark confidence thresholds.
    /// Lower means the detector accepts weaker hands.
    pub sensitivity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self { color: PALETTE[0], line_width: 5, sensitivity: 0.5 }
    }
}

impl Style {
    pub fn set_line_width(&mut self, width: u32) {
        self.line_width = width.max(1);
    }

    pub fn set_sensitivity(&mut self, value: f32) {
        // Round to the slider step so repeated +/- don't drift.
        let stepped = (value / 0.05).round() * 0.05;
        self.sensitivity = stepped.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX);
    }

    pub fn confidence(&self) -> Confidence {
        Confidence { detection: self.sensitivity, tracking: self.sensitivity }
    }
}

/// Where per-frame hand landmarks come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandmarkInput {
    /// Synthesized from the mouse pointer.
    Pointer,
    /// One frame per line on standard input.
    Stdin,
    /// One frame per line from a file.
    File(PathBuf),
}

impl Display for LandmarkInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LandmarkInput::Pointer => f.write_str("mouse pointer"),
            LandmarkInput::Stdin => f.write_str("stdin"),
            LandmarkInput::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Command-line flags.
#[derive(Parser, Debug)]
#[command(name = "air-writing", version, about = "Write in the air over the live webcam image")]
pub struct Args {
    /// Camera device index (0 = default webcam)
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture resolution, WxH; the camera may pick a close one
    #[arg(long, default_value = "1280x720", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Hand landmarks: `pointer` (mouse), `-` (stdin) or a file path
    #[arg(long, default_value = "pointer", value_parser = parse_landmarks)]
    pub landmarks: LandmarkInput,

    /// Initial ink color, #RRGGBB
    #[arg(long, default_value = "#FF3B30", value_parser = parse_color)]
    pub color: u32,

    /// Initial stroke width in pixels
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Detector confidence, 0.2 ..= 0.8
    #[arg(long, default_value_t = 0.5, value_parser = parse_sensitivity)]
    pub sensitivity: f32,

    /// Directory screenshots and recordings are written to
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Camera device index (0 = default webcam).
    pub camera_index: u32,
    /// Requested capture resolution; the camera may pick a close one.
    pub width: u32,
    pub height: u32,
    pub landmarks: LandmarkInput,
    /// Directory screenshots and recordings are written to.
    pub output_dir: PathBuf,
    pub style: Style,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let (width, height) = args.size;
        Self {
            camera_index: args.camera,
            width,
            height,
            landmarks: args.landmarks,
            output_dir: args.out,
            style: Style { color: args.color, line_width: args.width, sensitivity: args.sensitivity },
        }
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), Error> {
    let bad = || Error::Config(format!("expected WxH, got {value:?}"));
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(bad)?;
    let w: u32 = w.trim().parse().map_err(|_| bad())?;
    let h: u32 = h.trim().parse().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(Error::Config("size must be non-zero".into()));
    }
    Ok((w, h))
}

fn parse_landmarks(value: &str) -> Result<LandmarkInput, Error> {
    Ok(match value {
        "pointer" => LandmarkInput::Pointer,
        "-" => LandmarkInput::Stdin,
        path => LandmarkInput::File(PathBuf::from(path)),
    })
}

fn parse_sensitivity(value: &str) -> Result<f32, Error> {
    let s: f32 = value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("not a number: {value:?}")))?;
    if !(SENSITIVITY_MIN..=SENSITIVITY_MAX).contains(&s) {
        return Err(Error::Config(format!("must be within {SENSITIVITY_MIN}..={SENSITIVITY_MAX}")));
    }
    Ok(s)
}

/// Parse `#RRGGBB` (leading `#` optional) into 0x00RRGGBB.
pub fn parse_color(value: &str) -> Result<u32, Error> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Config(format!("color must look like #RRGGBB, got {value:?}")));
    }
    u32::from_str_radix(hex, 16).map_err(|e| Error::Config(format!("color {value:?}: {e}")))
}

/// Format 0x00RRGGBB as `#RRGGBB`.
pub fn format_color(color: u32) -> String {
    format!("#{:06X}", color & 0x00_FF_FF_FF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(flags: &[&str]) -> Result<Config, clap::Error> {
        let argv = std::iter::once("air-writing").chain(flags.iter().copied());
        Args::try_parse_from(argv).map(Config::from)
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.camera_index, 0);
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.landmarks, LandmarkInput::Pointer);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.style, Style::default());
    }

    #[test]
    fn test_all_flags() {
        let config = parse(&[
            "--camera", "2", "--size", "640x480", "--landmarks", "-", "--color", "#00ff00",
            "--width", "9", "--sensitivity", "0.3", "--out", "/tmp/ink",
        ])
        .unwrap();
        assert_eq!(config.camera_index, 2);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.landmarks, LandmarkInput::Stdin);
        assert_eq!(config.style.color, 0x00_00_FF_00);
        assert_eq!(config.style.line_width, 9);
        assert!((config.style.sensitivity - 0.3).abs() < 1e-6);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/ink"));
    }

    #[test]
    fn test_landmark_file_flag() {
        let config = parse(&["--landmarks", "hands.txt"]).unwrap();
        assert_eq!(config.landmarks, LandmarkInput::File(PathBuf::from("hands.txt")));
    }

    #[test]
    fn test_help_is_not_a_config() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_bad_flags_are_errors() {
        assert!(parse(&["--bogus", "1"]).is_err());
        assert!(parse(&["--width"]).is_err());
        assert!(parse(&["--width", "0"]).is_err());
        assert!(parse(&["--size", "640"]).is_err());
        assert!(parse(&["--size", "0x480"]).is_err());
        assert!(parse(&["--color", "red"]).is_err());
        assert!(parse(&["--sensitivity", "0.95"]).is_err());
        assert!(parse(&["--sensitivity", "0.1"]).is_err());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(parse_color("#FF3B30").unwrap(), 0x00_FF_3B_30);
        assert_eq!(parse_color("0a0b0c").unwrap(), 0x00_0A_0B_0C);
        assert!(parse_color("#FFF").is_err());
        assert!(parse_color("#GG0000").is_err());
        assert_eq!(format_color(0x00_0A_0B_0C), "#0A0B0C");
    }

    #[test]
    fn test_sensitivity_clamps() {
        let mut style = Style::default();
        style.set_sensitivity(0.05);
        assert!((style.sensitivity - SENSITIVITY_MIN).abs() < 1e-6);
        style.set_sensitivity(1.0);
        assert!((style.sensitivity - SENSITIVITY_MAX).abs() < 1e-6);
        let c = style.confidence();
        assert_eq!(c.detection, c.tracking);
    }

    #[test]
    fn test_line_width_stays_positive() {
        let mut style = Style::default();
        style.set_line_width(0);
        assert_eq!(style.line_width, 1);
    }
}
