//! Hand landmarks and the sources that produce them.
//!
//! The frame loop never talks to a source directly. [`Detector::spawn`] moves
//! the source onto its own thread and the loop sends one frame per request,
//! then blocks on the single reply. Anything that goes wrong on the other side
//! (source error, dead thread) comes back as "no hand".

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, warn};

use crate::error::Error;
use crate::types::{FrameBuffer, Point};

// ---------------------------------------------------------------------------
// Landmark indices (MediaPipe hand scheme)
// ---------------------------------------------------------------------------

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Bones drawn by the skeleton overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// One detected hand: 21 points in normalized [0,1] image coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks: [Point; LANDMARK_COUNT],
}

impl Hand {
    pub fn index_tip(&self) -> Point {
        self.landmarks[INDEX_TIP]
    }

    pub fn thumb_tip(&self) -> Point {
        self.landmarks[THUMB_TIP]
    }

    /// Build a plausible right hand whose index and thumb tips sit exactly at
    /// the given normalized positions. The other fingers are loosely curled.
    pub fn posed(index_tip: Point, thumb_tip: Point) -> Hand {
        let wrist = Point::new(index_tip.x + 0.03, index_tip.y + 0.32);
        let along = |from: Point, to: Point, t: f32| {
            Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
        };
        let offset = |p: Point, dx: f32, dy: f32| Point::new(p.x + dx, p.y + dy);

        let mut lm = [Point::default(); LANDMARK_COUNT];
        lm[WRIST] = wrist;

        lm[THUMB_CMC] = offset(along(wrist, thumb_tip, 0.25), -0.015, 0.0);
        lm[THUMB_MCP] = offset(along(wrist, thumb_tip, 0.50), -0.015, 0.0);
        lm[THUMB_IP] = offset(along(wrist, thumb_tip, 0.75), -0.008, 0.0);
        lm[THUMB_TIP] = thumb_tip;

        lm[INDEX_MCP] = along(wrist, index_tip, 0.45);
        lm[INDEX_PIP] = along(wrist, index_tip, 0.65);
        lm[INDEX_DIP] = along(wrist, index_tip, 0.82);
        lm[INDEX_TIP] = index_tip;

        // (mcp index, mcp offset from wrist) for the curled fingers
        let curled = [(MIDDLE_MCP, 0.035, -0.15), (RING_MCP, 0.065, -0.135), (PINKY_MCP, 0.09, -0.11)];
        for (mcp, dx, dy) in curled {
            let base = offset(wrist, dx, dy);
            lm[mcp] = base;
            lm[mcp + 1] = offset(base, 0.0, -0.05);
            lm[mcp + 2] = offset(base, 0.005, -0.03);
            lm[mcp + 3] = offset(base, 0.01, -0.01);
        }

        Hand { landmarks: lm }
    }
}

/// Confidence thresholds handed to the detector untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Confidence {
    pub detection: f32,
    pub tracking: f32,
}

// ---------------------------------------------------------------------------
// Source trait + worker
// ---------------------------------------------------------------------------

/// Anything that can find at most one hand in a camera frame.
pub trait LandmarkSource: Send + 'static {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Option<Hand>, Error>;

    /// Forward user-chosen thresholds. Sources without a model may ignore them.
    fn configure(&mut self, _confidence: Confidence) {}
}

enum Request {
    Detect(FrameBuffer),
    Configure(Confidence),
}

/// Request/response handle to a [`LandmarkSource`] running on its own thread.
pub struct Detector {
    requests: Sender<Request>,
    replies: Receiver<Option<Hand>>,
}

impl Detector {
    /// Move `source` onto a worker thread.
    pub fn spawn<S: LandmarkSource>(source: S) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (rep_tx, rep_rx) = mpsc::channel::<Option<Hand>>();

        thread::spawn(move || run_worker(source, req_rx, rep_tx));

        Self { requests: req_tx, replies: rep_rx }
    }

    /// Send one frame and wait for the answer. Never fails: anything that
    /// goes wrong is reported as "no hand".
    pub fn detect(&self, frame: &FrameBuffer) -> Option<Hand> {
        if self.requests.send(Request::Detect(frame.clone())).is_err() {
            warn!("Landmark worker is gone; treating frame as empty");
            return None;
        }
        self.replies.recv().unwrap_or(None)
    }

    /// Takes effect on the next detection call.
    pub fn configure(&self, confidence: Confidence) {
        if self.requests.send(Request::Configure(confidence)).is_err() {
            warn!("Landmark worker is gone; confidence change dropped");
        }
    }
}

fn run_worker<S: LandmarkSource>(mut source: S, requests: Receiver<Request>, replies: Sender<Option<Hand>>) {
    for request in requests {
        match request {
            Request::Configure(confidence) => {
                debug!(
                    "Landmark confidence: detection {:.2}, tracking {:.2}",
                    confidence.detection, confidence.tracking
                );
                source.configure(confidence);
            }
            Request::Detect(frame) => {
                let hand = source.detect(&frame).unwrap_or_else(|e| {
                    warn!("{e}");
                    None
                });
                if replies.send(hand).is_err() {
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer source (mouse stands in for a hand)
// ---------------------------------------------------------------------------

/// Mouse state shared between the window (writer) and [`PointerSource`] (reader).
#[derive(Clone, Copy, Debug, Default)]
pub struct Pointer {
    /// Normalized cursor position, `None` while outside the window.
    pub position: Option<Point>,
    /// Left button held.
    pub pressed: bool,
}

/// Thumb offset from the index tip while the button is held (pinch) and released.
const POINTER_THUMB_PINCHED: (f32, f32) = (0.015, 0.02);
const POINTER_THUMB_OPEN: (f32, f32) = (0.07, 0.06);

/// Synthesizes a hand under the mouse cursor; holding the left button pinches.
pub struct PointerSource {
    pointer: Arc<Mutex<Pointer>>,
}

impl PointerSource {
    pub fn new(pointer: Arc<Mutex<Pointer>>) -> Self {
        Self { pointer }
    }
}

impl LandmarkSource for PointerSource {
    fn detect(&mut self, _frame: &FrameBuffer) -> Result<Option<Hand>, Error> {
        let pointer = *self
            .pointer
            .lock()
            .map_err(|_| Error::Landmarks("pointer state poisoned".into()))?;

        Ok(pointer.position.map(|index| {
            let (dx, dy) = if pointer.pressed { POINTER_THUMB_PINCHED } else { POINTER_THUMB_OPEN };
            Hand::posed(index, Point::new(index.x + dx, index.y + dy))
        }))
    }
}

// ---------------------------------------------------------------------------
// Script source (one frame per text line)
// ---------------------------------------------------------------------------

/// Reads pre-computed landmarks, one frame per line, from any reader.
/// Lets an external detector pipe its output in.
pub struct ScriptSource {
    reader: Box<dyn BufRead + Send>,
    line: usize,
    exhausted: bool,
}

impl ScriptSource {
    pub fn new(reader: Box<dyn BufRead + Send>) -> Self {
        Self { reader, line: 0, exhausted: false }
    }
}

impl LandmarkSource for ScriptSource {
    fn detect(&mut self, _frame: &FrameBuffer) -> Result<Option<Hand>, Error> {
        let mut buf = String::new();
        loop {
            if self.exhausted {
                return Ok(None);
            }
            buf.clear();
            let read = self
                .reader
                .read_line(&mut buf)
                .map_err(|e| Error::Landmarks(format!("read line {}: {e}", self.line + 1)))?;
            if read == 0 {
                debug!("Landmark script ended after {} lines", self.line);
                self.exhausted = true;
                return Ok(None);
            }
            self.line += 1;
            if buf.trim_start().starts_with('#') {
                continue;
            }
            return parse_hand_line(&buf).map_err(|e| match e {
                Error::Landmarks(msg) => Error::Landmarks(format!("line {}: {msg}", self.line)),
                other => other,
            });
        }
    }
}

/// Accepted normalized coordinates. Detectors overshoot the frame a little;
/// anything further out (or not finite) is garbage.
const COORD_RANGE: std::ops::RangeInclusive<f32> = -1.0..=2.0;

/// Parse one script line: 42 numbers (x y) or 63 numbers (x y z, z dropped),
/// separated by whitespace and/or commas. Blank, `-` and `none` mean no hand.
pub fn parse_hand_line(line: &str) -> Result<Option<Hand>, Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let values = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f32>()
                .map_err(|_| Error::Landmarks(format!("not a number: {t:?}")))
        })
        .collect::<Result<Vec<f32>, Error>>()?;

    let stride = match values.len() {
        n if n == LANDMARK_COUNT * 2 => 2,
        n if n == LANDMARK_COUNT * 3 => 3,
        n => {
            return Err(Error::Landmarks(format!(
                "expected {} or {} values, got {n}",
                LANDMARK_COUNT * 2,
                LANDMARK_COUNT * 3
            )));
        }
    };

    let mut landmarks = [Point::default(); LANDMARK_COUNT];
    for (i, chunk) in values.chunks_exact(stride).enumerate() {
        let (x, y) = (chunk[0], chunk[1]);
        if !COORD_RANGE.contains(&x) || !COORD_RANGE.contains(&y) {
            return Err(Error::Landmarks(format!("landmark {i} out of range: ({x}, {y})")));
        }
        landmarks[i] = Point::new(x, y);
    }
    Ok(Some(Hand { landmarks }))
}
