//! Everything that survives from one frame to the next, in one place.
//!
//! The frame loop owns a single [`Session`] and hands it each camera frame;
//! detection, gesture filter and stroke recorder run inside
//! [`Session::process_frame`]. The camera gate and the frame size check live
//! here too, so a skipped frame touches none of the state.

use log::{info, warn};

use crate::config::Style;
use crate::gesture::{GestureReading, PinchState, read_gesture};
use crate::ink::InkLayer;
use crate::landmarks::Hand;
use crate::stroke::{StrokeOutcome, StrokeRecorder};
use crate::types::{FrameBuffer, Point};

/// Result of one processed frame, for the compositor and the HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// What the landmark source found in this frame.
    pub hand: Option<Hand>,
    /// Present when a hand was found.
    pub reading: Option<GestureReading>,
    pub outcome: StrokeOutcome,
    /// End of the current stroke path; `None` while hovering or without a hand.
    pub pen: Option<Point>,
}

pub struct Session {
    pinch: PinchState,
    recorder: StrokeRecorder,
    ink: InkLayer,
    sized: bool,
    style: Style,
    camera_active: bool,
}

impl Session {
    pub fn new(style: Style) -> Self {
        Self {
            pinch: PinchState::default(),
            recorder: StrokeRecorder::new(),
            ink: InkLayer::new(0, 0),
            sized: false,
            style,
            camera_active: true,
        }
    }

    /// Run detection, the gesture filter and the stroke recorder for one
    /// camera frame. The ink layer takes its size from the first frame.
    ///
    /// Returns `None` (and leaves every piece of state alone, `detect`
    /// included) while the camera is paused, or when `live` no longer
    /// matches the ink layer's size.
    pub fn process_frame<F>(&mut self, live: &FrameBuffer, detect: F) -> Option<FrameReport>
    where
        F: FnOnce(&FrameBuffer) -> Option<Hand>,
    {
        if !self.camera_active {
            return None;
        }
        if !self.sized {
            info!("Ink layer sized to {}x{}", live.width, live.height);
            self.ink = InkLayer::new(live.width, live.height);
            self.sized = true;
        } else if live.width != self.ink.width || live.height != self.ink.height {
            warn!(
                "Skipping {}x{} frame; ink layer is {}x{}",
                live.width, live.height, self.ink.width, self.ink.height
            );
            return None;
        }

        let hand = detect(live);
        let (reading, outcome) = match hand.as_ref() {
            Some(hand) => {
                let previous = self.recorder.previous_tips();
                let reading = read_gesture(&mut self.pinch, hand, previous, live.width, live.height);
                let outcome = self.recorder.record(&mut self.ink, &reading, &self.style);
                (Some(reading), outcome)
            }
            None => (None, self.recorder.miss()),
        };
        Some(FrameReport { hand, reading, outcome, pen: self.recorder.pen() })
    }

    /// Wipe all ink. Gesture state is left alone.
    pub fn clear(&mut self) {
        self.ink.clear();
        info!("Ink cleared");
    }

    /// Flip the camera gate. Returns the new state.
    pub fn toggle_camera(&mut self) -> bool {
        self.camera_active = !self.camera_active;
        self.camera_active
    }

    pub fn camera_active(&self) -> bool {
        self.camera_active
    }

    pub fn ink(&self) -> &InkLayer {
        &self.ink
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Style edits apply from the next processed frame.
    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn pinch(&self) -> PinchState {
        self.pinch
    }

    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }

    pub fn tracking_lost(&self) -> bool {
        self.recorder.tracking_lost()
    }
}
