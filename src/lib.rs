//! # air-writing
//!
//! Write in the air in front of a webcam. A hand-landmark source reports
//! where one hand is each frame; pinching index finger and thumb puts the pen
//! down, releasing lifts it. Ink lives on its own layer composited over the
//! live video until cleared.
//!
//! Per-frame flow:
//!
//! ```text
//! camera frame -> Detector (landmark thread) -> gesture filter -> stroke recorder -> ink layer
//!                                                                                    |
//! camera frame + ink layer + skeleton/cursor overlay -> compositor -> window / exports
//! ```
//!
//! ## Controls
//!
//! | Key | Action |
//! |---|---|
//! | `C` | Clear the ink |
//! | `Space` | Pause / resume the camera |
//! | `1`..`6` | Pick a palette color |
//! | `[` / `]` | Line width -1 / +1 |
//! | `-` / `=` | Sensitivity -0.1 / +0.1 |
//! | `S` | Save a PNG screenshot |
//! | `R` | Start / stop a GIF recording |
//! | `Esc` | Quit |

pub mod camera;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod export;
pub mod gamma;
pub mod gesture;
pub mod hud;
pub mod ink;
pub mod landmarks;
pub mod session;
pub mod stroke;
pub mod types;
