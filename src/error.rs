// Errors of the air-writing app: window and camera setup (fatal), bad
// landmark input (becomes "no hand"), bad flags, failed exports.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    WindowInit(String),   // Creating the window failed
    WindowUpdate(String), // Updating the window buffer failed
    CameraInit(String),   // Opening/starting/stopping the camera failed
    CameraFrame(String),  // Grabbing/decoding a frame failed
    Landmarks(String),    // The landmark source produced something unusable
    Config(String),       // Bad command-line flag or value
    Export(String),       // Writing a screenshot or recording failed
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::CameraInit(s) => write!(f, "Camera init error: {s}"),
            Error::CameraFrame(s) => write!(f, "Camera frame error: {s}"),
            Error::Landmarks(s) => write!(f, "Landmark error: {s}"),
            Error::Config(s) => write!(f, "Config error: {s}"),
            Error::Export(s) => write!(f, "Export error: {s}"),
        }
    }
}

impl std::error::Error for Error {}
