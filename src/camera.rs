// Webcam capture. `next_frame()` hands back a FrameBuffer of 0x00RRGGBB
// pixels ready for the compositor; `pause`/`resume` gate the stream.

use log::{debug, info};

use crate::error::Error;
use crate::types::{FrameBuffer, pack_rgb};

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` close to the requested resolution and start streaming.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| Error::CameraInit(format!("Create camera {index}: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The stream may have settled on a different resolution.
        let actual = cam.resolution();
        info!(
            "Camera {index} streaming at {}x{} (asked for {width}x{height})",
            actual.width(),
            actual.height()
        );

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }

    /// Grab one frame (blocks until the camera delivers) as packed RGB.
    pub fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img
            .pixels()
            .map(|p| pack_rgb(p[0], p[1], p[2]))
            .collect();

        Ok(FrameBuffer {
            width: w as usize,
            height: h as usize,
            pixels,
        })
    }

    /// Stop the stream; no frames are produced until `resume`.
    pub fn pause(&mut self) -> Result<(), Error> {
        if self.cam.is_stream_open() {
            self.cam
                .stop_stream()
                .map_err(|e| Error::CameraInit(format!("Stop stream: {e}")))?;
            debug!("Camera stream stopped");
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), Error> {
        if !self.cam.is_stream_open() {
            self.cam
                .open_stream()
                .map_err(|e| Error::CameraInit(format!("Reopen stream: {e}")))?;
            debug!("Camera stream reopened");
        }
        Ok(())
    }

    /// The resolution the camera is actually delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
