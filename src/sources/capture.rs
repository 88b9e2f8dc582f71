//! `OpenCV` acquisition: live camera, video file and still image.

use super::{FrameSource, FrameToken, SourceFrame, SourceKind, SourcePoll};
use crate::{utils::safe_cast::i32_to_u32, Error, Result};
use log::{info, warn};
use opencv::{
    core::Mat,
    imgcodecs,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_POS_MSEC},
};
use std::path::Path;

fn source_frame(frame: Mat, token: FrameToken) -> Result<SourceFrame<Mat>> {
    Ok(SourceFrame {
        token,
        width: i32_to_u32(frame.cols())?,
        height: i32_to_u32(frame.rows())?,
        frame,
    })
}

/// Camera or video file read through `VideoCapture`
pub struct VideoCaptureSource {
    capture: VideoCapture,
    kind: SourceKind,
    frames_read: u64,
}

impl VideoCaptureSource {
    /// Open a camera by index
    ///
    /// # Errors
    ///
    /// Returns an error if the camera cannot be opened
    pub fn camera(index: i32) -> Result<Self> {
        info!("Opening camera {}", index);
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::UnsupportedMedia(format!("Camera {index} could not be opened")));
        }

        // Reduce buffer size for lower latency (webcam only)
        capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;

        Ok(Self {
            capture,
            kind: SourceKind::Camera,
            frames_read: 0,
        })
    }

    /// Open a video file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening video file: {}", path.display());
        let capture = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::UnsupportedMedia(format!(
                "Cannot decode video file: {}",
                path.display()
            )));
        }

        Ok(Self {
            capture,
            kind: SourceKind::Video,
            frames_read: 0,
        })
    }

    /// Token for the frame just read: playback position for files, a counter for cameras
    fn current_token(&self) -> Result<FrameToken> {
        if self.kind == SourceKind::Video {
            let position_ms = self.capture.get(CAP_PROP_POS_MSEC)?;
            if position_ms > 0.0 {
                return Ok(FrameToken::from_millis(position_ms));
            }
        }
        Ok(FrameToken::sequence(self.frames_read))
    }
}

impl FrameSource for VideoCaptureSource {
    type Frame = Mat;

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn poll(&mut self) -> Result<SourcePoll<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            if self.kind == SourceKind::Video {
                info!("End of video file reached");
                return Ok(SourcePoll::Ended);
            }
            warn!("Failed to read frame, retrying...");
            return Ok(SourcePoll::Pending);
        }

        self.frames_read += 1;
        let token = self.current_token()?;
        Ok(SourcePoll::Frame(source_frame(frame, token)?))
    }
}

/// A single decoded image
pub struct StillImageSource {
    image: Option<Mat>,
}

impl StillImageSource {
    /// Decode an image file
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMedia` if the file cannot be decoded
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading image: {}", path.display());
        let image = imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_COLOR)?;
        if image.empty() {
            return Err(Error::UnsupportedMedia(format!("Cannot decode image: {}", path.display())));
        }
        Ok(Self { image: Some(image) })
    }
}

impl FrameSource for StillImageSource {
    type Frame = Mat;

    fn kind(&self) -> SourceKind {
        SourceKind::StillImage
    }

    fn poll(&mut self) -> Result<SourcePoll<Mat>> {
        match self.image.take() {
            Some(image) => Ok(SourcePoll::Frame(source_frame(image, FrameToken::STILL)?)),
            None => Ok(SourcePoll::Ended),
        }
    }
}
