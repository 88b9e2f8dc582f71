//! Frame acquisition contract.
//!
//! A source hands the engine the frame that is current *now*, tagged with a
//! [`FrameToken`] that stays stable across repeated polls of the same decoded
//! frame. How frames are acquired is entirely the source's business.

/// Recorded landmark sessions (JSON lines)
pub mod replay;

/// `OpenCV` camera, video file and still image sources
#[cfg(feature = "capture")]
pub mod capture;

use crate::Result;
use std::{fmt, time::Duration};

/// Opaque per-frame identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Token for a still image, which is only ever processed once
    pub const STILL: Self = Self(0);

    /// Token from a monotonically increasing frame counter
    #[must_use]
    pub const fn sequence(n: u64) -> Self {
        Self(n)
    }

    /// Token from a presentation timestamp, at microsecond resolution
    #[must_use]
    pub fn from_timestamp(ts: Duration) -> Self {
        Self(u64::try_from(ts.as_micros()).unwrap_or(u64::MAX))
    }

    /// Token from a presentation timestamp in (possibly fractional) milliseconds
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Range checked before the cast
    pub fn from_millis(ms: f64) -> Self {
        let micros = (ms * 1000.0).round();
        if micros.is_finite() && micros > 0.0 {
            Self(micros.min(u64::MAX as f64) as u64)
        } else {
            Self(0)
        }
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Acquisition mode of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Live camera
    Camera,
    /// Decoded video file or recorded session
    Video,
    /// One still image, processed exactly once
    StillImage,
}

impl SourceKind {
    /// Whether the dispatcher keeps ticking after a pass
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        !matches!(self, Self::StillImage)
    }
}

/// The current frame of a source
#[derive(Debug, Clone)]
pub struct SourceFrame<F> {
    pub token: FrameToken,
    pub width: u32,
    pub height: u32,
    pub frame: F,
}

/// Result of polling a source
#[derive(Debug)]
pub enum SourcePoll<F> {
    /// A decodable frame is available
    Frame(SourceFrame<F>),
    /// Nothing to process this cycle (decoder not ready, undecodable frame)
    Pending,
    /// The source has no more frames
    Ended,
}

/// Source Adapter contract
pub trait FrameSource {
    /// Frame representation handed to the detector
    type Frame;

    /// Acquisition mode
    fn kind(&self) -> SourceKind;

    /// Obtain the current frame
    ///
    /// # Errors
    ///
    /// Returns an error if acquisition failed for this cycle; the engine
    /// reports it and keeps going.
    fn poll(&mut self) -> Result<SourcePoll<Self::Frame>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_millis() {
        assert_eq!(FrameToken::from_millis(16.5).value(), 16_500);
        assert_eq!(FrameToken::from_millis(f64::NAN), FrameToken::from_millis(-1.0));
        assert_eq!(FrameToken::from_timestamp(Duration::from_millis(2)).value(), 2_000);
        assert_eq!(FrameToken::sequence(7).to_string(), "#7");
    }

    #[test]
    fn test_continuous_kinds() {
        assert!(SourceKind::Camera.is_continuous());
        assert!(SourceKind::Video.is_continuous());
        assert!(!SourceKind::StillImage.is_continuous());
    }
}
