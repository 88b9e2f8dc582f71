//! Pose landmark types and the fixed 33-point full-body topology.

use crate::{constants::NUM_POSE_LANDMARKS, Error, Result};
use serde::{Deserialize, Serialize};

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_HEEL: usize = 29;
pub const RIGHT_HEEL: usize = 30;
pub const LEFT_FOOT_INDEX: usize = 31;
pub const RIGHT_FOOT_INDEX: usize = 32;

/// Body side of a paired landmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Indices of the (hip, knee, ankle) chain for this side
    #[must_use]
    pub const fn leg(self) -> (usize, usize, usize) {
        match self {
            Self::Left => (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
            Self::Right => (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
        }
    }
}

fn full_visibility() -> f64 {
    1.0
}

/// A single landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0-1 of frame width
    pub x: f64,
    /// Vertical position, 0-1 of frame height
    pub y: f64,
    /// Relative depth, if the detector provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detector confidence that the point is visible (0-1)
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, z: None, visibility }
    }

    #[must_use]
    pub const fn with_depth(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Landmark scaled into frame (pixel) space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
    /// Depth, passed through unscaled
    pub z: Option<f64>,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }
}

/// All 33 landmarks of one detected subject in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// Build a set from exactly [`NUM_POSE_LANDMARKS`] points
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the point count is wrong
    pub fn new(points: Vec<Landmark>) -> Result<Self> {
        if points.len() != NUM_POSE_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {NUM_POSE_LANDMARKS} landmarks, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Parse a flat buffer of `x, y, z, visibility` quadruples (132 values)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the buffer length is not 33 × 4
    pub fn from_flat(data: &[f32]) -> Result<Self> {
        const STRIDE: usize = 4;
        if data.len() != NUM_POSE_LANDMARKS * STRIDE {
            return Err(Error::InvalidInput(format!(
                "Invalid landmark data length: {} (expected {})",
                data.len(),
                NUM_POSE_LANDMARKS * STRIDE
            )));
        }
        let points = data
            .chunks_exact(STRIDE)
            .map(|c| Landmark {
                x: f64::from(c[0]),
                y: f64::from(c[1]),
                z: Some(f64::from(c[2])),
                visibility: f64::from(c[3]),
            })
            .collect();
        Self::new(points)
    }

    /// Landmark at a topology index
    ///
    /// # Panics
    ///
    /// Panics if `index >= 33`; the topology constants are always in range
    #[must_use]
    pub fn get(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = Error;

    fn try_from(points: Vec<Landmark>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

impl std::ops::Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Landmark {
        &self.points[index]
    }
}
