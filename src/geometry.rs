//! Planar geometry on landmark points.
//!
//! Pure functions; all angles are returned in degrees.

use crate::landmarks::{Landmark, PixelPoint};

/// Angle at vertex `b` between rays `b→a` and `b→c`, in `[0, 180]`
///
/// Uses the dot product identity `cos(θ) = (v1 · v2) / (|v1| × |v2|)`.
/// Returns `None` when either ray has zero length.
#[must_use]
pub fn angle(a: PixelPoint, b: PixelPoint, c: PixelPoint) -> Option<f64> {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if mag1 == 0.0 || mag2 == 0.0 {
        return None;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    // Clamp against floating-point drift outside acos' domain
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Signed lean of the segment `proximal→distal` from vertical
///
/// `atan2(Δx, |Δy|)`, so the result lies in `[-90, 90]` and its sign gives the
/// lateral direction. A horizontal segment yields ±90°, coincident points 0°.
#[must_use]
pub fn sagittal_tilt(distal: PixelPoint, proximal: PixelPoint) -> f64 {
    let dx = distal.x - proximal.x;
    let dy = distal.y - proximal.y;
    dx.atan2(dy.abs()).to_degrees()
}

/// Scale a normalized landmark into frame space
#[must_use]
pub fn to_frame_space(landmark: &Landmark, width: f64, height: f64) -> PixelPoint {
    PixelPoint {
        x: landmark.x * width,
        y: landmark.y * height,
        z: landmark.z,
    }
}

/// Euclidean distance in the image plane
#[must_use]
pub fn distance(a: PixelPoint, b: PixelPoint) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
