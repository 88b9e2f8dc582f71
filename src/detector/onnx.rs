//! Pose landmark model on `ONNX` Runtime.
//!
//! Runs a BlazePose-style full-body landmark network on the whole frame.
//! The network emits 39 rows of `x, y, z, visibility, presence` in input
//! pixel space (the first 33 are the body topology) plus a pose presence
//! score in a second output.

use super::PoseDetector;
use crate::{
    constants::NUM_POSE_LANDMARKS,
    landmarks::{Landmark, LandmarkSet},
    utils::safe_cast::{sigmoid, usize_to_i32},
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Values per landmark row in the model output
const LANDMARK_STRIDE: usize = 5;

/// Full-body landmark detector using `ONNX` Runtime
pub struct OnnxPoseDetector {
    session: Session,
    input_size: usize,
    presence_threshold: f32,
}

impl OnnxPoseDetector {
    /// Load a landmark model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: usize, presence_threshold: f32) -> Result<Self> {
        log::info!(
            "Initializing pose landmark model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_landmarker")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelError("Model has no inputs".to_string()));
        }

        Ok(Self {
            session,
            input_size,
            presence_threshold,
        })
    }

    /// Resize to the model input, convert BGR to RGB and scale to [0, 1] (NHWC)
    fn preprocess(&self, image: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(usize_to_i32(size)?, usize_to_i32(size)?),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                for ch in 0..channels {
                    data[(row * size + col) * channels + ch] = pixel[ch];
                }
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelError(format!("Failed to create array: {e}")))
    }

    /// Run the network, returning every output flattened
    fn forward(&self, input: Array4<f32>) -> Result<Vec<Vec<f32>>> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mut flattened = Vec::with_capacity(outputs.len());
        for output in &outputs {
            let tensor = output.try_extract::<f32>()?;
            let view = tensor.view();
            let data = view
                .as_slice()
                .ok_or_else(|| Error::ModelOutputError("Failed to get output data".to_string()))?;
            flattened.push(data.to_vec());
        }
        Ok(flattened)
    }
}

/// Convert raw landmark rows into a normalized landmark set
///
/// # Errors
///
/// Returns `ModelOutputError` if the tensor is shorter than 33 rows
#[allow(clippy::cast_precision_loss)] // Model input sizes are small
pub fn decode_landmarks(raw: &[f32], input_size: usize) -> Result<LandmarkSet> {
    if raw.len() < NUM_POSE_LANDMARKS * LANDMARK_STRIDE {
        return Err(Error::ModelOutputError(format!(
            "Expected at least {} landmark values, got {}",
            NUM_POSE_LANDMARKS * LANDMARK_STRIDE,
            raw.len()
        )));
    }

    let scale = input_size as f32;
    let points = raw
        .chunks_exact(LANDMARK_STRIDE)
        .take(NUM_POSE_LANDMARKS)
        .map(|row| Landmark {
            x: f64::from(row[0] / scale),
            y: f64::from(row[1] / scale),
            z: Some(f64::from(row[2] / scale)),
            visibility: f64::from(sigmoid(row[3])),
        })
        .collect();
    LandmarkSet::new(points)
}

impl PoseDetector for OnnxPoseDetector {
    type Frame = Mat;

    fn detect(&mut self, frame: &Mat) -> Result<Vec<LandmarkSet>> {
        let input = self.preprocess(frame)?;
        let outputs = self.forward(input)?;

        let landmarks = outputs
            .first()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        // Second output, when present, is the pose presence score
        if let Some(presence) = outputs.get(1).and_then(|o| o.first()) {
            if *presence < self.presence_threshold {
                return Ok(Vec::new());
            }
        }

        Ok(vec![decode_landmarks(landmarks, self.input_size)?])
    }
}
