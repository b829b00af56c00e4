// src/config.rs

use crate::error::{Result, SteeringError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lane: LaneConfig,
    pub classifier: ClassifierConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

/// Horizontal extent used for the right-hand ROI vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiExtent {
    /// `height - margin`, which assumes a roughly square frame
    Height,
    /// `width - margin`
    Width,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub roi_extent: RoiExtent,
    pub canny_low: f64,
    pub canny_high: f64,
    pub hough_rho: f64,
    pub hough_theta_deg: f64,
    pub hough_threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
    pub line_thickness: i32,
    /// BGR
    pub line_color: [f64; 3],
    pub frame_weight: f64,
    pub overlay_weight: f64,
    pub gamma: f64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            roi_extent: RoiExtent::Height,
            canny_low: 100.0,
            canny_high: 120.0,
            hough_rho: 2.0,
            hough_theta_deg: 1.0,
            hough_threshold: 70,
            min_line_length: 30.0,
            max_line_gap: 100.0,
            line_thickness: 10,
            line_color: [0.0, 255.0, 0.0],
            frame_weight: 0.8,
            overlay_weight: 1.0,
            gamma: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum softmax peak for a class label to be reported
    pub confidence_threshold: f32,
    pub input_width: usize,
    pub input_height: usize,
    /// ONNX models; the classifiers run only when all three are set
    pub hazard_model: Option<String>,
    pub signal_model: Option<String>,
    pub crosswalk_model: Option<String>,
    pub num_threads: usize,
}

impl ClassifierConfig {
    /// Model paths in hazard / signal / crosswalk order, if all are configured.
    pub fn model_paths(&self) -> Option<[&str; 3]> {
        match (&self.hazard_model, &self.signal_model, &self.crosswalk_model) {
            (Some(h), Some(s), Some(c)) => Some([h.as_str(), s.as_str(), c.as_str()]),
            _ => None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            input_width: 224,
            input_height: 224,
            hazard_model: None,
            signal_model: None,
            crosswalk_model: None,
            num_threads: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub camera_index: i32,
    pub save_annotated: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: "videos".to_string(),
            output_dir: "output".to_string(),
            camera_index: 0,
            save_annotated: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "jetbot_steering=info".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| SteeringError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(contents).map_err(|e| SteeringError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let lane = &self.lane;
        if lane.hough_rho <= 0.0 || lane.hough_theta_deg <= 0.0 {
            return Err(SteeringError::Config(
                "hough resolution must be positive".to_string(),
            ));
        }
        if lane.line_thickness <= 0 {
            return Err(SteeringError::Config(
                "line_thickness must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.confidence_threshold) {
            return Err(SteeringError::Config(
                "confidence_threshold must be within [0, 1]".to_string(),
            ));
        }
        let classifier = &self.classifier;
        let configured = [
            &classifier.hazard_model,
            &classifier.signal_model,
            &classifier.crosswalk_model,
        ]
        .iter()
        .filter(|m| m.is_some())
        .count();
        if configured != 0 && configured != 3 {
            return Err(SteeringError::Config(
                "hazard_model, signal_model and crosswalk_model must be set together".to_string(),
            ));
        }
        if classifier.input_width == 0 || classifier.input_height == 0 || classifier.num_threads == 0 {
            return Err(SteeringError::Config(
                "classifier input size and num_threads must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
