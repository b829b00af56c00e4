// src/classification.rs
//
// Decoding of the three frame classifiers' raw outputs.
// The models themselves live behind the `Classifier` trait.

use crate::error::{Result, SteeringError};
use crate::preprocessing::{frame_to_input, ClassifierInput};
use opencv::core::Mat;
use serde::Serialize;
use std::fmt;

const NOTHING: &str = "Nothing";

/// Opaque scoring model: returns one raw logit per class.
pub trait Classifier: Send {
    fn scores(&mut self, input: &ClassifierInput) -> anyhow::Result<Vec<f32>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hazard {
    Person,
    Animal,
    RoadCones,
}

impl Hazard {
    fn from_index(idx: usize) -> Self {
        match idx {
            0 => Hazard::Person,
            1 => Hazard::Animal,
            _ => Hazard::RoadCones,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hazard::Person => "person",
            Hazard::Animal => "animal",
            Hazard::RoadCones => "roadCones",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Stop,
    TrafficLightBlue,
    TrafficLightRed,
    TrafficLightGreen,
}

impl Signal {
    fn from_index(idx: usize) -> Self {
        match idx {
            0 => Signal::Stop,
            1 => Signal::TrafficLightBlue,
            2 => Signal::TrafficLightRed,
            _ => Signal::TrafficLightGreen,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Stop => "Stop",
            Signal::TrafficLightBlue => "Trafic Light - Blue",
            Signal::TrafficLightRed => "Trafic Light - Red",
            Signal::TrafficLightGreen => "Trafic Light - Green",
        }
    }
}

/// Combined classifier verdict for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameAssessment {
    pub hazard: Option<Hazard>,
    pub signal: Option<Signal>,
    pub crosswalk_probability: f32,
}

impl FrameAssessment {
    pub fn hazard_label(&self) -> &'static str {
        self.hazard.map_or(NOTHING, |h| h.as_str())
    }

    pub fn signal_label(&self) -> &'static str {
        self.signal.map_or(NOTHING, |s| s.as_str())
    }
}

impl fmt::Display for FrameAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hazard={} signal={} crosswalk={:.3}",
            self.hazard_label(),
            self.signal_label(),
            self.crosswalk_probability
        )
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

/// Index and probability of the most likely class, if it clears `threshold`.
fn confident_class(logits: &[f32], threshold: f32) -> Result<Option<usize>> {
    if logits.is_empty() {
        return Err(SteeringError::InvalidInput(
            "classifier returned no scores".to_string(),
        ));
    }

    let probs = softmax(logits);
    let (idx, peak) = probs
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });

    Ok((peak > threshold).then_some(idx))
}

pub fn decode_hazard(logits: &[f32], threshold: f32) -> Result<Option<Hazard>> {
    Ok(confident_class(logits, threshold)?.map(Hazard::from_index))
}

pub fn decode_signal(logits: &[f32], threshold: f32) -> Result<Option<Signal>> {
    Ok(confident_class(logits, threshold)?.map(Signal::from_index))
}

/// Probability of the first (crosswalk) class.
pub fn decode_crosswalk(logits: &[f32]) -> Result<f32> {
    softmax(logits)
        .first()
        .copied()
        .ok_or_else(|| SteeringError::InvalidInput("classifier returned no scores".to_string()))
}

/// The three frame classifiers, in hazard / signal / crosswalk order.
pub struct ClassifierSet {
    pub hazard: Box<dyn Classifier>,
    pub signal: Box<dyn Classifier>,
    pub crosswalk: Box<dyn Classifier>,
    pub threshold: f32,
    pub input_width: usize,
    pub input_height: usize,
}

impl ClassifierSet {
    /// Resize `frame` to the model input size and score it.
    pub fn assess_frame(&mut self, frame: &Mat) -> anyhow::Result<FrameAssessment> {
        let input = frame_to_input(frame, self.input_width, self.input_height)?;
        self.assess(&input)
    }

    pub fn assess(&mut self, input: &ClassifierInput) -> anyhow::Result<FrameAssessment> {
        let hazard = decode_hazard(&self.hazard.scores(input)?, self.threshold)?;
        let signal = decode_signal(&self.signal.scores(input)?, self.threshold)?;
        let crosswalk_probability = decode_crosswalk(&self.crosswalk.scores(input)?)?;

        Ok(FrameAssessment {
            hazard,
            signal,
            crosswalk_probability,
        })
    }
}
