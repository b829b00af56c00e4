// src/preprocessing.rs

use crate::error::{Result, SteeringError};
use opencv::{
    core::{self, Mat, Size},
    imgproc,
    prelude::*,
};

/// Planar RGB tensor (CHW, raw 0..255 values) handed to the classifiers.
#[derive(Debug, Clone)]
pub struct ClassifierInput {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

/// Convert a BGR frame into a classifier input of `dst_width` x `dst_height`.
pub fn frame_to_input(frame: &Mat, dst_width: usize, dst_height: usize) -> Result<ClassifierInput> {
    if frame.empty() || frame.typ() != core::CV_8UC3 {
        return Err(SteeringError::InvalidFrame(
            "classifier input needs a non-empty 8-bit 3-channel frame".to_string(),
        ));
    }
    if dst_width == 0 || dst_height == 0 {
        return Err(SteeringError::InvalidInput(format!(
            "classifier input size must be non-zero, got {}x{}",
            dst_width, dst_height
        )));
    }

    let mut resized = Mat::default();
    imgproc::resize(
        frame,
        &mut resized,
        Size::new(dst_width as i32, dst_height as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut rgb = Mat::default();
    imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    let data = hwc_to_chw(rgb.data_bytes()?, dst_width, dst_height)?;

    Ok(ClassifierInput {
        data,
        width: dst_width,
        height: dst_height,
    })
}

/// Unpack interleaved 3-channel bytes into channel planes.
pub fn hwc_to_chw(src: &[u8], width: usize, height: usize) -> Result<Vec<f32>> {
    let plane = width * height;
    if src.len() != plane * 3 {
        return Err(SteeringError::InvalidInput(format!(
            "expected {} bytes for {}x{}x3, got {}",
            plane * 3,
            width,
            height,
            src.len()
        )));
    }

    let mut output = vec![0.0f32; 3 * plane];
    for (idx, px) in src.chunks_exact(3).enumerate() {
        for (c, &v) in px.iter().enumerate() {
            output[c * plane + idx] = v as f32;
        }
    }

    Ok(output)
}
