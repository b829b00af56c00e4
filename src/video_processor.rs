// src/video_processor.rs

use crate::config::VideoConfig;
use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst, VideoWriter},
};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

pub struct VideoProcessor {
    config: VideoConfig,
}

impl VideoProcessor {
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    pub fn find_video_files(&self) -> Result<Vec<PathBuf>> {
        let mut videos: Vec<PathBuf> = WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| is_video_file(p))
            .collect();
        videos.sort();

        info!("Found {} video files", videos.len());
        Ok(videos)
    }

    pub fn open_camera(&self, index: i32) -> Result<VideoReader> {
        info!("Opening camera {}", index);
        let cap = VideoCapture::new(index, videoio::CAP_ANY)?;
        VideoReader::from_capture(cap, &format!("camera {}", index))
    }

    pub fn open_video(&self, path: &Path) -> Result<VideoReader> {
        info!("Opening video: {}", path.display());
        let path_str = path
            .to_str()
            .with_context(|| format!("non UTF-8 path: {}", path.display()))?;
        let cap = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        VideoReader::from_capture(cap, path_str)
    }

    /// Writer for the annotated copy of `input_path`, if saving is enabled.
    pub fn create_writer(
        &self,
        input_path: &Path,
        width: i32,
        height: i32,
        fps: f64,
    ) -> Result<Option<VideoWriter>> {
        if !self.config.save_annotated {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.config.output_dir)?;

        let output_path = self.output_path(input_path);
        info!("Output video: {}", output_path.display());

        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = VideoWriter::new(
            output_path
                .to_str()
                .with_context(|| format!("non UTF-8 path: {}", output_path.display()))?,
            fourcc,
            fps,
            core::Size::new(width, height),
            true,
        )?;

        Ok(Some(writer))
    }

    pub fn output_path(&self, input_path: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "camera".to_string());
        PathBuf::from(&self.config.output_dir).join(format!("{}_lanes.mp4", stem))
    }
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub struct VideoReader {
    cap: VideoCapture,
    pub fps: f64,
    pub width: i32,
    pub height: i32,
    pub frames_read: u64,
}

impl VideoReader {
    fn from_capture(cap: VideoCapture, name: &str) -> Result<Self> {
        if !VideoCaptureTraitConst::is_opened(&cap)? {
            anyhow::bail!("Failed to open {}", name);
        }

        let fps = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FPS)?;
        let width = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_HEIGHT)? as i32;

        info!("Source properties: {}x{} @ {:.1} FPS", width, height, fps);

        Ok(Self {
            cap,
            // Cameras commonly report 0
            fps: if fps > 0.0 { fps } else { 30.0 },
            width,
            height,
            frames_read: 0,
        })
    }

    /// Next BGR frame, or `None` once the source is exhausted.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut mat = Mat::default();

        if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
            return Ok(None);
        }

        self.frames_read += 1;
        Ok(Some(mat))
    }
}
