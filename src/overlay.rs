// src/overlay.rs

use crate::classification::FrameAssessment;
use crate::error::Result;
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc,
};

const TEXT_COLOR: Scalar = Scalar::new(25.0, 25.0, 25.0, 0.0);

fn put_line(frame: &mut Mat, text: &str, origin: Point) -> Result<()> {
    imgproc::put_text(
        frame,
        text,
        origin,
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        TEXT_COLOR,
        2,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}

/// Write the classifier verdicts in the top-left corner of `frame`.
pub fn annotate(frame: &mut Mat, assessment: &FrameAssessment) -> Result<()> {
    put_line(frame, &format!("D: {}", assessment.hazard_label()), Point::new(20, 20))?;
    put_line(frame, &format!("D: {}", assessment.signal_label()), Point::new(20, 60))?;
    put_line(
        frame,
        &format!("D: {:.3}", assessment.crosswalk_probability),
        Point::new(20, 110),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::{core, prelude::*};

    fn white_frame() -> Mat {
        Mat::new_rows_cols_with_default(240, 320, core::CV_8UC3, Scalar::all(255.0)).unwrap()
    }

    fn dark_pixels(frame: &Mat, rows: std::ops::Range<i32>) -> usize {
        let mut count = 0;
        for r in rows {
            for c in 0..frame.cols() {
                if frame.at_2d::<core::Vec3b>(r, c).unwrap()[0] < 128 {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_annotate_draws_text_rows() {
        let mut frame = white_frame();
        let assessment = FrameAssessment {
            hazard: None,
            signal: None,
            crosswalk_probability: 0.5,
        };
        annotate(&mut frame, &assessment).unwrap();

        assert!(dark_pixels(&frame, 0..25) > 0);
        assert!(dark_pixels(&frame, 40..65) > 0);
        assert!(dark_pixels(&frame, 90..115) > 0);
        assert_eq!(dark_pixels(&frame, 200..240), 0);
        assert_eq!(frame.rows(), 240);
    }
}
