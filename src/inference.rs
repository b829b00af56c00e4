// src/inference.rs

use crate::classification::{Classifier, ClassifierSet};
use crate::config::ClassifierConfig;
use crate::preprocessing::ClassifierInput;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{debug, info};

/// ONNX Runtime session scoring one classifier model.
pub struct OnnxClassifier {
    session: Session,
    name: String,
}

impl OnnxClassifier {
    pub fn load(path: &Path, num_threads: usize) -> Result<Self> {
        info!("Loading classifier model: {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(num_threads)?
            .with_inter_threads(1)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!("✓ Classifier {} ready", name);
        Ok(Self { session, name })
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&mut self, input: &ClassifierInput) -> Result<Vec<f32>> {
        let shape = [1, 3, input.height, input.width];
        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.data.clone().into_boxed_slice()))?;

        let input_name = self
            .session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .context("model declares no inputs")?;

        let outputs = self.session.run(ort::inputs![input_name => input_value])?;
        let (output_shape, data) = outputs[0].try_extract_tensor::<f32>()?;

        debug!("{} output shape: {:?}", self.name, output_shape);
        Ok(data.to_vec())
    }
}

/// Load the hazard, signal and crosswalk models named in `config`.
/// Returns `None` when no models are configured.
pub fn load_classifiers(config: &ClassifierConfig) -> Result<Option<ClassifierSet>> {
    let Some([hazard, signal, crosswalk]) = config.model_paths() else {
        info!("No classifier models configured; frame classification disabled");
        return Ok(None);
    };

    Ok(Some(ClassifierSet {
        hazard: Box::new(OnnxClassifier::load(Path::new(hazard), config.num_threads)?),
        signal: Box::new(OnnxClassifier::load(Path::new(signal), config.num_threads)?),
        crosswalk: Box::new(OnnxClassifier::load(Path::new(crosswalk), config.num_threads)?),
        threshold: config.confidence_threshold,
        input_width: config.input_width,
        input_height: config.input_height,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_models_disables_classification() {
        let set = load_classifiers(&ClassifierConfig::default()).unwrap();
        assert!(set.is_none());
    }

    #[test]
    fn test_missing_model_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("hazard.onnx");
        assert!(OnnxClassifier::load(&missing, 1).is_err());
    }
}
