pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;

pub use crate::config::AppConfig;
pub use error::{PipelineError, Result};
pub use models::image_types::ImageBytes;
pub use models::prediction_types::{BreedSummary, ClassificationResult};
pub use pipeline::{PipelinePhase, PredictionPipeline, ViewState};
pub use services::classifier_client::{BreedClassifier, HttpClassifier};
pub use services::description_client::{BreedDescriber, GenerativeDescriber};

use std::path::Path;

/// Loads configuration and builds a pipeline backed by the real services.
pub fn bootstrap(config_path: Option<&Path>) -> Result<PredictionPipeline> {
    let config = AppConfig::load(config_path)?;
    tracing::info!(
        classifier = %config.classifier.base_url,
        model = %config.describer.model,
        "Starting breed-lens pipeline"
    );
    PredictionPipeline::from_config(&config)
}
