use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::models::image_types::ImageBytes;
use crate::models::prediction_types::BreedSummary;
use crate::pipeline::view_state::{PipelinePhase, ViewState};
use crate::services::classifier_client::{BreedClassifier, HttpClassifier};
use crate::services::description_client::{BreedDescriber, GenerativeDescriber};
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

struct Session {
    // Bumped by every run, selection and reset. A completion whose
    // generation no longer matches is dropped.
    generation: u64,
    image: Option<ImageBytes>,
    phase: PipelinePhase,
}

struct Inner {
    classifier: Arc<dyn BreedClassifier>,
    describer: Arc<dyn BreedDescriber>,
    session: Mutex<Session>,
    state_tx: watch::Sender<ViewState>,
}

/// Runs classification then description for the selected photo and owns the
/// resulting [`ViewState`].
///
/// All phase changes go through one mutex and are published to watchers
/// while it is held, so observers see transitions in order and never a
/// result from a superseded run.
#[derive(Clone)]
pub struct PredictionPipeline {
    inner: Arc<Inner>,
}

impl PredictionPipeline {
    pub fn new(classifier: Arc<dyn BreedClassifier>, describer: Arc<dyn BreedDescriber>) -> Self {
        let (state_tx, _) = watch::channel(ViewState::Idle);
        Self {
            inner: Arc::new(Inner {
                classifier,
                describer,
                session: Mutex::new(Session {
                    generation: 0,
                    image: None,
                    phase: PipelinePhase::Idle,
                }),
                state_tx,
            }),
        }
    }

    /// Wires the HTTP clients around one shared connection pool.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(client_build_error)?;

        let classifier = HttpClassifier::new(client.clone(), config.classifier.base_url.clone())
            .with_jpeg_quality(config.classifier.jpeg_quality);
        let describer = GenerativeDescriber::from_config(client, &config.describer)?;

        Ok(Self::new(Arc::new(classifier), Arc::new(describer)))
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.state_tx.subscribe()
    }

    pub fn view_state(&self) -> ViewState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn phase(&self) -> PipelinePhase {
        self.lock_session().phase.clone()
    }

    pub fn selected_image(&self) -> Option<ImageBytes> {
        self.lock_session().image.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lock_session().phase, PipelinePhase::Running)
    }

    /// Replaces the current photo and clears any previous result or error.
    /// A run still in flight is abandoned.
    pub fn select_image(&self, image: impl Into<ImageBytes>) {
        let image = image.into();
        let mut session = self.lock_session();
        session.generation += 1;
        tracing::info!(generation = session.generation, bytes = image.len(), "Image selected");
        session.image = Some(image);
        self.publish(&mut session, PipelinePhase::Idle);
    }

    /// Back to a blank slate, regardless of in-flight work.
    pub fn reset(&self) {
        let mut session = self.lock_session();
        session.generation += 1;
        session.image = None;
        tracing::info!(generation = session.generation, "Pipeline reset");
        self.publish(&mut session, PipelinePhase::Idle);
    }

    /// Starts a run for the selected image on the Tokio runtime.
    ///
    /// Returns `None` without starting anything when a run is already in
    /// progress, or when no image is selected (which shows an error instead).
    /// Outside a Tokio runtime nothing starts and the state is left as is.
    pub fn predict(&self) -> Option<JoinHandle<Result<BreedSummary>>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("predict called outside a Tokio runtime");
            return None;
        };

        let (generation, image) = {
            let mut session = self.lock_session();

            if matches!(session.phase, PipelinePhase::Running) {
                tracing::debug!(generation = session.generation, "Prediction already running");
                return None;
            }

            let Some(image) = session.image.clone() else {
                self.publish(
                    &mut session,
                    PipelinePhase::Failed(PipelineError::NoImageSelected.to_string()),
                );
                return None;
            };

            (self.begin(&mut session, image.clone()), image)
        };

        let pipeline = self.clone();
        Some(runtime.spawn(async move { pipeline.execute(generation, image).await }))
    }

    /// Classifies `image`, then fetches the description of the predicted
    /// breed. Any run still in flight is superseded.
    ///
    /// Returns [`PipelineError::Superseded`] if a newer run, selection or
    /// reset happened before this one finished; its outcome is then not
    /// applied to the view state.
    pub async fn run(&self, image: impl Into<ImageBytes>) -> Result<BreedSummary> {
        let image = image.into();
        let generation = {
            let mut session = self.lock_session();
            self.begin(&mut session, image.clone())
        };
        self.execute(generation, image).await
    }

    fn begin(&self, session: &mut Session, image: ImageBytes) -> u64 {
        session.generation += 1;
        session.image = Some(image);
        self.publish(session, PipelinePhase::Running);
        session.generation
    }

    async fn execute(&self, generation: u64, image: ImageBytes) -> Result<BreedSummary> {
        let span = tracing::info_span!("prediction", generation);
        async move {
            tracing::info!(bytes = image.len(), "Classifying image");
            let prediction = match self.inner.classifier.classify(&image).await {
                Ok(prediction) => prediction,
                Err(e) => return Err(self.fail(generation, e)),
            };
            tracing::info!(
                breed = %prediction.breed_label,
                confidence = prediction.confidence,
                "Classification finished"
            );

            // Don't spend a description call on a run nobody will see.
            if !self.is_current(generation) {
                tracing::debug!("Dropping superseded run after classification");
                return Err(PipelineError::Superseded);
            }

            let description = match self.inner.describer.describe(&prediction.breed_label).await {
                Ok(description) => description,
                Err(e) => return Err(self.fail(generation, e)),
            };

            let summary = BreedSummary::from_prediction(&prediction, description);
            if self.apply(generation, PipelinePhase::Succeeded(summary.clone())) {
                tracing::info!(breed = %summary.display_name, "Prediction finished");
                Ok(summary)
            } else {
                Err(PipelineError::Superseded)
            }
        }
        .instrument(span)
        .await
    }

    fn fail(&self, generation: u64, err: PipelineError) -> PipelineError {
        if self.apply(generation, PipelinePhase::Failed(err.to_string())) {
            tracing::warn!("Prediction failed: {}", err);
            err
        } else {
            tracing::debug!("Discarding error from superseded run: {}", err);
            PipelineError::Superseded
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_session().generation == generation
    }

    fn apply(&self, generation: u64, phase: PipelinePhase) -> bool {
        let mut session = self.lock_session();
        if session.generation != generation {
            tracing::debug!(
                stale = generation,
                current = session.generation,
                "Ignoring stale completion"
            );
            return false;
        }
        self.publish(&mut session, phase);
        true
    }

    fn publish(&self, session: &mut Session, phase: PipelinePhase) {
        let view = ViewState::project(&phase);
        session.phase = phase;
        self.inner.state_tx.send_replace(view);
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        // A panic while holding the lock cannot leave the session half
        // written: every field is assigned whole.
        self.inner
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn client_build_error(err: reqwest::Error) -> PipelineError {
    PipelineError::Config(format!("Failed to build HTTP client: {}", err))
}
