pub mod prediction;
pub mod view_state;

pub use prediction::PredictionPipeline;
pub use view_state::{PipelinePhase, ViewState};
