use crate::models::prediction_types::BreedSummary;
use serde::Serialize;

/// Internal progress of the pipeline. Only the pipeline writes it.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelinePhase {
    Idle,
    Running,
    Succeeded(BreedSummary),
    Failed(String),
}

/// What a presentation layer renders. Derived from [`PipelinePhase`] and
/// nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum ViewState {
    Idle,
    Loading,
    Loaded(BreedSummary),
    Failed(String),
}

impl ViewState {
    pub fn project(phase: &PipelinePhase) -> Self {
        match phase {
            PipelinePhase::Idle => ViewState::Idle,
            PipelinePhase::Running => ViewState::Loading,
            PipelinePhase::Succeeded(summary) => ViewState::Loaded(summary.clone()),
            PipelinePhase::Failed(message) => ViewState::Failed(message.clone()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// The summary to show; the empty sentinel when there is none.
    pub fn summary(&self) -> BreedSummary {
        match self {
            ViewState::Loaded(summary) => summary.clone(),
            _ => BreedSummary::empty(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl From<&PipelinePhase> for ViewState {
    fn from(phase: &PipelinePhase) -> Self {
        ViewState::project(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> BreedSummary {
        BreedSummary {
            display_name: "Pug".to_string(),
            confidence: 0.7,
            description: "Small.".to_string(),
            is_pending: false,
        }
    }

    #[test]
    fn projects_every_phase() {
        assert_eq!(ViewState::project(&PipelinePhase::Idle), ViewState::Idle);
        assert_eq!(ViewState::project(&PipelinePhase::Running), ViewState::Loading);
        assert_eq!(
            ViewState::project(&PipelinePhase::Succeeded(summary())),
            ViewState::Loaded(summary())
        );
        assert_eq!(
            ViewState::project(&PipelinePhase::Failed("boom".to_string())),
            ViewState::Failed("boom".to_string())
        );
    }

    #[test]
    fn accessors_fall_back_to_empty() {
        assert_eq!(ViewState::Loading.summary(), BreedSummary::empty());
        assert!(ViewState::Loading.is_loading());
        assert_eq!(ViewState::Loaded(summary()).summary(), summary());
        assert_eq!(ViewState::Failed("x".to_string()).error_message(), Some("x"));
        assert_eq!(ViewState::Idle.error_message(), None);
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_value(ViewState::Failed("nope".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "failed", "data": "nope" }));
        let json = serde_json::to_value(ViewState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "idle" }));
    }
}
