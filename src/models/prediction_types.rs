use serde::{Deserialize, Serialize};

/// Body returned by the classification service's `/predict` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: String,
    #[serde(rename = "predicted_breed")]
    pub breed_label: String,
    pub confidence: f64,
    pub message: String,
}

impl ClassificationResult {
    pub fn display_name(&self) -> String {
        display_name(&self.breed_label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedSummary {
    pub display_name: String,
    pub confidence: f64,
    pub description: String,
    pub is_pending: bool,
}

impl BreedSummary {
    /// "No result yet."
    pub fn empty() -> Self {
        Self {
            display_name: String::new(),
            confidence: 0.0,
            description: String::new(),
            is_pending: false,
        }
    }

    pub fn from_prediction(prediction: &ClassificationResult, description: String) -> Self {
        Self {
            display_name: prediction.display_name(),
            confidence: prediction.confidence,
            description,
            is_pending: false,
        }
    }
}

impl Default for BreedSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Turns a raw label such as `golden_retriever` into `Golden Retriever`.
///
/// Underscores become spaces and every whitespace-separated word is
/// capitalized with the rest of the word lowercased, so applying it to its
/// own output changes nothing.
pub fn display_name(breed_label: &str) -> String {
    let mut out = String::with_capacity(breed_label.len());
    let mut word_start = true;

    for c in breed_label.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_whitespace() {
            out.push(c);
            word_start = true;
        } else if word_start {
            // Some characters uppercase to several (`ß` -> `SS`); only the
            // first stays upper so a second pass finds nothing to change.
            let mut upper = c.to_uppercase();
            if let Some(first) = upper.next() {
                out.push(first);
            }
            for rest in upper {
                out.extend(rest.to_lowercase());
            }
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}
