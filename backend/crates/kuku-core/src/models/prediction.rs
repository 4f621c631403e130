use serde::{Deserialize, Serialize};

/// Result returned by the disease-prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(alias = "label")]
    pub prediction: String,
    pub confidence: f64,
    #[serde(default)]
    pub confidence_percentage: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub crop_type: Option<String>,
}

impl PredictionResult {
    /// Confidence formatted as a percentage, preferring the server's own
    /// rendering when present.
    pub fn confidence_display(&self) -> String {
        self.confidence_percentage
            .clone()
            .unwrap_or_else(|| format!("{:.1}%", self.confidence * 100.0))
    }

    pub fn is_healthy(&self) -> bool {
        self.prediction.to_lowercase().contains("healthy")
    }
}
