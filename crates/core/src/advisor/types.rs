//! Advisor data types, both the structured outputs and the Gemini envelope

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Coach's review of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnalysis {
    pub strengths: String,
    pub weaknesses: String,
    pub key_moments: String,
    pub overall_assessment: String,
}

impl GameAnalysis {
    pub fn validate(self) -> Result<Self, AdvisorError> {
        require("strengths", &self.strengths)?;
        require("weaknesses", &self.weaknesses)?;
        require("keyMoments", &self.key_moments)?;
        require("overallAssessment", &self.overall_assessment)?;
        Ok(self)
    }
}

/// Raw move suggestion, not yet checked for legality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSuggestion {
    pub suggested_move: String,
    pub explanation: String,
}

impl MoveSuggestion {
    pub fn validate(self) -> Result<Self, AdvisorError> {
        require("suggestedMove", &self.suggested_move)?;
        require("explanation", &self.explanation)?;
        Ok(self)
    }
}

fn require(name: &'static str, value: &str) -> Result<(), AdvisorError> {
    if value.trim().is_empty() {
        Err(AdvisorError::MissingField(name))
    } else {
        Ok(())
    }
}

// ============================================================================
// GEMINI WIRE FORMAT
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_from_camel_case() {
        let json = r#"{
            "strengths": "Quick development",
            "weaknesses": "Left the king in the centre",
            "keyMoments": "Move 12 dropped a pawn",
            "overallAssessment": "Solid opening, shaky middlegame"
        }"#;
        let analysis: GameAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.key_moments, "Move 12 dropped a pawn");
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn test_analysis_missing_field_rejected() {
        let json = r#"{"strengths": "a", "weaknesses": "b", "keyMoments": "c"}"#;
        assert!(serde_json::from_str::<GameAnalysis>(json).is_err());
    }

    #[test]
    fn test_blank_suggestion_rejected() {
        let suggestion = MoveSuggestion {
            suggested_move: "  ".to_string(),
            explanation: "Controls the centre".to_string(),
        };
        assert!(matches!(
            suggestion.validate(),
            Err(AdvisorError::MissingField("suggestedMove"))
        ));
    }

    #[test]
    fn test_envelope_first_text() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":1}"}]},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_text(), Some(r#"{"a":1}"#));
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_envelope_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.first_text(), None);
    }
}
