//! Recognition response body.

use serde::{Deserialize, Serialize};

/// Flat JSON object returned by the short-audio recognition endpoint.
///
/// ```
/// use speech_recognizer::speech::RecognitionResult;
///
/// let json = r#"{"RecognitionStatus":"Success","DisplayText":"こんにちは。","Offset":300000,"Duration":9600000}"#;
/// let result: RecognitionResult = serde_json::from_str(json).unwrap();
/// assert!(result.is_success());
/// assert_eq!(result.display_text, "こんにちは。");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecognitionResult {
    /// `Success`, `NoMatch`, `InitialSilenceTimeout`, …
    pub recognition_status: String,
    /// Missing unless recognition succeeded.
    #[serde(default)]
    pub display_text: String,
    /// Start of the recognized speech, in 100 ns ticks.
    #[serde(default)]
    pub offset: i64,
    /// Length of the recognized speech, in 100 ns ticks.
    #[serde(default)]
    pub duration: i64,
}

impl RecognitionResult {
    pub fn is_success(&self) -> bool {
        self.recognition_status == "Success"
    }
}
