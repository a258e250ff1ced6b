//! Transcript result document written by the batch job service.
//!
//! Only the parts this proxy reads are modelled:
//!
//! ```json
//! {
//!   "jobName": "opic-abc-1a2b3c4d",
//!   "results": {
//!     "transcripts": [{ "transcript": "hello world." }],
//!     "items": [
//!       { "type": "pronunciation", "alternatives": [{ "confidence": "0.92", "content": "hello" }] },
//!       { "type": "punctuation",   "alternatives": [{ "confidence": "0.0",  "content": "." }] }
//!     ]
//!   }
//! }
//! ```
//!
//! The transcript text is mandatory. The item list is kept as raw JSON and only
//! interpreted by [`TranscriptDocument::average_confidence`], so a malformed
//! item list never prevents the transcript from being returned.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::errors::{ProxyError, ProxyResult};

/// Item type carrying a scored spoken word.
pub const PRONUNCIATION_ITEM: &str = "pronunciation";

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptDocument {
    pub results: TranscriptResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptResults {
    pub transcripts: Vec<TranscriptText>,
    #[serde(default)]
    pub items: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptText {
    pub transcript: String,
}

/// A word or punctuation token in the result item list.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultItem {
    #[serde(rename = "type")]
    pub item_type: String,
    /// Only read for pronunciation items.
    #[serde(default)]
    pub alternatives: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemAlternative {
    #[serde(deserialize_with = "deserialize_score")]
    pub confidence: f64,
}

/// Scores are written as strings (`"0.92"`) but plain numbers are accepted too.
fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }

    match Score::deserialize(deserializer)? {
        Score::Number(value) => Ok(value),
        Score::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl TranscriptDocument {
    /// Parse a raw result body.
    pub fn parse(body: &str) -> ProxyResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| ProxyError::ResultParse(format!("malformed transcript document: {e}")))
    }

    /// First transcript string of the document.
    pub fn transcript(&self) -> ProxyResult<&str> {
        self.results
            .transcripts
            .first()
            .map(|t| t.transcript.as_str())
            .ok_or_else(|| ProxyError::ResultParse("transcript list is empty".to_string()))
    }

    /// Mean first-alternative confidence over pronunciation items.
    ///
    /// Returns 0.0 when there is nothing to score or when the item list
    /// cannot be walked; confidence is secondary and never fails a request.
    pub fn average_confidence(&self) -> f64 {
        let Some(items) = &self.results.items else {
            return 0.0;
        };

        match Self::try_average_confidence(items) {
            Ok(confidence) => confidence,
            Err(e) => {
                warn!("Failed to calculate confidence: {}", e);
                0.0
            }
        }
    }

    fn try_average_confidence(items: &Value) -> Result<f64, serde_json::Error> {
        if items.is_null() {
            return Ok(0.0);
        }

        let items: Vec<ResultItem> = serde_json::from_value(items.clone())?;

        let mut sum = 0.0_f64;
        let mut count = 0usize;
        for item in items.iter().filter(|item| item.item_type == PRONUNCIATION_ITEM) {
            if let Some(first) = item.alternatives.first() {
                let alternative = ItemAlternative::deserialize(first)?;
                sum += alternative.confidence;
                count += 1;
            }
        }

        if count == 0 {
            return Ok(0.0);
        }

        let average = sum / count as f64;
        Ok(if average.is_finite() { average } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> TranscriptDocument {
        TranscriptDocument::parse(body).unwrap()
    }

    #[test]
    fn test_single_pronunciation_item() {
        let doc = parse(
            r#"{"results": {
                "transcripts": [{"transcript": "hello"}],
                "items": [{"type": "pronunciation", "alternatives": [{"confidence": "0.92", "content": "hello"}]}]
            }}"#,
        );

        assert_eq!(doc.transcript().unwrap(), "hello");
        assert!((doc.average_confidence() - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_averages_first_alternative_and_skips_punctuation() {
        let doc = parse(
            r#"{"results": {
                "transcripts": [{"transcript": "hello world."}, {"transcript": "ignored"}],
                "items": [
                    {"type": "pronunciation", "alternatives": [{"confidence": 0.95}, {"confidence": 0.10}]},
                    {"type": "pronunciation", "alternatives": [{"confidence": "0.85"}]},
                    {"type": "punctuation", "alternatives": [{"confidence": "0.0"}]}
                ]
            }}"#,
        );

        assert_eq!(doc.transcript().unwrap(), "hello world.");
        assert!((doc.average_confidence() - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_only_punctuation_gives_zero() {
        let doc = parse(
            r#"{"results": {
                "transcripts": [{"transcript": "..."}],
                "items": [{"type": "punctuation", "alternatives": [{"confidence": "0.0", "content": "."}]}]
            }}"#,
        );

        assert_eq!(doc.average_confidence(), 0.0);
    }

    #[test]
    fn test_missing_or_empty_items_give_zero() {
        let doc = parse(r#"{"results": {"transcripts": [{"transcript": "hi"}]}}"#);
        assert_eq!(doc.average_confidence(), 0.0);

        let doc = parse(r#"{"results": {"transcripts": [{"transcript": "hi"}], "items": []}}"#);
        assert_eq!(doc.average_confidence(), 0.0);

        let doc = parse(r#"{"results": {"transcripts": [{"transcript": "hi"}], "items": null}}"#);
        assert_eq!(doc.average_confidence(), 0.0);
    }

    #[test]
    fn test_pronunciation_without_alternatives_is_skipped() {
        let doc = parse(
            r#"{"results": {
                "transcripts": [{"transcript": "a b"}],
                "items": [
                    {"type": "pronunciation", "alternatives": []},
                    {"type": "pronunciation"},
                    {"type": "pronunciation", "alternatives": [{"confidence": "0.5"}]}
                ]
            }}"#,
        );

        assert!((doc.average_confidence() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_items_degrade_to_zero() {
        let doc = parse(
            r#"{"results": {
                "transcripts": [{"transcript": "still here"}],
                "items": [{"alternatives": [{"confidence": "0.9"}]}]
            }}"#,
        );
        assert_eq!(doc.transcript().unwrap(), "still here");
        assert_eq!(doc.average_confidence(), 0.0);

        let doc = parse(
            r#"{"results": {
                "transcripts": [{"transcript": "x"}],
                "items": [{"type": "pronunciation", "alternatives": [{"confidence": "high"}]}]
            }}"#,
        );
        assert_eq!(doc.average_confidence(), 0.0);

        let doc = parse(r#"{"results": {"transcripts": [{"transcript": "x"}], "items": "nope"}}"#);
        assert_eq!(doc.average_confidence(), 0.0);
    }

    #[test]
    fn test_missing_transcripts_is_parse_error() {
        let result = TranscriptDocument::parse(r#"{"results": {"items": []}}"#);
        assert!(matches!(result, Err(ProxyError::ResultParse(_))));

        let result = TranscriptDocument::parse("<html>oops</html>");
        assert!(matches!(result, Err(ProxyError::ResultParse(_))));

        let doc = parse(r#"{"results": {"transcripts": []}}"#);
        assert!(matches!(doc.transcript(), Err(ProxyError::ResultParse(_))));
    }
}
