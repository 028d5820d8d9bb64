use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A history row as sent by the server, before display normalization.
///
/// Missing and `null` fields decode to the same defaults so one sparse row
/// cannot fail the whole list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryRecord {
    /// Server-issued identifier; usually a string, occasionally numeric.
    pub id: Value,
    #[serde(default = "unknown_candidate", deserialize_with = "name_or_unknown")]
    pub candidate_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "score_or_zero")]
    pub score: i64,
}

fn unknown_candidate() -> String {
    "Unknown".to_string()
}

fn name_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_candidate))
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts integral and fractional scores; fractions are rounded.
fn score_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(|score| score.round() as i64)
        .unwrap_or(0))
}

impl HistoryRecord {
    /// The identifier as a trimmed string.
    pub fn id_string(&self) -> String {
        match &self.id {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string().trim().to_string(),
        }
    }
}

/// A past analysis, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub candidate_name: String,
    /// Display-formatted date.
    pub date: String,
    pub score: i64,
}

impl HistoryEntry {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }
}

/// Coarse bucket used to colour scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn of(score: i64) -> Self {
        if score < 50 {
            Self::Low
        } else if score < 75 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_missing_fields() {
        let record: HistoryRecord = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(record.candidate_name, "Unknown");
        assert_eq!(record.score, 0);
        assert!(record.date.is_empty());
    }

    #[test]
    fn test_record_list_tolerates_null_fields() {
        let records: Vec<HistoryRecord> = serde_json::from_str(
            r#"[
                {"id": "a1", "candidate_name": "Ada", "date": "2025-03-01", "score": 72},
                {"id": "b2", "candidate_name": null, "date": null, "score": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].candidate_name, "Ada");
        assert_eq!(records[1].candidate_name, "Unknown");
        assert!(records[1].date.is_empty());
        assert_eq!(records[1].score, 0);
    }

    #[test]
    fn test_record_rounds_fractional_score() {
        let record: HistoryRecord =
            serde_json::from_str(r#"{"id": "c3", "score": 71.6}"#).unwrap();
        assert_eq!(record.score, 72);
    }

    #[test]
    fn test_id_string_trims_and_stringifies() {
        let record: HistoryRecord =
            serde_json::from_str(r#"{"id": "  65f0c2 \n", "candidate_name": "A"}"#).unwrap();
        assert_eq!(record.id_string(), "65f0c2");

        let numeric: HistoryRecord = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(numeric.id_string(), "42");
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::of(49), ScoreBand::Low);
        assert_eq!(ScoreBand::of(50), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(74), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(75), ScoreBand::High);
    }
}
