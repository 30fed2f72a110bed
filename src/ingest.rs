// Runner event stream - newline-delimited JSON emitted by the E2E runner
//
// {"event":"test_end","title":"...","status":"passed","durationMillis":1000}
// {"event":"run_end","totalDurationMillis":5000}

use std::io::BufRead;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::report::Reporter;
use crate::state::{ResultAccumulator, TestOutcome, TestStatus};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    TestEnd(TestEndEvent),
    RunEnd {
        #[serde(
            rename = "totalDurationMillis",
            default,
            deserialize_with = "lenient_millis"
        )]
        total_duration_millis: f64,
    },
    #[serde(other)]
    Unknown,
}

/// Per-test completion payload. Every field is optional on the wire, and a
/// null or mistyped field falls back to its default instead of failing the
/// whole event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestEndEvent {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_millis")]
    pub duration_millis: f64,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub error: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub group_label: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub attachment_ref: Option<String>,
}

// Strings pass through, numbers and booleans are rendered, anything else is absent
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

// Numbers or numeric strings ("4000"); anything else is 0
fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let millis = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(millis.unwrap_or(0.0))
}

impl From<TestEndEvent> for TestOutcome {
    fn from(event: TestEndEvent) -> Self {
        let mut outcome = TestOutcome::new(
            event.title,
            TestStatus::from(event.status),
            to_millis(event.duration_millis),
        );
        outcome.error_message = event.error;
        outcome.group_label = event.group_label;
        outcome.attachment_ref = event.attachment_ref;
        outcome
    }
}

// Negative or NaN durations clamp to zero
fn to_millis(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// What the stream told us about the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub recorded: usize,
    pub malformed: usize,
    /// Wall-clock duration from `run_end`, if the stream reached it
    pub total_duration_ms: Option<u64>,
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_event(line: &str) -> Result<Option<RunEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Feed every `test_end` into the reporters and the accumulator until
/// `run_end` or end of input. Invalid UTF-8 is replaced, not rejected. Only
/// I/O errors are fatal; everything recorded before one stays recorded.
pub fn ingest<R: BufRead>(
    mut reader: R,
    accumulator: &ResultAccumulator,
    reporters: &[Box<dyn Reporter>],
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let mut buf = Vec::new();

    for index in 0usize.. {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read event line {}", index + 1))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);

        match parse_event(&line) {
            Ok(None) => {}
            Ok(Some(RunEvent::TestEnd(event))) => {
                let outcome = TestOutcome::from(event);
                for reporter in reporters {
                    reporter.on_test_end(&outcome);
                }
                accumulator.record_outcome(outcome);
                stats.recorded += 1;
            }
            Ok(Some(RunEvent::RunEnd {
                total_duration_millis,
            })) => {
                stats.total_duration_ms = Some(to_millis(total_duration_millis));
                debug!("run_end reached at line {}", index + 1);
                break;
            }
            Ok(Some(RunEvent::Unknown)) => {
                debug!("Ignoring unknown event at line {}", index + 1);
            }
            Err(e) => {
                warn!("Skipping malformed event at line {}: {}", index + 1, e);
                stats.malformed += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_test_end() {
        let event = parse_event(
            r#"{"event":"test_end","title":"A","status":"failed","durationMillis":12.6,"error":"boom","groupLabel":"Mobile","attachmentRef":"v.webm"}"#,
        )
        .unwrap()
        .unwrap();
        let RunEvent::TestEnd(event) = event else {
            panic!("expected test_end");
        };
        let outcome = TestOutcome::from(event);
        assert_eq!(outcome.title, "A");
        assert_eq!(outcome.status(), &TestStatus::Failed);
        assert_eq!(outcome.duration_ms, 13);
        assert_eq!(outcome.error_message.as_deref(), Some("boom"));
        assert_eq!(outcome.group_label.as_deref(), Some("Mobile"));
        assert_eq!(outcome.attachment_ref.as_deref(), Some("v.webm"));
    }

    #[test]
    fn test_parse_sparse_test_end_uses_defaults() {
        let event = parse_event(r#"{"event":"test_end"}"#).unwrap().unwrap();
        let RunEvent::TestEnd(event) = event else {
            panic!("expected test_end");
        };
        let outcome = TestOutcome::from(event);
        assert_eq!(outcome.title, "");
        assert_eq!(outcome.status(), &TestStatus::Other(String::new()));
        assert_eq!(outcome.duration_ms, 0);
    }

    #[test]
    fn test_parse_unknown_and_blank() {
        assert_eq!(parse_event("   ").unwrap(), None);
        assert_eq!(
            parse_event(r#"{"event":"test_begin","title":"x"}"#).unwrap(),
            Some(RunEvent::Unknown)
        );
        assert!(parse_event("not json").is_err());
    }

    #[test]
    fn test_parse_null_and_mistyped_fields() {
        let event = parse_event(
            r#"{"event":"test_end","title":null,"status":"failed","durationMillis":"4000","error":{"msg":"x"},"groupLabel":7}"#,
        )
        .unwrap()
        .unwrap();
        let RunEvent::TestEnd(event) = event else {
            panic!("expected test_end");
        };
        let outcome = TestOutcome::from(event);
        assert_eq!(outcome.title, "");
        assert_eq!(outcome.status(), &TestStatus::Failed);
        assert_eq!(outcome.duration_ms, 4000);
        assert_eq!(outcome.error_message, None);
        assert_eq!(outcome.group_label.as_deref(), Some("7"));
    }

    #[test]
    fn test_parse_run_end_mistyped_duration() {
        assert_eq!(
            parse_event(r#"{"event":"run_end","totalDurationMillis":null}"#).unwrap(),
            Some(RunEvent::RunEnd {
                total_duration_millis: 0.0
            })
        );
        assert_eq!(
            parse_event(r#"{"event":"run_end","totalDurationMillis":"1500.5"}"#).unwrap(),
            Some(RunEvent::RunEnd {
                total_duration_millis: 1500.5
            })
        );
    }

    #[test]
    fn test_negative_duration_clamps() {
        assert_eq!(to_millis(-5.0), 0);
        assert_eq!(to_millis(f64::NAN), 0);
        assert_eq!(to_millis(1000.4), 1000);
    }
}
