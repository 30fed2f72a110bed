// Test outcome structures

use crate::state::TestStatus;
use serde::Serialize;

/// Terminal result of one executed test case
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub title: String,
    status: TestStatus,
    #[serde(rename = "durationMillis")]
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
}

impl TestOutcome {
    /// Create an outcome with the given status and no error details
    pub fn new(title: impl Into<String>, status: TestStatus, duration_ms: u64) -> Self {
        Self {
            title: title.into(),
            status,
            duration_ms,
            error_message: None,
            group_label: None,
            attachment_ref: None,
        }
    }

    /// Create a pass outcome
    pub fn passed(title: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(title, TestStatus::Passed, duration_ms)
    }

    /// Create a fail outcome
    pub fn failed(title: impl Into<String>, error_message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(title, TestStatus::Failed, duration_ms).with_error(error_message)
    }

    /// Create a skip outcome
    pub fn skipped(title: impl Into<String>) -> Self {
        Self::new(title, TestStatus::Skipped, 0)
    }

    pub fn with_error(mut self, error_message: impl Into<String>) -> Self {
        self.error_message = Some(error_message.into());
        self
    }

    pub fn with_group(mut self, group_label: impl Into<String>) -> Self {
        self.group_label = Some(group_label.into());
        self
    }

    pub fn with_attachment(mut self, attachment_ref: impl Into<String>) -> Self {
        self.attachment_ref = Some(attachment_ref.into());
        self
    }

    /// Status is fixed at construction; there is no setter.
    pub fn status(&self) -> &TestStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_passed() {
        let outcome = TestOutcome::passed("signup works", 1200);
        assert_eq!(outcome.title, "signup works");
        assert_eq!(outcome.status(), &TestStatus::Passed);
        assert_eq!(outcome.duration_ms, 1200);
        assert!(outcome.error_message.is_none());
    }

    #[test]
    fn test_outcome_failed_with_details() {
        let outcome = TestOutcome::failed("donate 5 USD", "timeout waiting for button", 4000)
            .with_group("Mobile")
            .with_attachment("test-results/donate/video.webm");
        assert_eq!(outcome.status(), &TestStatus::Failed);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("timeout waiting for button")
        );
        assert_eq!(outcome.group_label.as_deref(), Some("Mobile"));
        assert_eq!(
            outcome.attachment_ref.as_deref(),
            Some("test-results/donate/video.webm")
        );
    }

    #[test]
    fn test_outcome_skipped() {
        let outcome = TestOutcome::skipped("rewards tab");
        assert_eq!(outcome.status(), &TestStatus::Skipped);
        assert_eq!(outcome.duration_ms, 0);
    }

    #[test]
    fn test_outcome_serializes_wire_names() {
        let outcome = TestOutcome::passed("a", 5).with_group("Desktop");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "passed");
        assert_eq!(json["durationMillis"], 5);
        assert_eq!(json["groupLabel"], "Desktop");
        assert!(json.get("errorMessage").is_none());
    }
}
