// Chat payload - Slack Block Kit message built from a run summary

use super::{FormatLimits, RunContext, format_duration};
use crate::state::{RunSummary, TestOutcome, TestStatus};
use serde::Serialize;

/// Slack rejects section text longer than this (characters)
pub const SECTION_TEXT_LIMIT: usize = 3000;
/// Slack rejects header text longer than this (characters)
pub const HEADER_TEXT_LIMIT: usize = 150;

/// Webhook body: `text` is the fallback shown by clients that ignore blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: TextObject,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<TextObject>,
    },
    Divider,
    Actions {
        elements: Vec<ActionElement>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::PlainText { text, .. } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    Button { text: TextObject, url: String },
}

impl Block {
    fn markdown(text: impl Into<String>) -> Self {
        Self::Section {
            text: Some(TextObject::mrkdwn(text)),
            fields: Vec::new(),
        }
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with an ellipsis
pub fn truncate_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

// Slack mrkdwn control characters
fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn item_line(outcome: &TestOutcome) -> String {
    let mut line = format!("• *{}*", escape_mrkdwn(&outcome.title));
    match outcome.group_label.as_deref() {
        Some(group) if !group.is_empty() => line.push_str(&format!(
            " ({}, {})",
            escape_mrkdwn(group),
            format_duration(outcome.duration_ms)
        )),
        _ => line.push_str(&format!(" ({})", format_duration(outcome.duration_ms))),
    }
    line
}

// Pack lines into as few sections as fit under SECTION_TEXT_LIMIT each
fn sections(lines: Vec<String>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in lines {
        let line = truncate_error(&line, SECTION_TEXT_LIMIT - 1);
        let line_chars = line.chars().count();
        if current_chars > 0 && current_chars + 1 + line_chars > SECTION_TEXT_LIMIT {
            blocks.push(Block::markdown(std::mem::take(&mut current)));
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(&line);
        current_chars += line_chars;
    }
    if current_chars > 0 {
        blocks.push(Block::markdown(current));
    }
    blocks
}

fn itemized<'a>(
    heading: String,
    outcomes: impl Iterator<Item = &'a TestOutcome>,
    count: usize,
    cap: usize,
    render: impl Fn(&TestOutcome) -> String,
) -> Vec<Block> {
    let mut lines = vec![heading];
    lines.extend(outcomes.take(cap).map(render));
    if count > cap {
        lines.push(format!("_+{} more_", count - cap));
    }
    sections(lines)
}

/// Build the Slack message for the run. Pure and deterministic.
pub fn to_chat_blocks(summary: &RunSummary, context: &RunContext, limits: &FormatLimits) -> ChatMessage {
    let verdict = summary.verdict();
    let counts = &summary.counts;
    let total = summary.total();
    let duration = format_duration(summary.total_duration_ms);

    let text = format!(
        "{} {} {}: {} passed, {} failed, {} skipped ({} total) in {}",
        verdict.emoji(),
        context.title,
        verdict,
        counts.passed,
        counts.failed,
        counts.skipped,
        total,
        duration
    );

    let mut blocks = vec![
        Block::Header {
            text: TextObject::plain(format!(
                "{} {} {}",
                verdict.emoji(),
                truncate_error(&context.title, HEADER_TEXT_LIMIT - 16),
                verdict
            )),
        },
        Block::Section {
            text: None,
            fields: vec![
                TextObject::mrkdwn(format!(
                    "*Results:*\n✅ {} passed · ❌ {} failed · ⏭️ {} skipped",
                    counts.passed, counts.failed, counts.skipped
                )),
                TextObject::mrkdwn(format!("*Total:*\n{} tests", total)),
                TextObject::mrkdwn(format!(
                    "*Repository:*\n{}",
                    context.repository.as_deref().unwrap_or("-")
                )),
                TextObject::mrkdwn(format!("*Duration:*\n{}", duration)),
            ],
        },
    ];

    if counts.failed > 0 {
        blocks.push(Block::Divider);
        blocks.extend(itemized(
            format!("*❌ Failed Tests ({})*", counts.failed),
            summary.outcomes_with(&TestStatus::Failed),
            counts.failed,
            limits.failed_items,
            |outcome| {
                let mut line = item_line(outcome);
                if summary.is_slow(outcome, limits.slow_factor) {
                    line.push_str(" 🐢 slow");
                }
                if let Some(error) = outcome.error_message.as_deref() {
                    line.push_str(&format!(
                        "\n    > {}",
                        escape_mrkdwn(&truncate_error(error, limits.error_chars))
                            .replace('\n', " ")
                    ));
                }
                if outcome.attachment_ref.is_some() {
                    line.push_str("\n    🎥 video attached to the run artifacts");
                }
                line
            },
        ));
    }

    if counts.passed > 0 {
        blocks.push(Block::Divider);
        if counts.passed <= limits.passed_items {
            blocks.extend(itemized(
                format!("*✅ Passed Tests ({})*", counts.passed),
                summary.outcomes_with(&TestStatus::Passed),
                counts.passed,
                limits.passed_items,
                item_line,
            ));
        } else {
            blocks.push(Block::markdown(format!(
                "*✅ {} tests passed*",
                counts.passed
            )));
        }
    }

    if counts.skipped > 0 {
        blocks.push(Block::Divider);
        blocks.extend(itemized(
            format!("*⏭️ Skipped Tests ({})*", counts.skipped),
            summary.outcomes_with(&TestStatus::Skipped),
            counts.skipped,
            limits.skipped_items,
            item_line,
        ));
    }

    let others: Vec<_> = summary.other_outcomes().collect();
    if !others.is_empty() {
        blocks.push(Block::Divider);
        blocks.extend(itemized(
            format!("*⚠️ Other Outcomes ({})*", others.len()),
            others.iter().copied(),
            others.len(),
            limits.skipped_items,
            |outcome| format!("{} `{}`", item_line(outcome), outcome.status()),
        ));
    }

    if let Some(url) = context.run_url.as_deref() {
        blocks.push(Block::Actions {
            elements: vec![ActionElement::Button {
                text: TextObject::plain("View run"),
                url: url.to_string(),
            }],
        });
    }

    ChatMessage { text, blocks }
}
