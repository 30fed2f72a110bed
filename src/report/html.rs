// HTML reporter - self-contained report document for email bodies and CI artifacts

use super::{FormatLimits, Reporter, RunContext, format_duration};
use crate::state::{RunSummary, TestOutcome, TestStatus, Verdict};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::PathBuf;

const PASS_COLOR: &str = "#28a745";
const FAIL_COLOR: &str = "#dc3545";
const SKIP_COLOR: &str = "#6c757d";

const STYLE: &str = "\
body{font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;background:#f4f5f7;margin:0;padding:24px;color:#212529}\
.container{max-width:760px;margin:0 auto;background:#fff;border-radius:8px;overflow:hidden}\
.header{color:#fff;padding:24px}\
.header h1{margin:0;font-size:22px}\
.header p{margin:6px 0 0}\
.metrics{display:flex;flex-wrap:wrap;padding:16px;gap:12px}\
.metric{flex:1;min-width:110px;background:#f8f9fa;border-radius:6px;padding:12px;text-align:center}\
.metric .value{font-size:22px;font-weight:bold}\
.metric .label{font-size:12px;text-transform:uppercase;color:#6c757d}\
.section{padding:0 24px 16px}\
.section ul{padding-left:18px}\
.section li{margin-bottom:10px}\
.meta{color:#6c757d;font-size:13px}\
.slow{background:#ffc107;color:#212529;border-radius:4px;padding:1px 6px;font-size:12px}\
.error{background:#f8d7da;padding:8px;border-radius:4px;white-space:pre-wrap;font-size:12px}\
.attachment{font-size:13px;color:#495057}\
.footer{padding:16px 24px;border-top:1px solid #dee2e6;font-size:13px}";

/// Minimal HTML escaping for text and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Passed => PASS_COLOR,
        Verdict::Failed => FAIL_COLOR,
    }
}

fn metric(html: &mut String, label: &str, value: &str, color: Option<&str>) {
    let style = color
        .map(|c| format!(" style=\"color:{}\"", c))
        .unwrap_or_default();
    let _ = write!(
        html,
        "<div class=\"metric\"><div class=\"value\"{}>{}</div><div class=\"label\">{}</div></div>",
        style, value, label
    );
}

fn item_meta(outcome: &TestOutcome) -> String {
    let duration = format_duration(outcome.duration_ms);
    match outcome.group_label.as_deref() {
        Some(group) if !group.is_empty() => format!("{} · {}", escape_html(group), duration),
        _ => duration,
    }
}

fn open_section(html: &mut String, id: &str, heading: &str, count: usize) {
    let _ = write!(
        html,
        "<div class=\"section\" id=\"{}\"><h2>{} ({})</h2><ul>",
        id, heading, count
    );
}

fn close_section(html: &mut String) {
    html.push_str("</ul></div>");
}

/// Render a complete HTML document for the run. Pure and deterministic.
pub fn to_html_report(summary: &RunSummary, context: &RunContext, limits: &FormatLimits) -> String {
    let verdict = summary.verdict();
    let counts = &summary.counts;
    let title = escape_html(&context.title);
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{} Results - {}</title><style>{}</style></head><body><div class=\"container\">",
        title, verdict, STYLE
    );

    let _ = write!(
        html,
        "<div class=\"header\" style=\"background:{}\"><h1>{} {} {}</h1><p>{}/{} tests passed</p></div>",
        verdict_color(verdict),
        verdict.emoji(),
        title,
        verdict,
        counts.passed,
        summary.total()
    );

    html.push_str("<div class=\"metrics\">");
    metric(&mut html, "Total", &summary.total().to_string(), None);
    metric(&mut html, "Passed", &counts.passed.to_string(), Some(PASS_COLOR));
    metric(&mut html, "Failed", &counts.failed.to_string(), Some(FAIL_COLOR));
    metric(&mut html, "Skipped", &counts.skipped.to_string(), Some(SKIP_COLOR));
    metric(
        &mut html,
        "Duration",
        &format_duration(summary.total_duration_ms),
        None,
    );
    html.push_str("</div>");

    if counts.failed > 0 {
        open_section(&mut html, "failed", "❌ Failed Tests", counts.failed);
        for outcome in summary.outcomes_with(&TestStatus::Failed) {
            let _ = write!(
                html,
                "<li><strong>{}</strong> <span class=\"meta\">{}</span>",
                escape_html(&outcome.title),
                item_meta(outcome)
            );
            if summary.is_slow(outcome, limits.slow_factor) {
                html.push_str(" <span class=\"slow\">🐢 slow</span>");
            }
            if let Some(error) = outcome.error_message.as_deref() {
                let _ = write!(html, "<pre class=\"error\">{}</pre>", escape_html(error));
            }
            if let Some(attachment) = outcome.attachment_ref.as_deref() {
                let _ = write!(
                    html,
                    "<p class=\"attachment\">🎥 Recording attached to the run artifacts: <code>{}</code></p>",
                    escape_html(attachment)
                );
            }
            html.push_str("</li>");
        }
        close_section(&mut html);
    }

    let simple_sections = [
        (TestStatus::Passed, "passed", "✅ Passed Tests", counts.passed),
        (TestStatus::Skipped, "skipped", "⏭️ Skipped Tests", counts.skipped),
    ];
    for (status, id, heading, count) in simple_sections {
        if count == 0 {
            continue;
        }
        open_section(&mut html, id, heading, count);
        for outcome in summary.outcomes_with(&status) {
            let _ = write!(
                html,
                "<li><strong>{}</strong> <span class=\"meta\">{}</span></li>",
                escape_html(&outcome.title),
                item_meta(outcome)
            );
        }
        close_section(&mut html);
    }

    let others: Vec<_> = summary.other_outcomes().collect();
    if !others.is_empty() {
        open_section(&mut html, "other", "⚠️ Other Outcomes", others.len());
        for outcome in others {
            let _ = write!(
                html,
                "<li><strong>{}</strong> <span class=\"meta\">{} · {}</span>",
                escape_html(&outcome.title),
                escape_html(outcome.status().as_str()),
                item_meta(outcome)
            );
            if let Some(error) = outcome.error_message.as_deref() {
                let _ = write!(html, "<pre class=\"error\">{}</pre>", escape_html(error));
            }
            html.push_str("</li>");
        }
        close_section(&mut html);
    }

    if let Some(url) = context.run_url.as_deref() {
        let label = match context.repository.as_deref() {
            Some(repo) => format!("View run for {}", escape_html(repo)),
            None => "View run".to_string(),
        };
        let _ = write!(
            html,
            "<div class=\"footer\"><a href=\"{}\">{}</a></div>",
            escape_html(url),
            label
        );
    }

    html.push_str("</div></body></html>\n");
    html
}

/// HTML reporter - writes the report document to disk at run end
pub struct HtmlReporter {
    output_path: PathBuf,
    context: RunContext,
    limits: FormatLimits,
}

impl HtmlReporter {
    pub fn new(output_path: PathBuf, context: RunContext, limits: FormatLimits) -> Self {
        Self {
            output_path,
            context,
            limits,
        }
    }
}

impl Reporter for HtmlReporter {
    fn on_test_end(&self, _outcome: &TestOutcome) {}

    fn on_run_end(&self, summary: &RunSummary) -> Result<()> {
        let html = to_html_report(summary, &self.context, &self.limits);
        std::fs::write(&self.output_path, html).with_context(|| {
            format!(
                "Failed to write HTML report file: {}",
                self.output_path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_item_meta_without_group() {
        let outcome = TestOutcome::passed("a", 2500);
        assert_eq!(item_meta(&outcome), "2.5s");
        let outcome = outcome.with_group("Mobile");
        assert_eq!(item_meta(&outcome), "Mobile · 2.5s");
    }
}
