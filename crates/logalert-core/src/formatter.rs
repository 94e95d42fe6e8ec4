//! Markdown rendering of alert messages.
//!
//! The output targets chat webhooks that accept a markdown subset with
//! `<font color>` tags.

#![allow(clippy::format_push_string)]

use crate::types::EvaluationResult;

/// Upper bound on the rendered message, in UTF-8 bytes.
///
/// Matches the markdown content limit of the WeCom robot API.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Samples longer than this many UTF-8 bytes are cut.
pub const MAX_SAMPLE_BYTES: usize = 1024;

const ELLIPSIS: char = '…';

/// Renders the alert for one evaluated index.
///
/// The output depends only on the arguments. Samples are shortened so the
/// whole message stays within [`MAX_MESSAGE_BYTES`] unless the header and
/// links alone exceed it.
#[must_use]
pub fn format_alert(result: &EvaluationResult, explore_link: &str, silence_link: &str) -> String {
    let mut header = String::new();
    header.push_str("# Log Alert\n");
    header.push_str(&format!(
        "## <font color=\"#ff0000\">[{}] error logs detected</font>\n",
        result.index
    ));
    header.push_str(&format!(
        "> Errors: **{}** / {} ({})\n\n",
        result.error_count,
        result.total_count,
        result.ratio_display()
    ));

    let mut links = String::new();
    links.push_str(&format!("- [Explore logs for the alert window]({explore_link})\n"));
    links.push_str(&format!("- [Silence this index]({silence_link})\n"));

    let budget = MAX_MESSAGE_BYTES.saturating_sub(header.len() + links.len());

    let mut output = header;
    output.push_str(&format_samples(&result.sample_messages, budget));
    output.push_str(&links);
    output
}

/// Renders the sample section in at most `budget` bytes, split evenly per sample.
fn format_samples(samples: &[String], budget: usize) -> String {
    if samples.is_empty() {
        return "Samples: none\n".to_string();
    }

    let mut section = String::from("Samples:\n");
    let per_line = budget.saturating_sub(section.len()) / samples.len();
    for (i, message) in samples.iter().enumerate() {
        let prefix = format!("- {}: ", i + 1);
        let room = per_line.saturating_sub(prefix.len() + 1).min(MAX_SAMPLE_BYTES);
        section.push_str(&prefix);
        section.push_str(&sanitize_sample(message, room));
        section.push('\n');
    }
    section
}

/// Flattens a sample onto one line and cuts it to `max_bytes` on a char boundary.
fn sanitize_sample(message: &str, max_bytes: usize) -> String {
    let flat: String = message
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if flat.len() <= max_bytes {
        return flat;
    }
    let Some(limit) = max_bytes.checked_sub(ELLIPSIS.len_utf8()) else {
        return String::new();
    };
    let end = flat
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= limit)
        .last()
        .unwrap_or(0);
    let mut cut = flat[..end].to_string();
    cut.push(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexTarget;
    use chrono::NaiveDate;

    fn result(samples: &[&str]) -> EvaluationResult {
        EvaluationResult {
            index: IndexTarget::new("javalogs-", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            total_count: 50,
            error_count: 12,
            error_ratio_percent: 24.0,
            sample_messages: samples.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn message_contains_header_counts_and_links() {
        let message = format_alert(
            &result(&["NullPointerException", "timeout"]),
            "http://explore",
            "http://silence",
        );
        assert!(message.starts_with("# Log Alert\n"));
        assert!(message.contains("[javalogs-2024-05-01]"));
        assert!(message.contains("**12**"));
        assert!(message.contains("24.0%"));
        assert!(message.contains("- 1: NullPointerException\n- 2: timeout\n"));
        assert!(message.contains("(http://explore)"));
        assert!(message.contains("(http://silence)"));
    }

    #[test]
    fn empty_samples_render_none() {
        let message = format_alert(&result(&[]), "e", "s");
        assert!(message.contains("Samples: none\n"));
        assert!(!message.contains("- 1:"));
    }

    #[test]
    fn output_is_byte_identical_across_calls() {
        let r = result(&["a", "b", "c"]);
        assert_eq!(format_alert(&r, "e", "s"), format_alert(&r, "e", "s"));
    }

    #[test]
    fn multiline_samples_are_flattened() {
        let message = format_alert(&result(&["boom\n\tat Foo.bar()\r\n"]), "e", "s");
        assert!(message.contains("- 1: boom \tat Foo.bar()\n"));
    }

    #[test]
    fn long_samples_are_truncated() {
        let long = "x".repeat(MAX_SAMPLE_BYTES + 10);
        let sanitized = sanitize_sample(&long, MAX_SAMPLE_BYTES);
        assert_eq!(sanitized.len(), MAX_SAMPLE_BYTES);
        assert!(sanitized.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Each ideograph is three bytes; the ellipsis is three bytes.
        assert_eq!(sanitize_sample("空指针异常", 8), "空…");
        assert_eq!(sanitize_sample("空指针异常", 9), "空指…");
        assert_eq!(sanitize_sample("空指针异常", 15), "空指针异常");
        assert_eq!(sanitize_sample("空指针异常", 2), "");
    }

    #[test]
    fn cjk_samples_keep_message_within_webhook_limit() {
        let sample = "空指针异常".repeat(200);
        let message = format_alert(
            &result(&[&sample, &sample, &sample]),
            "http://kibana:5601/app/discover#/?_a=(index:'javalogs-2024-05-01')",
            "http://am:9094/#/silences/new?filter=%7Bpath%3D%22javalogs-2024-05-01%22%7D",
        );
        assert!(message.len() <= MAX_MESSAGE_BYTES, "{} bytes", message.len());
        assert!(message.contains("- 1: 空指针异常"));
        assert!(message.contains("- 3: 空指针异常"));
        assert_eq!(message.matches('…').count(), 3);
        assert!(message.ends_with("%7D)\n"));
    }
}
