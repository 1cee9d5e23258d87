use std::fmt::Write;

use crate::data_models::{RankedResult, SearchOutcome};

pub const EMPTY_HEADLINE: &str = "No results found";
pub const EMPTY_HINT: &str = "Try different keywords or check your spelling";

/// Plain-text rendering of an outcome for the terminal.
pub fn render_outcome(outcome: &SearchOutcome) -> String {
    let mut out = String::new();

    if outcome.is_empty() {
        let _ = writeln!(out, "{EMPTY_HEADLINE}");
        let _ = writeln!(out, "{EMPTY_HINT}");
        return out;
    }

    let _ = writeln!(out, "{}", stats_line(outcome));
    for result in &outcome.results {
        let _ = writeln!(out);
        render_result(&mut out, result);
    }
    out
}

pub fn stats_line(outcome: &SearchOutcome) -> String {
    format!(
        "About {} results ({:.2} seconds)",
        group_thousands(outcome.total_results),
        outcome.elapsed_seconds
    )
}

fn render_result(out: &mut String, result: &RankedResult) {
    match &result.timestamp {
        Some(ts) => {
            let _ = writeln!(out, "{} · {}", result.domain(), ts);
        }
        None => {
            let _ = writeln!(out, "{}", result.domain());
        }
    }
    let _ = writeln!(out, "{}", result.title);
    let _ = writeln!(out, "  {}", result.url);
    if !result.description.is_empty() {
        let _ = writeln!(out, "  {}", result.description);
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
