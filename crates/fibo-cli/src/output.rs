//! CLI output formatting.

use std::time::Duration;

use fibo_core::Number;

/// Digits kept on each side when a long value is abbreviated.
const EDGE_DIGITS: usize = 40;

/// Format a value for display, abbreviating very long ones unless `verbose`.
#[must_use]
pub fn format_value(value: &Number, verbose: bool) -> String {
    let s = value.to_decimal_string();
    if !verbose && s.len() > 2 * EDGE_DIGITS + 20 {
        format!(
            "{}...{} ({} digits)",
            &s[..EDGE_DIGITS],
            &s[s.len() - EDGE_DIGITS..],
            value.digits()
        )
    } else {
        s
    }
}

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a count with thousand separators.
#[must_use]
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
