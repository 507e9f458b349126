//! Retention duration parsing.
//!
//! Two spellings are accepted:
//!
//! - **Hour count**: a bare integer such as `336`
//! - **Duration expression**: one or more `<number><unit>` terms such as
//!   `336h`, `1h30m`, `1.5h` or `500ms`; units are `h`, `m`, `s`, `ms`,
//!   `us`/`µs` and `ns`

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use super::{ConfigError, ConfigResult};

const NANOS_PER_SEC: u64 = 1_000_000_000;

fn term_regex() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    TERM.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|ms|h|m|s)").expect("duration regex is valid")
    })
}

fn unit_nanos(unit: &str) -> f64 {
    match unit {
        "ns" => 1.0,
        "us" | "µs" => 1_000.0,
        "ms" => 1_000_000.0,
        "s" => NANOS_PER_SEC as f64,
        "m" => 60.0 * NANOS_PER_SEC as f64,
        _ => 3_600.0 * NANOS_PER_SEC as f64,
    }
}

fn invalid(value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Parse a retention threshold from an hour count or a duration expression.
pub fn parse_retain_duration(value: &str) -> ConfigResult<Duration> {
    let input = value.trim();
    if input.is_empty() {
        return Err(invalid(value, "empty value"));
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let hours: u64 = input.parse().map_err(|_| invalid(value, "out of range"))?;
        return hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or_else(|| invalid(value, "out of range"));
    }

    let mut cursor = 0;
    let mut total_nanos = 0.0_f64;
    for caps in term_regex().captures_iter(input) {
        let whole = caps.get(0).expect("group 0 always matches");
        if whole.start() != cursor {
            return Err(invalid(value, format!("unexpected text at offset {cursor}")));
        }
        cursor = whole.end();

        let amount: f64 = caps[1]
            .parse()
            .map_err(|_| invalid(value, format!("bad number {:?}", &caps[1])))?;
        total_nanos += amount * unit_nanos(&caps[2]);
    }

    if cursor != input.len() {
        let reason = if cursor == 0 {
            "expected an hour count or terms like 336h, 1h30m".to_string()
        } else {
            format!("unexpected text at offset {cursor}")
        };
        return Err(invalid(value, reason));
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid(value, "out of range"));
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Render a duration as `336h0m0s`, `1m30s`, `1.5s` and so on.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let nanos = duration.subsec_nanos();

    let seconds = if nanos == 0 {
        format!("{secs}s")
    } else {
        let fraction = format!("{nanos:09}");
        format!("{secs}.{}s", fraction.trim_end_matches('0'))
    };

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}")
    } else {
        seconds
    }
}
