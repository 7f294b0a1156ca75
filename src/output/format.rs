use std::fmt::Write;
use std::time::Duration;

/// Human-readable byte count: `0.0B`, `1.5KB`, `12.0MB`. Negative input is
/// printed as-is so unknown lengths stay visible as `-1.0B`.
pub fn byte_format(bytes: i64) -> String {
    const UNITS: [&str; 8] = ["", "K", "M", "G", "T", "P", "E", "Z"];
    let mut num = bytes as f64;
    for unit in UNITS {
        if num < 1024.0 {
            return format!("{:3.1}{}B", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.1}YB", num)
}

/// Length as printed on a result line; unknown becomes `-1.0B`.
pub fn length_format(length: Option<u64>) -> String {
    byte_format(length.map(|n| n as i64).unwrap_or(-1))
}

/// Renders a duration the way Go's `time.Duration` prints: `250ms`, `1.5s`,
/// `1m30s`, `12.345µs`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let rest = nanos - u128::from(hours * 3600 + minutes * 60) * 1_000_000_000;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{}h", hours);
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    let _ = write!(out, "{}s", decimal(rest, 1_000_000_000));
    out
}

/// `value / unit` with trailing zeros of the fraction removed.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let frac = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
