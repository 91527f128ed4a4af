//! Human-readable number formatting shared by the TUI and the text report.

const BYTE_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Format a byte count with binary units (e.g., 1536 -> "1.5 KiB").
pub fn format_bytes(bytes: u64) -> String {
    scale_bytes(bytes as f64)
}

/// Format a per-second byte rate (e.g., 100000.0 -> "97.7 KiB/s").
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", scale_bytes(bytes_per_sec.max(0.0)))
}

fn scale_bytes(mut value: f64) -> String {
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", value, BYTE_UNITS[0])
    } else {
        format!("{:.1} {}", value, BYTE_UNITS[unit])
    }
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format an events-per-second rate, "-" while it is still warming up.
pub fn format_per_sec(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r >= 1_000.0 => format!("{:.1}K/s", r / 1_000.0),
        Some(r) => format!("{:.1}/s", r),
        None => "-".to_string(),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
