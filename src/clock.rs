// Wall-clock helpers shared by the simulators.

/// Milliseconds since the Unix epoch; 0 (with a warning) if the clock is before the epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0
        })
}

/// Local time formatted for display, e.g. "2024-01-15 10:30:45".
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
