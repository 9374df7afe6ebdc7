use embassy_time::Instant;

/// Microseconds since `start`, saturated to fit the telemetry counter.
pub fn elapsed_us_since(start: Instant) -> u32 {
    u32::try_from(start.elapsed().as_micros()).unwrap_or(u32::MAX)
}
