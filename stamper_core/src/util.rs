//! Common speed/period helpers for stamper_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: f32 = 1_000.0;
/// Slowest stamping speed (papers per second).
pub const MIN_SPEED_PPS: f32 = stamper_config::MIN_SPEED_PPS;
/// Fastest stamping speed (papers per second).
pub const MAX_SPEED_PPS: f32 = stamper_config::MAX_SPEED_PPS;
/// Highest sensor threshold.
pub const MAX_THRESHOLD: u8 = 100;

/// Clamp a requested speed to `[MIN_SPEED_PPS, MAX_SPEED_PPS]`.
/// Non-finite input maps to the minimum.
#[inline]
pub fn clamp_speed(pps: f32) -> f32 {
    if !pps.is_finite() {
        return MIN_SPEED_PPS;
    }
    pps.clamp(MIN_SPEED_PPS, MAX_SPEED_PPS)
}

/// Clamp a requested threshold to `[0, MAX_THRESHOLD]`.
#[inline]
pub fn clamp_threshold(value: i32) -> u8 {
    // Bounded to 0..=100 so the cast is lossless.
    value.clamp(0, i32::from(MAX_THRESHOLD)) as u8
}

/// Stamping interval in milliseconds: `round(1000 / pps)`, at least 1 ms.
/// The speed is clamped first, so the result is in `[17, 1000]`.
#[inline]
pub fn stamp_interval_ms(pps: f32) -> u64 {
    let pps = clamp_speed(pps);
    // In [16.67, 1000] after clamping; rounding then casting is lossless.
    ((MILLIS_PER_SEC / pps).round() as u64).max(1)
}
