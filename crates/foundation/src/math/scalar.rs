/// Clamps `v` into `[0, 1]`.
pub fn clamp01(v: f64) -> f64 {
    v.max(0.0).min(1.0)
}

/// Linear blend from `a` to `b`.
///
/// The factor is clamped to `[0, 1]`, so a large `f` lands exactly on `b`
/// instead of overshooting it.
pub fn mix(a: f64, b: f64, f: f64) -> f64 {
    let f = clamp01(f);
    a * (1.0 - f) + b * f
}

/// Periodic phase in `[0, 1]` following a sine wave with period `period_s`.
pub fn sin_phase(time_s: f64, period_s: f64) -> f64 {
    let cycle = (time_s % period_s) / period_s;
    (cycle * std::f64::consts::TAU).sin() * 0.5 + 0.5
}
