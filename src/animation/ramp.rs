/// Linear scale-in ramp: `min(1, t / ramp_secs)` for `t >= 0`.
///
/// At `t = 0` the factor is 0 (invisible), at or after `t = ramp_secs` it is
/// 1 and holds constant. Pure function of elapsed time; a non-positive ramp
/// disables the effect entirely (factor 1).
pub fn scale_intro(t: f64, ramp_secs: f64) -> f64 {
    if ramp_secs <= 0.0 {
        return 1.0;
    }
    (t / ramp_secs).clamp(0.0, 1.0)
}
