pub mod vectors;

/// Symmetric clamp to `[-limit, limit]`.
pub fn constraint_value(value: f32, limit: f32) -> f32 {
    if value > limit {
        return limit;
    }
    if value < -limit {
        return -limit;
    }
    value
}
