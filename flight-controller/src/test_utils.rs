//! Float comparison helpers for unit tests.

pub const TEST_TOLERANCE: f32 = 1e-5;

pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// Component-wise `value_close` over two equally sized slices.
pub fn vector_close(target: &[f32], value: &[f32]) -> bool {
    target.len() == value.len()
        && target
            .iter()
            .zip(value.iter())
            .all(|(target, value)| value_close(*target, *value))
}
