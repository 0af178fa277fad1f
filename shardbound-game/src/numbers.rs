//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Floor a non-negative f64 into an index below `len`, saturating at `len - 1`.
#[must_use]
pub fn floor_f64_to_index(value: f64, len: usize) -> usize {
    if len == 0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor())
        .unwrap_or(usize::MAX)
        .min(len - 1)
}

/// Floor a f64 and clamp it into `[0, max]` as a u8.
#[must_use]
pub fn floor_f64_to_u8_clamped(value: f64, max: u8) -> u8 {
    let floored = floor_f64_to_i64(value).clamp(0, i64::from(max));
    u8::try_from(floored).unwrap_or(max)
}

/// Round a f64 half away from zero and clamp it to the i32 range.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    let rounded = floor_f64_to_i64(value.round())
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    i32::try_from(rounded).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_non_finite() {
        assert_eq!(floor_f64_to_i64(f64::NAN), 0);
        assert_eq!(floor_f64_to_i64(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_i64(-1.5), -2);
        assert_eq!(floor_f64_to_i64(2.99), 2);
    }

    #[test]
    fn index_saturates_below_len() {
        assert_eq!(floor_f64_to_index(2.7, 3), 2);
        assert_eq!(floor_f64_to_index(3.0, 3), 2);
        assert_eq!(floor_f64_to_index(-0.1, 3), 0);
        assert_eq!(floor_f64_to_index(1.0, 0), 0);
    }

    #[test]
    fn rounding_to_i32() {
        assert_eq!(round_f64_to_i32(20.0), 20);
        assert_eq!(round_f64_to_i32(2.5), 3);
        assert_eq!(round_f64_to_i32(-1.4), -1);
        assert_eq!(round_f64_to_i32(1e12), i32::MAX);
    }

    #[test]
    fn u8_clamp_covers_bounds() {
        assert_eq!(floor_f64_to_u8_clamped(7.9, 5), 5);
        assert_eq!(floor_f64_to_u8_clamped(-3.0, 5), 0);
        assert_eq!(floor_f64_to_u8_clamped(4.99, 5), 4);
    }
}
