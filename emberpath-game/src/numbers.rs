//! Numeric conversion helpers centralizing the float math behind scaling.

use num_traits::cast::cast;

/// Multiply a stat by a factor and round half away from zero, clamped to the
/// `u32` range. Non-finite or negative products collapse to 0.
#[must_use]
pub fn scale_u32(base: u32, factor: f64) -> u32 {
    let product = f64::from(base) * factor;
    if !product.is_finite() || product <= 0.0 {
        return 0;
    }
    let max = f64::from(u32::MAX);
    cast::<f64, u32>(product.round().min(max)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_rounds_to_nearest() {
        assert_eq!(scale_u32(400, 2.175), 870);
        assert_eq!(scale_u32(3, 1.5), 5);
        assert_eq!(scale_u32(7, 1.0), 7);
    }

    #[test]
    fn scaling_clamps_extremes() {
        assert_eq!(scale_u32(10, f64::NAN), 0);
        assert_eq!(scale_u32(10, -2.0), 0);
        assert_eq!(scale_u32(u32::MAX, 4.0), u32::MAX);
    }
}
