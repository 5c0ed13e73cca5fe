//! Integer rounding of float quotients.
//!
//! Shares and capacities are computed as `f64` products and quotients, so a
//! value that is mathematically an integer can land a few ulps either side
//! of it. Values within [`FLOAT_SNAP_TOLERANCE`] of an integer are snapped
//! to that integer before truncation.

/// Relative distance from an integer under which a quotient snaps to it.
pub(crate) const FLOAT_SNAP_TOLERANCE: f64 = 1e-9;

fn snapped(value: f64) -> Option<f64> {
    let nearest = value.round();
    ((value - nearest).abs() <= FLOAT_SNAP_TOLERANCE * nearest.abs().max(1.0)).then_some(nearest)
}

/// `floor`, snapping near-integers first. Negative and NaN inputs give 0.
pub(crate) fn snap_floor(value: f64) -> u64 {
    snapped(value).unwrap_or_else(|| value.floor()) as u64
}

/// `ceil`, snapping near-integers first. Negative and NaN inputs give 0.
pub(crate) fn snap_ceil(value: f64) -> u64 {
    snapped(value).unwrap_or_else(|| value.ceil()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_floor() {
        assert_eq!(snap_floor(37.5), 37);
        assert_eq!(snap_floor(36.999_999_999_99), 37);
        assert_eq!(snap_floor(36.99), 36);
        assert_eq!(snap_floor(0.0), 0);
    }

    #[test]
    fn test_snap_ceil() {
        assert_eq!(snap_ceil(1000.000_000_000_1), 1000);
        assert_eq!(snap_ceil(1000.01), 1001);
        assert_eq!(snap_ceil(999.5), 1000);
    }

    #[test]
    fn test_negative_and_nan_saturate_to_zero() {
        assert_eq!(snap_floor(-3.5), 0);
        assert_eq!(snap_ceil(f64::NAN), 0);
    }
}
