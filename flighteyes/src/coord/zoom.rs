//! Altitude to zoom level mapping.

use super::scheme::WebMercator;
use super::types::CoordError;

/// Empirical scale: `zoom = round(log2(ALTITUDE_SCALE / altitude))`.
pub const ALTITUDE_SCALE: f64 = 35_200_000.0;

/// Viewing altitude used when the caller does not give one.
pub const DEFAULT_ALTITUDE: f64 = 30_000.0;

/// Maps a viewing altitude to a zoom level of `scheme`.
///
/// Lower altitudes give finer zoom levels. The result is clamped to the
/// scheme's zoom range.
///
/// # Errors
///
/// Returns `CoordError::InvalidAltitude` for zero, negative or non-finite
/// altitudes.
pub fn zoom_for_altitude(altitude: f64, scheme: &WebMercator) -> Result<u8, CoordError> {
    if !altitude.is_finite() || altitude <= 0.0 {
        return Err(CoordError::InvalidAltitude(altitude));
    }

    let zoom = (ALTITUDE_SCALE / altitude).log2().round();
    let clamped = zoom.clamp(f64::from(scheme.min_zoom()), f64::from(scheme.max_zoom()));
    Ok(clamped as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_altitude_zoom() {
        let zoom = zoom_for_altitude(DEFAULT_ALTITUDE, &WebMercator::new()).unwrap();
        assert_eq!(zoom, 10);
    }

    #[test]
    fn test_half_altitude_is_one_level_finer() {
        let scheme = WebMercator::new();
        let high = zoom_for_altitude(30_000.0, &scheme).unwrap();
        let low = zoom_for_altitude(15_000.0, &scheme).unwrap();
        assert!(low >= high);
        assert_eq!(low, high + 1);
    }

    #[test]
    fn test_zero_altitude_rejected() {
        let result = zoom_for_altitude(0.0, &WebMercator::new());
        assert_eq!(result, Err(CoordError::InvalidAltitude(0.0)));
    }

    #[test]
    fn test_negative_altitude_rejected() {
        let result = zoom_for_altitude(-500.0, &WebMercator::new());
        assert!(matches!(result, Err(CoordError::InvalidAltitude(_))));
    }

    #[test]
    fn test_nan_altitude_rejected() {
        assert!(zoom_for_altitude(f64::NAN, &WebMercator::new()).is_err());
    }

    #[test]
    fn test_very_low_altitude_clamps_to_max_zoom() {
        let scheme = WebMercator::new().with_max_zoom(19);
        assert_eq!(zoom_for_altitude(0.5, &scheme).unwrap(), 19);
    }

    #[test]
    fn test_very_high_altitude_clamps_to_zero() {
        let zoom = zoom_for_altitude(1.0e12, &WebMercator::new()).unwrap();
        assert_eq!(zoom, 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_monotonic(a in 1.0..1.0e9_f64, b in 1.0..1.0e9_f64) {
                let scheme = WebMercator::new();
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                let fine = zoom_for_altitude(low, &scheme)?;
                let coarse = zoom_for_altitude(high, &scheme)?;
                prop_assert!(fine >= coarse);
            }

            #[test]
            fn test_within_scheme_range(altitude in 1.0e-3..1.0e12_f64) {
                let scheme = WebMercator::new();
                let zoom = zoom_for_altitude(altitude, &scheme)?;
                prop_assert!(zoom <= scheme.max_zoom());
            }
        }
    }
}
