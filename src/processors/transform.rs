use crate::models::DataType;
use crate::utils::constants::{DEGREES_IN_CIRCLE, VALUE_SCALE, WIND_DIRECTION_OFFSET};

/// Decode raw raster cell values into physical units.
///
/// Every data type scales by 0.1 to undo the decivalue storage encoding.
/// Wind direction additionally shifts by +180 and wraps into [0, 360) to
/// reconstruct a compass bearing from a zero-centred encoding; the add
/// must happen before the wrap. Decoded values are not range-checked:
/// physically impossible results pass through unchanged.
pub fn decode_values(data_type: DataType, raw_values: &[f64]) -> Vec<f32> {
    match data_type {
        DataType::WindDirection => raw_values
            .iter()
            .map(|&raw| {
                ((raw * VALUE_SCALE + WIND_DIRECTION_OFFSET).rem_euclid(DEGREES_IN_CIRCLE)) as f32
            })
            .collect(),
        _ => raw_values
            .iter()
            .map(|&raw| (raw * VALUE_SCALE) as f32)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scale_only_types() {
        for data_type in [
            DataType::WindSpeed,
            DataType::WindGust,
            DataType::IceMass,
            DataType::IceThickness,
        ] {
            let decoded = decode_values(data_type, &[0.0, 15.0, 123.0, -40.0]);
            assert_eq!(decoded, vec![0.0, 1.5, 12.3, -4.0]);
        }
    }

    #[test]
    fn test_wind_speed_exact_scale() {
        let raw = [250.0];
        let decoded = decode_values(DataType::WindSpeed, &raw);
        assert_eq!(decoded[0], (250.0f64 * 0.1) as f32);
    }

    #[test]
    fn test_wind_direction_wrap_at_full_circle() {
        // 1800 * 0.1 + 180 = 360 wraps to exactly 0
        let decoded = decode_values(DataType::WindDirection, &[1800.0]);
        assert_eq!(decoded, vec![0.0]);
    }

    #[test]
    fn test_wind_direction_offset_applies_before_wrap() {
        // 0 raw is the encoding centre and must come out as 180, not 0
        let decoded = decode_values(DataType::WindDirection, &[0.0]);
        assert_eq!(decoded, vec![180.0]);

        let decoded = decode_values(DataType::WindDirection, &[900.0]);
        assert_eq!(decoded, vec![270.0]);
    }

    #[test]
    fn test_wind_direction_negative_raw_wraps_positive() {
        // -2700 * 0.1 + 180 = -90 wraps to 270
        let decoded = decode_values(DataType::WindDirection, &[-2700.0]);
        assert_eq!(decoded, vec![270.0]);
    }

    #[test]
    fn test_wind_direction_always_in_range() {
        let raw: Vec<f64> = (-50..50).map(|i| i as f64 * 137.0).collect();
        for value in decode_values(DataType::WindDirection, &raw) {
            assert!(
                (0.0..360.0).contains(&value),
                "direction {value} escaped [0, 360)"
            );
        }
    }

    #[test]
    fn test_no_physical_range_clamping() {
        // Negative ice mass is passed through, not rejected
        let decoded = decode_values(DataType::IceMass, &[-120.0]);
        assert_eq!(decoded, vec![-12.0]);
    }

    #[test]
    fn test_output_length_and_order_match_input() {
        let raw = [10.0, 20.0, 30.0];
        let decoded = decode_values(DataType::WindGust, &raw);
        assert_eq!(decoded, vec![1.0, 2.0, 3.0]);
    }
}
