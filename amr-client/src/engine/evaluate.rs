use crate::domain::{IndicatorSet, MeterRecord, RecordError, ThresholdConfig};

/// Evaluate every indicator for one record.
///
/// Either all eight flags are computed or the record is rejected as a whole;
/// a record with a missing numeric field never produces a partial set.
///
/// `thresholds` must already be validated; a NaN limit would silently clear
/// its flag. Outside the crate this is reached only through `TargetEngine`,
/// whose constructor validates.
pub(crate) fn evaluate(record: &MeterRecord, thresholds: &ThresholdConfig) -> Result<IndicatorSet, RecordError> {
    record.ensure_complete()?;

    let r = record;
    let t = thresholds;

    let phase_mean_23 = (r.current_l2 + r.current_l3) / 2.0;
    let phase_max = r.current_l1.max(r.current_l2).max(r.current_l3);

    // Both zero comparisons are exact, no epsilon.
    Ok(IndicatorSet {
        voltage_drop: r.voltage_l1 < t.voltage_drop_threshold,
        low_cos_phi: r.cos_phi < t.max_cos_phi,
        over_voltage: r.voltage_l1 > t.over_voltage_threshold,
        active_power_lost: r.active_power == 0.0 && r.current_l1 > t.active_power_lost_current_threshold,
        current_unbalance: (r.current_l1 - phase_mean_23).abs() >= t.current_unbalance_tolerance,
        neutral_exceeds_phase: r.current_n > phase_max * t.neutral_over_phase_factor,
        import_exceeds_export: t.enable_import_export_check && r.kwh_import > r.kwh_export,
        voltage_loss_with_current: t.enable_voltage_loss_with_current_check
            && r.voltage_l1 == 0.0
            && r.current_l1 > 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Indicator;
    use crate::engine::fixtures::nominal_record;

    #[test]
    fn nominal_record_raises_nothing() {
        let set = evaluate(&nominal_record("a"), &ThresholdConfig::default()).unwrap();
        assert_eq!(set, IndicatorSet::default());
    }

    #[test]
    fn low_voltage_and_low_cos_phi() {
        let mut r = nominal_record("a");
        r.voltage_l1 = 50.0;
        r.cos_phi = 0.2;

        let set = evaluate(&r, &ThresholdConfig::default()).unwrap();
        let raised: Vec<_> = set.raised().collect();
        assert_eq!(raised, vec![Indicator::VoltageDrop, Indicator::LowCosPhi]);
    }

    #[test]
    fn over_voltage_is_strictly_above_threshold() {
        let mut r = nominal_record("a");
        r.voltage_l1 = 62.0;
        assert!(!evaluate(&r, &ThresholdConfig::default()).unwrap().over_voltage);

        r.voltage_l1 = 62.1;
        assert!(evaluate(&r, &ThresholdConfig::default()).unwrap().over_voltage);
    }

    #[test]
    fn active_power_lost_with_current_flowing() {
        let mut r = nominal_record("a");
        r.active_power = 0.0;
        r.current_l1 = 1.0;

        let set = evaluate(&r, &ThresholdConfig::default()).unwrap();
        assert!(set.active_power_lost);
    }

    #[test]
    fn active_power_lost_requires_exact_zero() {
        let mut r = nominal_record("a");
        r.active_power = 1e-9;
        r.current_l1 = 1.0;

        let set = evaluate(&r, &ThresholdConfig::default()).unwrap();
        assert!(!set.active_power_lost);
    }

    #[test]
    fn unbalance_is_inclusive_of_tolerance() {
        let mut r = nominal_record("a");
        r.current_l1 = 1.5;
        r.current_l2 = 1.0;
        r.current_l3 = 1.0;

        let set = evaluate(&r, &ThresholdConfig::default()).unwrap();
        assert!(set.current_unbalance);

        r.current_l1 = 1.4;
        let set = evaluate(&r, &ThresholdConfig::default()).unwrap();
        assert!(!set.current_unbalance);
    }

    #[test]
    fn neutral_compared_against_largest_phase() {
        let mut r = nominal_record("a");
        r.current_l1 = 1.0;
        r.current_l2 = 2.0;
        r.current_l3 = 1.0;
        r.current_n = 2.5;

        // 2.5 < 2.0 * 1.3
        assert!(!evaluate(&r, &ThresholdConfig::default()).unwrap().neutral_exceeds_phase);

        r.current_n = 2.7;
        assert!(evaluate(&r, &ThresholdConfig::default()).unwrap().neutral_exceeds_phase);
    }

    #[test]
    fn import_check_is_off_unless_enabled() {
        let mut r = nominal_record("a");
        r.kwh_import = 100.0;
        r.kwh_export = 50.0;

        let off = ThresholdConfig::default();
        assert!(!evaluate(&r, &off).unwrap().import_exceeds_export);

        let on = ThresholdConfig {
            enable_import_export_check: true,
            ..Default::default()
        };
        assert!(evaluate(&r, &on).unwrap().import_exceeds_export);
    }

    #[test]
    fn voltage_loss_check_is_off_unless_enabled() {
        let mut r = nominal_record("a");
        r.voltage_l1 = 0.0;
        r.current_l1 = 0.2;

        let off = ThresholdConfig::default();
        let set = evaluate(&r, &off).unwrap();
        assert!(!set.voltage_loss_with_current);
        assert!(set.voltage_drop);

        let on = ThresholdConfig {
            enable_voltage_loss_with_current_check: true,
            ..Default::default()
        };
        assert!(evaluate(&r, &on).unwrap().voltage_loss_with_current);
    }

    #[test]
    fn voltage_loss_needs_current_on_phase_one() {
        let mut r = nominal_record("a");
        r.voltage_l1 = 0.0;
        r.current_l1 = 0.0;

        let on = ThresholdConfig {
            enable_voltage_loss_with_current_check: true,
            ..Default::default()
        };
        let set = evaluate(&r, &on).unwrap();
        assert!(!set.voltage_loss_with_current);
        assert!(set.voltage_drop);
    }

    #[test]
    fn missing_field_rejects_whole_record() {
        let mut r = nominal_record("a");
        r.current_l1 = f64::NAN;
        r.active_power = 0.0;

        let err = evaluate(&r, &ThresholdConfig::default()).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { field: "CURRENT_L1", .. }));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let mut r = nominal_record("a");
        r.voltage_l1 = 63.0;
        r.current_n = 9.0;
        let cfg = ThresholdConfig::default();

        let first = evaluate(&r, &cfg).unwrap();
        for _ in 0..10 {
            assert_eq!(evaluate(&r, &cfg).unwrap(), first);
        }
    }
}
