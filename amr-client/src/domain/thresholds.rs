use crate::domain::ConfigError;

/// Tunable limits for the indicator checks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default, deny_unknown_fields)
)]
pub struct ThresholdConfig {
    /// Phase-1 voltage below this is a voltage drop.
    pub voltage_drop_threshold: f64,
    /// Phase-1 voltage above this is an over-voltage.
    pub over_voltage_threshold: f64,
    /// Cos-phi below this is suspicious.
    pub max_cos_phi: f64,
    /// Phase-1 current above this while active power reads zero.
    pub active_power_lost_current_threshold: f64,
    /// Allowed |I1 - mean(I2, I3)|.
    pub current_unbalance_tolerance: f64,
    /// Neutral current above `factor * max(I1, I2, I3)` is anomalous.
    pub neutral_over_phase_factor: f64,
    pub enable_import_export_check: bool,
    pub enable_voltage_loss_with_current_check: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            voltage_drop_threshold: 56.0,
            over_voltage_threshold: 62.0,
            max_cos_phi: 0.4,
            active_power_lost_current_threshold: 0.5,
            current_unbalance_tolerance: 0.5,
            neutral_over_phase_factor: 1.3,
            enable_import_export_check: false,
            enable_voltage_loss_with_current_check: false,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("voltage_drop_threshold", self.voltage_drop_threshold),
            ("over_voltage_threshold", self.over_voltage_threshold),
            ("max_cos_phi", self.max_cos_phi),
            (
                "active_power_lost_current_threshold",
                self.active_power_lost_current_threshold,
            ),
            ("current_unbalance_tolerance", self.current_unbalance_tolerance),
            ("neutral_over_phase_factor", self.neutral_over_phase_factor),
        ];
        for (field, value) in limits {
            if !value.is_finite() {
                return Err(ConfigError::new(field, format!("must be a finite number, got {value}")));
            }
        }

        let non_negative = [
            (
                "active_power_lost_current_threshold",
                self.active_power_lost_current_threshold,
            ),
            ("current_unbalance_tolerance", self.current_unbalance_tolerance),
            ("neutral_over_phase_factor", self.neutral_over_phase_factor),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::new(field, format!("must not be negative, got {value}")));
            }
        }

        Ok(())
    }

    /// True when the drop limit sits above the over-voltage limit, so a
    /// reading between them raises both flags.
    pub fn voltage_window_inverted(&self) -> bool {
        self.voltage_drop_threshold > self.over_voltage_threshold
    }
}

/// Inclusion rules for the inspection target list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default, deny_unknown_fields)
)]
pub struct SelectionCriteria {
    pub min_indicator_count: u32,
    pub min_weighted_score: u32,
    pub top_n: usize,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            min_indicator_count: 2,
            min_weighted_score: 10,
            top_n: 50,
        }
    }
}

impl SelectionCriteria {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_indicator_count < 1 {
            return Err(ConfigError::new("min_indicator_count", "must be at least 1"));
        }
        if self.min_weighted_score < 1 {
            return Err(ConfigError::new("min_weighted_score", "must be at least 1"));
        }
        if self.top_n < 1 {
            return Err(ConfigError::new("top_n", "must be at least 1"));
        }
        Ok(())
    }
}
