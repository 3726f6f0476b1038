use std::fmt;

/// The eight electrical-consistency checks applied to every meter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    VoltageDrop,
    LowCosPhi,
    OverVoltage,
    ActivePowerLost,
    CurrentUnbalance,
    NeutralExceedsPhase,
    ImportExceedsExport,
    VoltageLossWithCurrent,
}

impl Indicator {
    /// All indicators in their fixed reporting order.
    pub const ALL: [Indicator; 8] = [
        Indicator::VoltageDrop,
        Indicator::LowCosPhi,
        Indicator::OverVoltage,
        Indicator::ActivePowerLost,
        Indicator::CurrentUnbalance,
        Indicator::NeutralExceedsPhase,
        Indicator::ImportExceedsExport,
        Indicator::VoltageLossWithCurrent,
    ];

    /// Stable column name used by exporters.
    pub fn column_name(self) -> &'static str {
        match self {
            Indicator::VoltageDrop => "v_drop",
            Indicator::LowCosPhi => "cos_phi_low",
            Indicator::OverVoltage => "over_voltage",
            Indicator::ActivePowerLost => "active_p_lost",
            Indicator::CurrentUnbalance => "unbalance_i",
            Indicator::NeutralExceedsPhase => "in_more_imax",
            Indicator::ImportExceedsExport => "import_gt_export",
            Indicator::VoltageLossWithCurrent => "v_lost_with_current",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Outcome of every indicator for one record. Switched-off checks are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IndicatorSet {
    pub voltage_drop: bool,
    pub low_cos_phi: bool,
    pub over_voltage: bool,
    pub active_power_lost: bool,
    pub current_unbalance: bool,
    pub neutral_exceeds_phase: bool,
    pub import_exceeds_export: bool,
    pub voltage_loss_with_current: bool,
}

impl IndicatorSet {
    pub fn get(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::VoltageDrop => self.voltage_drop,
            Indicator::LowCosPhi => self.low_cos_phi,
            Indicator::OverVoltage => self.over_voltage,
            Indicator::ActivePowerLost => self.active_power_lost,
            Indicator::CurrentUnbalance => self.current_unbalance,
            Indicator::NeutralExceedsPhase => self.neutral_exceeds_phase,
            Indicator::ImportExceedsExport => self.import_exceeds_export,
            Indicator::VoltageLossWithCurrent => self.voltage_loss_with_current,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Indicator, bool)> + '_ {
        Indicator::ALL.into_iter().map(move |i| (i, self.get(i)))
    }

    /// Indicators that fired, in reporting order.
    pub fn raised(&self) -> impl Iterator<Item = Indicator> + '_ {
        self.iter().filter_map(|(i, hit)| hit.then_some(i))
    }

    pub fn count(&self) -> u8 {
        self.raised().count() as u8
    }
}
