use crate::domain::RecordError;

/// Column names of the AMR instant-reading export.
pub mod columns {
    pub const CUSTOMER_ID: &str = "IDPEL";
    pub const CUSTOMER_NAME: &str = "NAMA";
    pub const TARIFF: &str = "TARIF";
    pub const CONTRACTED_POWER: &str = "DAYA";
    pub const VOLTAGE_L1: &str = "VOLTAGE_L1";
    pub const CURRENT_L1: &str = "CURRENT_L1";
    pub const CURRENT_L2: &str = "CURRENT_L2";
    pub const CURRENT_L3: &str = "CURRENT_L3";
    pub const CURRENT_N: &str = "CURRENT_N";
    pub const ACTIVE_POWER: &str = "ACTIVE_POWER";
    pub const COS_PHI: &str = "COS_PHI";
    pub const KWH_IMPORT: &str = "KWH_IMP";
    pub const KWH_EXPORT: &str = "KWH_EXP";
}

/// One row of AMR instant telemetry for a single customer meter.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterRecord {
    pub customer_id: String,
    pub customer_name: String,
    pub tariff: String,
    pub contracted_power: f64,
    pub voltage_l1: f64,
    pub current_l1: f64,
    pub current_l2: f64,
    pub current_l3: f64,
    pub current_n: f64,
    pub active_power: f64,
    pub cos_phi: f64,
    pub kwh_import: f64,
    pub kwh_export: f64,
}

impl MeterRecord {
    /// Numeric fields paired with their column names, in column order.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 10] {
        [
            (columns::CONTRACTED_POWER, self.contracted_power),
            (columns::VOLTAGE_L1, self.voltage_l1),
            (columns::CURRENT_L1, self.current_l1),
            (columns::CURRENT_L2, self.current_l2),
            (columns::CURRENT_L3, self.current_l3),
            (columns::CURRENT_N, self.current_n),
            (columns::ACTIVE_POWER, self.active_power),
            (columns::COS_PHI, self.cos_phi),
            (columns::KWH_IMPORT, self.kwh_import),
            (columns::KWH_EXPORT, self.kwh_export),
        ]
    }

    /// Identifier used in error messages.
    pub fn label(&self) -> String {
        if self.customer_id.trim().is_empty() {
            "<no IDPEL>".to_string()
        } else {
            self.customer_id.clone()
        }
    }

    /// Fails on the first numeric field that carries no usable value.
    ///
    /// NaN is how a blank spreadsheet cell usually arrives in memory, so it is
    /// reported as missing; infinities are reported as invalid.
    pub fn ensure_complete(&self) -> Result<(), RecordError> {
        for (field, value) in self.numeric_fields() {
            if value.is_nan() {
                return Err(RecordError::MissingField {
                    record: self.label(),
                    field,
                });
            }
            if value.is_infinite() {
                return Err(RecordError::InvalidField {
                    record: self.label(),
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
