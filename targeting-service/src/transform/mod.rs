use crate::pipeline::{Envelope, PipelineError, Transform};
use amr_client::{domain::columns, MeterRecord, RecordError};

/// Pure validation of a `MeterRecord`.
///
/// Rules:
/// - every numeric reading must be present and finite.
/// - cos-phi must lie within [-1, 1].
pub fn validate_meter_record(env: Envelope<MeterRecord>) -> Result<Envelope<MeterRecord>, PipelineError> {
    let m = &env.payload;

    m.ensure_complete()?;

    if !(-1.0..=1.0).contains(&m.cos_phi) {
        return Err(RecordError::InvalidField {
            record: m.label(),
            field: columns::COS_PHI,
            value: m.cos_phi.to_string(),
        }
        .into());
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct MeterRecordValidation;

#[async_trait::async_trait]
impl Transform<MeterRecord, MeterRecord> for MeterRecordValidation {
    async fn apply(&self, input: Envelope<MeterRecord>) -> Result<Envelope<MeterRecord>, PipelineError> {
        match validate_meter_record(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_meter_record_rejected_total").increment(1);
                tracing::warn!(error = %e, "meter record rejected");
                Err(e)
            }
        }
    }
}
