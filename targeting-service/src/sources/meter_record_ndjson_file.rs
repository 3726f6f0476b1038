use std::path::PathBuf;

use amr_client::{domain::columns, MeterRecord, RecordError};
use async_stream::try_stream;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};
use crate::sources::{parse_required_f64, row_label};

/// NDJSON source for `MeterRecord`.
///
/// Each non-blank line is a JSON object keyed by the same column names as the
/// CSV export (IDPEL, NAMA, ..., KWH_EXP). Values may be JSON numbers or
/// numeric strings; `null` or an absent key is a missing field.
pub struct MeterRecordNdjsonFileSource {
    path: PathBuf,
}

impl MeterRecordNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(serde::Deserialize, Debug)]
struct NdjsonMeterRecord {
    #[serde(rename = "IDPEL")]
    customer_id: Option<Cell>,
    #[serde(rename = "NAMA")]
    customer_name: Option<Cell>,
    #[serde(rename = "TARIF")]
    tariff: Option<Cell>,
    #[serde(rename = "DAYA")]
    contracted_power: Option<Cell>,
    #[serde(rename = "VOLTAGE_L1")]
    voltage_l1: Option<Cell>,
    #[serde(rename = "CURRENT_L1")]
    current_l1: Option<Cell>,
    #[serde(rename = "CURRENT_L2")]
    current_l2: Option<Cell>,
    #[serde(rename = "CURRENT_L3")]
    current_l3: Option<Cell>,
    #[serde(rename = "CURRENT_N")]
    current_n: Option<Cell>,
    #[serde(rename = "ACTIVE_POWER")]
    active_power: Option<Cell>,
    #[serde(rename = "COS_PHI")]
    cos_phi: Option<Cell>,
    #[serde(rename = "KWH_IMP")]
    kwh_import: Option<Cell>,
    #[serde(rename = "KWH_EXP")]
    kwh_export: Option<Cell>,
}

impl NdjsonMeterRecord {
    fn into_meter_record(self, line: u64) -> Result<MeterRecord, RecordError> {
        let customer_id = self.customer_id.as_ref().map(Cell::as_text).unwrap_or_default();
        let label = row_label(&customer_id, line);
        if customer_id.is_empty() {
            return Err(RecordError::MissingField {
                record: label,
                field: columns::CUSTOMER_ID,
            });
        }

        let text = |cell: Option<Cell>, field: &'static str| -> Result<String, RecordError> {
            cell.map(|c| c.as_text()).ok_or_else(|| RecordError::MissingField {
                record: label.clone(),
                field,
            })
        };
        let number = |cell: Option<Cell>, field: &'static str| -> Result<f64, RecordError> {
            match cell {
                Some(Cell::Number(n)) => Ok(n),
                Some(Cell::Text(s)) => parse_required_f64(Some(s.as_str()), field, &label),
                None => parse_required_f64(None, field, &label),
            }
        };

        Ok(MeterRecord {
            customer_name: text(self.customer_name, columns::CUSTOMER_NAME)?,
            tariff: text(self.tariff, columns::TARIFF)?,
            contracted_power: number(self.contracted_power, columns::CONTRACTED_POWER)?,
            voltage_l1: number(self.voltage_l1, columns::VOLTAGE_L1)?,
            current_l1: number(self.current_l1, columns::CURRENT_L1)?,
            current_l2: number(self.current_l2, columns::CURRENT_L2)?,
            current_l3: number(self.current_l3, columns::CURRENT_L3)?,
            current_n: number(self.current_n, columns::CURRENT_N)?,
            active_power: number(self.active_power, columns::ACTIVE_POWER)?,
            cos_phi: number(self.cos_phi, columns::COS_PHI)?,
            kwh_import: number(self.kwh_import, columns::KWH_IMPORT)?,
            kwh_export: number(self.kwh_export, columns::KWH_EXPORT)?,
            customer_id,
        })
    }
}

#[async_trait::async_trait]
impl Source<MeterRecord> for MeterRecordNdjsonFileSource {
    async fn stream(&self) -> EnvelopeStream<MeterRecord> {
        let path = self.path.clone();
        let s = try_stream! {
            let file = File::open(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to open NDJSON file {}: {e}", path.display()))
            })?;
            let reader = BufReader::new(file);
            let mut lines = reader.lines();
            let mut line_no: u64 = 0;

            while let Some(line) = lines.next_line().await.map_err(|e| {
                PipelineError::Source(format!("failed to read NDJSON line: {e}"))
            })? {
                line_no += 1;
                if line.trim().is_empty() {
                    continue;
                }

                let parsed: NdjsonMeterRecord = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        metrics::counter!("meter_record_ndjson_parse_errors_total").increment(1);
                        Err(PipelineError::Source(format!(
                            "failed to parse NDJSON line {line_no}: {e}"
                        )))?
                    }
                };
                let record = match parsed.into_meter_record(line_no) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("meter_record_ndjson_parse_errors_total").increment(1);
                        Err(PipelineError::from(e))?
                    }
                };

                yield Envelope {
                    payload: record,
                    position: line_no,
                };
            }
        };

        Box::pin(s)
    }
}
