pub mod meter_record_csv_file;
pub mod meter_record_ndjson_file;

pub use meter_record_csv_file::MeterRecordCsvFileSource;
pub use meter_record_ndjson_file::MeterRecordNdjsonFileSource;

use std::path::Path;

use amr_client::{MeterRecord, RecordError};

use crate::pipeline::{EnvelopeStream, Source};

/// File source picked from the upload's extension.
pub enum MeterRecordSource {
    Csv(MeterRecordCsvFileSource),
    Ndjson(MeterRecordNdjsonFileSource),
}

impl MeterRecordSource {
    /// `.csv` reads as CSV, `.ndjson` / `.jsonl` as one JSON object per line.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv(MeterRecordCsvFileSource::new(path))),
            "ndjson" | "jsonl" => Some(Self::Ndjson(MeterRecordNdjsonFileSource::new(path))),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl Source<MeterRecord> for MeterRecordSource {
    async fn stream(&self) -> EnvelopeStream<MeterRecord> {
        match self {
            Self::Csv(s) => s.stream().await,
            Self::Ndjson(s) => s.stream().await,
        }
    }
}

/// Customer ID when present, otherwise the record's position in the file.
pub(crate) fn row_label(customer_id: &str, row: u64) -> String {
    if customer_id.is_empty() {
        format!("row {row}")
    } else {
        customer_id.to_string()
    }
}

/// Blank cells and NaN are missing; a missing reading is never read as zero.
pub(crate) fn parse_required_f64(raw: Option<&str>, field: &'static str, label: &str) -> Result<f64, RecordError> {
    let missing = || RecordError::MissingField {
        record: label.to_string(),
        field,
    };

    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let value: f64 = raw.parse().map_err(|_| RecordError::InvalidField {
        record: label.to_string(),
        field,
        value: raw.to_string(),
    })?;

    if value.is_nan() {
        return Err(missing());
    }
    Ok(value)
}
