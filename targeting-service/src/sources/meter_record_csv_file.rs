use std::{fs::File, path::PathBuf};

use amr_client::{domain::columns, MeterRecord, RecordError};
use csv::StringRecord;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};
use crate::sources::{parse_required_f64, row_label};

/// CSV source for `MeterRecord`, one AMR instant reading per row.
///
/// Expected header columns (by name, extra columns are ignored):
/// - IDPEL, NAMA, TARIF
/// - DAYA
/// - VOLTAGE_L1
/// - CURRENT_L1, CURRENT_L2, CURRENT_L3, CURRENT_N
/// - ACTIVE_POWER, COS_PHI
/// - KWH_IMP, KWH_EXP
pub struct MeterRecordCsvFileSource {
    path: PathBuf,
}

impl MeterRecordCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn record_to_meter_record(
    record: &StringRecord,
    headers: &StringRecord,
    row: u64,
) -> Result<MeterRecord, RecordError> {
    let get = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
    };

    let customer_id = get(columns::CUSTOMER_ID).map(str::trim).unwrap_or("");
    let label = row_label(customer_id, row);
    if customer_id.is_empty() {
        return Err(RecordError::MissingField {
            record: label,
            field: columns::CUSTOMER_ID,
        });
    }

    let text = |field: &'static str| -> Result<String, RecordError> {
        get(field)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| RecordError::MissingField {
                record: label.clone(),
                field,
            })
    };
    let number = |field: &'static str| parse_required_f64(get(field), field, &label);

    Ok(MeterRecord {
        customer_id: customer_id.to_string(),
        customer_name: text(columns::CUSTOMER_NAME)?,
        tariff: text(columns::TARIFF)?,
        contracted_power: number(columns::CONTRACTED_POWER)?,
        voltage_l1: number(columns::VOLTAGE_L1)?,
        current_l1: number(columns::CURRENT_L1)?,
        current_l2: number(columns::CURRENT_L2)?,
        current_l3: number(columns::CURRENT_L3)?,
        current_n: number(columns::CURRENT_N)?,
        active_power: number(columns::ACTIVE_POWER)?,
        cos_phi: number(columns::COS_PHI)?,
        kwh_import: number(columns::KWH_IMPORT)?,
        kwh_export: number(columns::KWH_EXPORT)?,
    })
}

#[async_trait::async_trait]
impl Source<MeterRecord> for MeterRecordCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<MeterRecord> {
        // Blocking CSV reader inside a single async task; uploads are one
        // dataset in size.
        let path = self.path.clone();
        let s = async_stream::try_stream! {
            let file = File::open(&path)
                .map_err(|e| PipelineError::Source(format!("failed to open CSV file {}: {e}", path.display())))?;
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                .clone();

            let mut row: u64 = 0;
            for result in rdr.records() {
                row += 1;
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV record {row}: {e}"
                )))?;

                let meter_record = match record_to_meter_record(&record, &headers, row) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("meter_record_csv_parse_errors_total").increment(1);
                        Err(PipelineError::from(e))?
                    }
                };

                yield Envelope {
                    payload: meter_record,
                    position: row,
                };
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    const HEADER: &str =
        "IDPEL,NAMA,TARIF,DAYA,VOLTAGE_L1,CURRENT_L1,CURRENT_L2,CURRENT_L3,CURRENT_N,ACTIVE_POWER,COS_PHI,KWH_IMP,KWH_EXP";

    fn headers() -> StringRecord {
        StringRecord::from(HEADER.split(',').collect::<Vec<_>>())
    }

    fn row(line: &str) -> StringRecord {
        StringRecord::from(line.split(',').collect::<Vec<_>>())
    }

    #[test]
    fn parses_complete_row() {
        let r = record_to_meter_record(
            &row("512000000001,TOKO A,B2,23000,57.5,1.2,1.1,1.0,0.2,3.4,0.85,100.5,0"),
            &headers(),
            1,
        )
        .unwrap();

        assert_eq!(r.customer_id, "512000000001");
        assert_eq!(r.customer_name, "TOKO A");
        assert_eq!(r.tariff, "B2");
        assert_eq!(r.contracted_power, 23000.0);
        assert_eq!(r.voltage_l1, 57.5);
        assert_eq!(r.current_n, 0.2);
        assert_eq!(r.cos_phi, 0.85);
        assert_eq!(r.kwh_import, 100.5);
        assert_eq!(r.kwh_export, 0.0);
    }

    #[test]
    fn blank_numeric_cell_is_missing_not_zero() {
        let err = record_to_meter_record(
            &row("512000000001,TOKO A,B2,23000,57.5,,1.1,1.0,0.2,0,0.85,100.5,0"),
            &headers(),
            1,
        )
        .unwrap_err();

        assert_eq!(
            err,
            RecordError::MissingField {
                record: "512000000001".to_string(),
                field: columns::CURRENT_L1,
            }
        );
    }

    #[test]
    fn absent_column_is_missing() {
        let headers = StringRecord::from(vec!["IDPEL", "NAMA", "TARIF", "DAYA"]);
        let err = record_to_meter_record(&row("512000000001,TOKO A,B2,23000"), &headers, 1).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { field: columns::VOLTAGE_L1, .. }));
    }

    #[test]
    fn unparsable_number_is_invalid() {
        let err = record_to_meter_record(
            &row("512000000001,TOKO A,B2,23000,abc,1.2,1.1,1.0,0.2,3.4,0.85,100.5,0"),
            &headers(),
            1,
        )
        .unwrap_err();

        assert_eq!(
            err,
            RecordError::InvalidField {
                record: "512000000001".to_string(),
                field: columns::VOLTAGE_L1,
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn blank_customer_id_is_reported_by_row() {
        let err = record_to_meter_record(
            &row(",TOKO A,B2,23000,57.5,1.2,1.1,1.0,0.2,3.4,0.85,100.5,0"),
            &headers(),
            7,
        )
        .unwrap_err();

        assert_eq!(
            err,
            RecordError::MissingField {
                record: "row 7".to_string(),
                field: columns::CUSTOMER_ID,
            }
        );
    }

    #[tokio::test]
    async fn streams_rows_from_file_with_positions() {
        let path = std::env::temp_dir().join(format!("p2tl-csv-source-{}.csv", std::process::id()));
        let contents = format!(
            "{HEADER},EXTRA\n\
             512000000001, TOKO A ,B2,23000,57.5,1.2,1.1,1.0,0.2,3.4,0.85,100.5,0,x\n\
             512000000002,TOKO B,R1,1300,50,0.4,0.4,0.4,0,0,0.2,5,1,y\n"
        );
        std::fs::write(&path, contents).unwrap();

        let source = MeterRecordCsvFileSource::new(&path);
        let items: Vec<_> = source.stream().await.collect().await;
        std::fs::remove_file(&path).unwrap();

        assert_eq!(items.len(), 2);
        let second = items[1].as_ref().unwrap();
        assert_eq!(second.position, 2);
        assert_eq!(second.payload.customer_id, "512000000002");
        let first = items[0].as_ref().unwrap();
        assert_eq!(first.payload.customer_name, "TOKO A");
    }

    #[tokio::test]
    async fn missing_file_is_source_error() {
        let source = MeterRecordCsvFileSource::new("/nonexistent/p2tl/instant.csv");
        let items: Vec<_> = source.stream().await.collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(PipelineError::Source(_))));
    }
}
