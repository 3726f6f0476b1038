use std::{fs::File, io, path::Path};

use amr_client::{domain::columns, Indicator, RankedResult, ScoredRecord};

use crate::pipeline::PipelineError;

pub const INDICATOR_COUNT_COLUMN: &str = "jumlah_potensi";
pub const WEIGHTED_SCORE_COLUMN: &str = "bobot";

/// Marker written for a raised indicator; cleared indicators stay empty.
pub const DEFAULT_CHECKED_MARKER: &str = "✅";

/// Export columns: customer identity, one column per indicator, then totals.
pub fn header() -> Vec<&'static str> {
    let mut cols = vec![
        columns::CUSTOMER_ID,
        columns::CUSTOMER_NAME,
        columns::TARIFF,
        columns::CONTRACTED_POWER,
    ];
    cols.extend(Indicator::ALL.iter().map(|i| i.column_name()));
    cols.push(INDICATOR_COUNT_COLUMN);
    cols.push(WEIGHTED_SCORE_COLUMN);
    cols
}

fn render_check(hit: bool, checked_marker: &str) -> &str {
    if hit {
        checked_marker
    } else {
        ""
    }
}

pub fn encode_row(scored: &ScoredRecord, checked_marker: &str) -> Vec<String> {
    let r = &scored.record;
    let mut row = Vec::with_capacity(4 + Indicator::ALL.len() + 2);
    row.push(r.customer_id.clone());
    row.push(r.customer_name.clone());
    row.push(r.tariff.clone());
    row.push(r.contracted_power.to_string());
    for (_, hit) in scored.indicators.iter() {
        row.push(render_check(hit, checked_marker).to_string());
    }
    row.push(scored.indicator_count.to_string());
    row.push(scored.weighted_score.to_string());
    row
}

/// Write the header and one row per target, returning the inner writer.
pub fn write_targets<W: io::Write>(
    writer: W,
    ranked: &RankedResult,
    checked_marker: &str,
) -> Result<W, PipelineError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header())
        .map_err(|e| PipelineError::Sink(format!("failed to write export header: {e}")))?;

    for scored in ranked {
        wtr.write_record(encode_row(scored, checked_marker)).map_err(|e| {
            PipelineError::Sink(format!(
                "failed to write export row for {}: {e}",
                scored.record.customer_id
            ))
        })?;
    }

    wtr.into_inner()
        .map_err(|e| PipelineError::Sink(format!("failed to flush export: {}", e.error())))
}

pub fn write_targets_to_path(path: &Path, ranked: &RankedResult, checked_marker: &str) -> Result<(), PipelineError> {
    let file = File::create(path)
        .map_err(|e| PipelineError::Sink(format!("failed to create export file {}: {e}", path.display())))?;
    write_targets(file, ranked, checked_marker)?;
    Ok(())
}
