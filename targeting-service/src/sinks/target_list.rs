use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use amr_client::{Indicator, MeterRecord, RankedResult, ScoredRecord, TargetEngine};
use futures::{Stream, StreamExt};

use crate::pipeline::{Envelope, PipelineError, Sink};
use crate::sinks::csv_export;

/// Terminal sink: gathers the whole upload, scores and ranks it, then writes
/// the inspection target list.
///
/// Ranking needs every scored record, so nothing is written until the input
/// stream is exhausted. The first upstream error aborts the run; no record is
/// skipped or defaulted.
pub struct TargetListSink {
    engine: TargetEngine,
    export_path: PathBuf,
    checked_marker: String,
}

impl TargetListSink {
    pub fn new<P: Into<PathBuf>, M: Into<String>>(engine: TargetEngine, export_path: P, checked_marker: M) -> Self {
        Self {
            engine,
            export_path: export_path.into(),
            checked_marker: checked_marker.into(),
        }
    }

    async fn gather<S>(mut input: S) -> Result<Vec<MeterRecord>, PipelineError>
    where
        S: Stream<Item = Result<Envelope<MeterRecord>, PipelineError>> + Send + Unpin,
    {
        let mut records = Vec::new();
        while let Some(item) = input.next().await {
            match item {
                Ok(env) => records.push(env.payload),
                Err(e) => {
                    tracing::error!(error = %e, received = records.len(), "aborting target selection");
                    return Err(e);
                }
            }
        }
        Ok(records)
    }

    /// Score and rank everything the stream yields.
    pub async fn rank<S>(&self, input: S) -> Result<RankedResult, PipelineError>
    where
        S: Stream<Item = Result<Envelope<MeterRecord>, PipelineError>> + Send + Unpin,
    {
        let records = Self::gather(input).await?;
        let engine = self.engine.clone();
        let started = Instant::now();

        let (ranked, hits) = tokio::task::spawn_blocking(move || {
            let scored = engine.score_all(records)?;
            let hits = indicator_hits(&scored);
            Ok::<_, PipelineError>((engine.rank(scored), hits))
        })
        .await
        .map_err(|e| PipelineError::Sink(format!("scoring task failed: {e}")))??;

        record_run_metrics(&ranked, &hits, started.elapsed());
        Ok(ranked)
    }
}

fn indicator_hits(scored: &[ScoredRecord]) -> [u64; 8] {
    let mut hits = [0u64; 8];
    for s in scored {
        for (idx, (_, hit)) in s.indicators.iter().enumerate() {
            if hit {
                hits[idx] += 1;
            }
        }
    }
    hits
}

fn record_run_metrics(ranked: &RankedResult, hits: &[u64; 8], elapsed: Duration) {
    metrics::counter!("targeting_records_scored_total").increment(ranked.evaluated as u64);
    metrics::counter!("targeting_records_qualified_total").increment(ranked.qualified as u64);
    for (indicator, count) in Indicator::ALL.iter().zip(hits) {
        metrics::counter!("targeting_indicator_hits_total", "indicator" => indicator.column_name()).increment(*count);
    }
    metrics::histogram!("targeting_run_duration_seconds").record(elapsed.as_secs_f64());
}

#[async_trait::async_trait]
impl Sink<MeterRecord> for TargetListSink {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<MeterRecord>, PipelineError>> + Send + Unpin + 'static,
    {
        let ranked = self.rank(input).await?;

        if ranked.is_empty() {
            tracing::info!(evaluated = ranked.evaluated, "no targets found");
        }

        let path = self.export_path.clone();
        let marker = self.checked_marker.clone();
        let ranked = tokio::task::spawn_blocking(move || {
            csv_export::write_targets_to_path(&path, &ranked, &marker).map(|()| ranked)
        })
        .await
        .map_err(|e| PipelineError::Sink(format!("export task failed: {e}")))??;

        metrics::counter!("targeting_targets_exported_total").increment(ranked.len() as u64);
        tracing::info!(
            evaluated = ranked.evaluated,
            qualified = ranked.qualified,
            targets = ranked.len(),
            path = %self.export_path.display(),
            "target list exported"
        );
        if let Some(top) = ranked.targets.first() {
            tracing::debug!(
                customer_id = %top.record.customer_id,
                weighted_score = top.weighted_score,
                "highest ranked target"
            );
        }

        Ok(())
    }
}
