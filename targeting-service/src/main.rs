use amr_client::{MeterRecord, TargetEngine};
use anyhow::{bail, Result};
use std::{env, path::PathBuf, sync::Arc};
use targeting_service::{
    config::AppConfig,
    metrics_export, observability,
    pipeline::Pipeline,
    sinks::TargetListSink,
    sources::MeterRecordSource,
    transform,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        bail!(
            "usage: p2tl-targeting <instant.(csv|ndjson|jsonl)> [output.csv]\n\
             config: $P2TL_CONFIG (must exist) or ./p2tl-config.toml (defaults if absent)"
        );
    }
    let input_path = PathBuf::from(&args[1]);

    // Load configuration
    let mut cfg = AppConfig::load()?;
    if let Some(output) = args.get(2) {
        cfg.export.path = PathBuf::from(output);
    }

    if cfg.metrics.is_some() {
        metrics_export::init()?;
    }

    let engine = TargetEngine::new(cfg.thresholds, cfg.criteria)?;

    let thresholds = engine.thresholds();
    if thresholds.voltage_window_inverted() {
        tracing::warn!(
            voltage_drop_threshold = thresholds.voltage_drop_threshold,
            over_voltage_threshold = thresholds.over_voltage_threshold,
            "voltage drop threshold is above over-voltage threshold; readings in between raise both"
        );
    }

    let criteria = engine.criteria();
    tracing::info!(
        input = %input_path.display(),
        min_indicator_count = criteria.min_indicator_count,
        min_weighted_score = criteria.min_weighted_score,
        top_n = criteria.top_n,
        "starting target selection"
    );

    let Some(source) = MeterRecordSource::from_path(&input_path) else {
        bail!(
            "unsupported input file {}: expected .csv, .ndjson or .jsonl",
            input_path.display()
        );
    };

    let pipeline: Pipeline<_, MeterRecord, _> = Pipeline {
        source,
        transforms: vec![Arc::new(transform::MeterRecordValidation::default())],
        sink: TargetListSink::new(engine, cfg.export.path, cfg.export.checked_marker),
    };

    let outcome = pipeline.run().await;

    // Failed runs still publish their rejection counters.
    if let Some(metrics_cfg) = &cfg.metrics {
        if let Err(e) = metrics_export::write_textfile(&metrics_cfg.textfile_path) {
            tracing::error!(error = %e, "failed to write metrics textfile");
        }
    }

    outcome?;
    Ok(())
}
