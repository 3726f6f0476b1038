pub mod domain;
pub mod engine;

pub use domain::{
    ConfigError, Indicator, IndicatorSet, MeterRecord, RankedResult, RecordError, Score,
    ScoredRecord, SelectionCriteria, ThresholdConfig,
};
pub use engine::TargetEngine;
