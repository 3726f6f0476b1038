mod evaluate;
pub mod score;
pub mod select;

pub(crate) use evaluate::evaluate;
pub use score::{aggregate, INDICATOR_WEIGHT};
pub use select::{qualifies, select};

use rayon::prelude::*;

use crate::domain::{
    ConfigError, MeterRecord, RankedResult, RecordError, ScoredRecord, SelectionCriteria, ThresholdConfig,
};

/// Scoring engine bound to one validated set of thresholds and criteria.
///
/// Holds no state between calls; records are scored independently and the
/// only point that needs the whole batch is [`TargetEngine::rank`].
#[derive(Debug, Clone)]
pub struct TargetEngine {
    thresholds: ThresholdConfig,
    criteria: SelectionCriteria,
}

impl TargetEngine {
    pub fn new(thresholds: ThresholdConfig, criteria: SelectionCriteria) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        criteria.validate()?;
        Ok(Self { thresholds, criteria })
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    pub fn score(&self, record: MeterRecord) -> Result<ScoredRecord, RecordError> {
        let indicators = evaluate(&record, &self.thresholds)?;
        let score = aggregate(&indicators);
        Ok(ScoredRecord {
            record,
            indicators,
            indicator_count: score.indicator_count,
            weighted_score: score.weighted_score,
            qualifies: qualifies(&score, &self.criteria),
        })
    }

    /// Score a batch in parallel. Output order matches input order, and on
    /// failure the error of the earliest bad record is returned.
    pub fn score_all(&self, records: Vec<MeterRecord>) -> Result<Vec<ScoredRecord>, RecordError> {
        let outcomes: Vec<Result<ScoredRecord, RecordError>> =
            records.into_par_iter().map(|r| self.score(r)).collect();
        outcomes.into_iter().collect()
    }

    pub fn rank(&self, scored: Vec<ScoredRecord>) -> RankedResult {
        select(scored, &self.criteria)
    }

    pub fn run(&self, records: Vec<MeterRecord>) -> Result<RankedResult, RecordError> {
        let scored = self.score_all(records)?;
        Ok(self.rank(scored))
    }
}
