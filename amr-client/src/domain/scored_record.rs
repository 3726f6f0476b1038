use crate::domain::{IndicatorSet, MeterRecord};

/// Indicator count and the severity score derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Score {
    pub indicator_count: u8,
    pub weighted_score: u32,
}

/// A meter record together with its indicator outcome and selection verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: MeterRecord,
    pub indicators: IndicatorSet,
    pub indicator_count: u8,
    pub weighted_score: u32,
    pub qualifies: bool,
}

impl ScoredRecord {
    pub fn score(&self) -> Score {
        Score {
            indicator_count: self.indicator_count,
            weighted_score: self.weighted_score,
        }
    }
}

/// Inspection targets ordered by weighted score, highest first.
///
/// Records with equal scores keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult {
    pub targets: Vec<ScoredRecord>,
    /// Records scored in the run.
    pub evaluated: usize,
    /// Records that met the criteria, before truncation to `top_n`.
    pub qualified: usize,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.targets.iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}
