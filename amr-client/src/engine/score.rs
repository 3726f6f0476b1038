use crate::domain::{IndicatorSet, Score};

/// Points contributed by each raised indicator. All indicators weigh the same.
pub const INDICATOR_WEIGHT: u32 = 5;

pub fn aggregate(indicators: &IndicatorSet) -> Score {
    let indicator_count = indicators.count();
    Score {
        indicator_count,
        weighted_score: u32::from(indicator_count) * INDICATOR_WEIGHT,
    }
}
