use crate::domain::{RankedResult, Score, ScoredRecord, SelectionCriteria};

/// Whether a score meets both minimums of the criteria.
pub fn qualifies(score: &Score, criteria: &SelectionCriteria) -> bool {
    u32::from(score.indicator_count) >= criteria.min_indicator_count
        && score.weighted_score >= criteria.min_weighted_score
}

/// Keep qualifying records, order them by weighted score and cut at `top_n`.
///
/// `qualifies` is recomputed from `criteria` for every record, so a batch
/// scored once can be re-ranked under different criteria. The sort is stable,
/// so equal scores keep their input order.
pub fn select(scored: Vec<ScoredRecord>, criteria: &SelectionCriteria) -> RankedResult {
    let evaluated = scored.len();

    let mut targets: Vec<ScoredRecord> = scored
        .into_iter()
        .map(|mut s| {
            s.qualifies = qualifies(&s.score(), criteria);
            s
        })
        .filter(|s| s.qualifies)
        .collect();
    let qualified = targets.len();

    targets.sort_by(|a, b| b.weighted_score.cmp(&a.weighted_score));
    targets.truncate(criteria.top_n);

    RankedResult {
        targets,
        evaluated,
        qualified,
    }
}
