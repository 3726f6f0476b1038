pub mod error;
pub mod indicators;
pub mod meter_record;
pub mod scored_record;
pub mod thresholds;

pub use error::{ConfigError, RecordError};
pub use indicators::{Indicator, IndicatorSet};
pub use meter_record::{columns, MeterRecord};
pub use scored_record::{RankedResult, Score, ScoredRecord};
pub use thresholds::{SelectionCriteria, ThresholdConfig};
