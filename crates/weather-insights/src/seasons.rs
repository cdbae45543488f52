//! Seasonal grouping of observations.
//!
//! Each record is assigned a [`Season`] from the calendar month of its
//! timestamp through an explicit [`SeasonMap`], and mean/median/std are
//! computed per season for every numeric column.

use crate::error::{PipelineError, Result};
use crate::types::{CleanDataset, GroupedStatistics, Statistic};
use chrono::Datelike;
use polars::prelude::IdxSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Statistics computed for each season.
pub const SEASONAL_STATISTICS: [Statistic; 3] =
    [Statistic::Mean, Statistic::Median, Statistic::Std];

/// One of the four fixed seasonal labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Canonical presentation order.
    pub const ALL: [Season; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Autumn];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Month → season lookup table covering all twelve months.
///
/// Serialized as a JSON object keyed by month number:
///
/// ```json
/// { "1": "Winter", "2": "Winter", "3": "Spring", ... "12": "Winter" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u32, Season>", into = "BTreeMap<u32, Season>")]
pub struct SeasonMap {
    months: [Season; 12],
}

impl Default for SeasonMap {
    /// Northern-hemisphere meteorological seasons.
    fn default() -> Self {
        use Season::*;
        Self {
            months: [
                Winter, Winter, Spring, Spring, Spring, Summer, Summer, Summer, Autumn, Autumn,
                Autumn, Winter,
            ],
        }
    }
}

impl SeasonMap {
    /// Season for a calendar month (1 = January). `None` outside 1..=12.
    pub fn season_of(&self, month: u32) -> Option<Season> {
        if (1..=12).contains(&month) {
            Some(self.months[(month - 1) as usize])
        } else {
            None
        }
    }

    /// Load a table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Configuration(format!(
                "cannot read season map '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PipelineError::Configuration(format!("invalid season map: {}", e)))
    }
}

impl TryFrom<BTreeMap<u32, Season>> for SeasonMap {
    type Error = String;

    fn try_from(table: BTreeMap<u32, Season>) -> std::result::Result<Self, Self::Error> {
        if let Some(month) = table.keys().find(|m| !(1..=12).contains(*m)) {
            return Err(format!("month {} is outside 1..=12", month));
        }
        let mut months = [Season::Winter; 12];
        for (slot, month) in months.iter_mut().zip(1u32..=12) {
            *slot = *table
                .get(&month)
                .ok_or_else(|| format!("month {} has no season", month))?;
        }
        Ok(Self { months })
    }
}

impl From<SeasonMap> for BTreeMap<u32, Season> {
    fn from(map: SeasonMap) -> Self {
        (1u32..=12).zip(map.months).collect()
    }
}

/// Seasonal aggregate: one group per season present in the data, in
/// canonical order.
pub type SeasonalAggregate = GroupedStatistics<Season>;

/// Groups cleaned records by season and computes per-season statistics.
#[derive(Debug, Clone, Default)]
pub struct SeasonalAggregator {
    map: SeasonMap,
}

impl SeasonalAggregator {
    pub fn new(map: SeasonMap) -> Self {
        Self { map }
    }

    pub fn season_map(&self) -> &SeasonMap {
        &self.map
    }

    /// Aggregate `data` by season.
    pub fn aggregate(&self, data: &CleanDataset) -> Result<SeasonalAggregate> {
        let mut members: BTreeMap<Season, Vec<IdxSize>> = BTreeMap::new();
        for (row, ts) in data.timestamps().iter().enumerate() {
            // month() is always 1..=12
            if let Some(season) = self.map.season_of(ts.month()) {
                members.entry(season).or_default().push(row as IdxSize);
            }
        }

        let groups: Vec<(Season, Vec<IdxSize>)> = Season::ALL
            .iter()
            .filter_map(|s| members.remove(s).map(|rows| (*s, rows)))
            .collect();

        for (season, rows) in &groups {
            debug!("{}: {} records", season, rows.len());
        }

        let columns = data
            .numeric_columns()
            .iter()
            .map(|c| data.numeric_series(c))
            .collect::<Result<Vec<_>>>()?;

        let aggregate = GroupedStatistics::compute(groups, &columns, &SEASONAL_STATISTICS)?;
        info!(
            "Seasonal aggregation: {} seasons x {} columns",
            aggregate.len(),
            columns.len()
        );
        Ok(aggregate)
    }
}
