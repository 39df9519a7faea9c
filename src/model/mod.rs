use serde::{Deserialize, Serialize};

/// Header of the age column in tabular exports.
pub const AGE_HEADER: &str = "연령";

/// One data row of a population table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Region description as it appears in the source, e.g. `서울특별시  (1100000000)`.
    pub label: String,
    /// Raw cell text in header order, the label cell included.
    pub cells: Vec<String>,
}

impl RawRow {
    /// Cell text at `index`, or `""` for a short row.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A table as loaded from the source, before any numeric conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Trimmed header names.
    pub headers: Vec<String>,
    /// Position of the administrative-region column in `headers`.
    pub region_index: usize,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Header plus the first `limit` rows, for display next to a chart.
    pub fn preview(&self, limit: usize) -> (&[String], &[RawRow]) {
        let end = limit.min(self.rows.len());
        (&self.headers, &self.rows[..end])
    }
}

/// A header recognised as a per-age count, with the age it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeColumn {
    pub index: usize,
    pub name: String,
    pub age: u32,
}

/// Summed counts for one region, aligned with [`AggregatedSeries::ages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub region: String,
    pub counts: Vec<u64>,
}

/// Per-age totals for a set of selected regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedSeries {
    /// Ascending age axis.
    pub ages: Vec<u32>,
    /// One entry per selected region, in selection order.
    pub regions: Vec<RegionSeries>,
}

impl AggregatedSeries {
    pub fn region(&self, key: &str) -> Option<&RegionSeries> {
        self.regions.iter().find(|series| series.region == key)
    }

    /// Count for `key` at `age`, if both exist.
    pub fn count(&self, key: &str, age: u32) -> Option<u64> {
        let position = self.ages.iter().position(|candidate| *candidate == age)?;
        self.region(key)
            .and_then(|series| series.counts.get(position).copied())
    }

    /// Tab-separated table: a header of region keys, then one row per age.
    pub fn to_tsv(&self) -> String {
        let mut out = String::from(AGE_HEADER);
        for region in &self.regions {
            out.push('\t');
            out.push_str(&region.region);
        }
        out.push('\n');
        for (position, age) in self.ages.iter().enumerate() {
            out.push_str(&age.to_string());
            for region in &self.regions {
                let count = region.counts.get(position).copied().unwrap_or_default();
                out.push('\t');
                out.push_str(&count.to_string());
            }
            out.push('\n');
        }
        out
    }
}
