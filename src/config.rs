use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Header of the administrative-region column in the monthly export.
pub const DEFAULT_REGION_COLUMN: &str = "행정구역";
/// Segment that marks a "total" (both sexes) column.
pub const DEFAULT_CATEGORY_MARKER: &str = "계";
/// Suffix that marks a single-year age column.
pub const DEFAULT_AGE_UNIT_MARKER: &str = "세";
/// Marker of the open-ended top age bucket.
pub const DEFAULT_AND_ABOVE_MARKER: &str = "이상";
/// Age assigned to the open-ended top bucket.
pub const DEFAULT_CEILING_AGE: u32 = 100;

/// Text encoding used to decode delimited sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    /// UTF-8 when the bytes are valid UTF-8, EUC-KR otherwise.
    #[default]
    Auto,
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    EucKr,
    Cp949,
}

/// Rules that decide which headers are per-age columns and which age they carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeColumnRules {
    pub segment_delimiter: char,
    /// When set, one delimited segment of the header must equal this marker.
    /// `None` accepts every header carrying an age marker.
    pub category_marker: Option<String>,
    pub age_unit_marker: String,
    pub and_above_marker: String,
    pub ceiling_age: u32,
}

impl Default for AgeColumnRules {
    fn default() -> Self {
        Self {
            segment_delimiter: '_',
            category_marker: Some(DEFAULT_CATEGORY_MARKER.to_string()),
            age_unit_marker: DEFAULT_AGE_UNIT_MARKER.to_string(),
            and_above_marker: DEFAULT_AND_ABOVE_MARKER.to_string(),
            ceiling_age: DEFAULT_CEILING_AGE,
        }
    }
}

impl AgeColumnRules {
    /// Rules with the given category marker and Korean age markers.
    pub fn with_category(marker: impl Into<String>) -> Self {
        Self {
            category_marker: Some(marker.into()),
            ..Self::default()
        }
    }

    /// Rules that skip the category check.
    pub fn lenient() -> Self {
        Self {
            category_marker: None,
            ..Self::default()
        }
    }
}

/// Settings shared by loading, resolution and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub region_column: String,
    pub encoding: SourceEncoding,
    pub delimiter: char,
    pub age_rules: AgeColumnRules,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            region_column: DEFAULT_REGION_COLUMN.to_string(),
            encoding: SourceEncoding::Auto,
            delimiter: ',',
            age_rules: AgeColumnRules::default(),
        }
    }
}

impl DashboardConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: DashboardConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.region_column.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(
                "region_column must not be empty".into(),
            ));
        }
        let rules = &self.age_rules;
        if rules.age_unit_marker.is_empty() || rules.and_above_marker.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "age markers must not be empty".into(),
            ));
        }
        if matches!(&rules.category_marker, Some(marker) if marker.is_empty()) {
            return Err(DashboardError::InvalidConfig(
                "category_marker must be null or non-empty".into(),
            ));
        }
        Ok(())
    }

    /// The field delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(DashboardError::InvalidConfig(format!(
                "delimiter '{}' is not a single-byte character",
                self.delimiter
            )))
        }
    }
}
