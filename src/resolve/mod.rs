//! Header and label interpretation: which columns hold per-age counts, and
//! which region a row belongs to. Nothing here touches IO.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::config::AgeColumnRules;
use crate::error::{DashboardError, Result};
use crate::model::{AgeColumn, RawTable};

/// Picks the per-age total columns out of `column_names`, in input order.
///
/// A column qualifies when its name ends with the age-unit marker or
/// contains the and-above marker, and (if the rules carry a category
/// marker) one of its delimited segments equals that marker. The age is the
/// first digit run of the last segment; a segment without digits is the
/// and-above bucket and maps to the ceiling age.
#[instrument(level = "debug", skip_all, fields(column_count = column_names.len()))]
pub fn resolve_age_columns<S: AsRef<str>>(
    column_names: &[S],
    rules: &AgeColumnRules,
) -> Result<Vec<AgeColumn>> {
    let mut resolved = Vec::new();
    let mut seen: HashMap<u32, usize> = HashMap::new();

    for (index, raw) in column_names.iter().enumerate() {
        let name = raw.as_ref().trim();
        if !is_age_column(name, rules) {
            continue;
        }

        let age = extract_age(name, rules);
        if age > rules.ceiling_age {
            return Err(DashboardError::AgeOutOfRange {
                column: name.to_string(),
                age,
                ceiling: rules.ceiling_age,
            });
        }
        if let Some(&previous) = seen.get(&age) {
            let first: &AgeColumn = &resolved[previous];
            return Err(DashboardError::DuplicateAge {
                age,
                first: first.name.clone(),
                second: name.to_string(),
            });
        }

        seen.insert(age, resolved.len());
        resolved.push(AgeColumn {
            index,
            name: name.to_string(),
            age,
        });
    }

    if resolved.is_empty() {
        return Err(DashboardError::NoAgeColumnsFound {
            column_count: column_names.len(),
        });
    }

    let missing = missing_ages(&resolved, rules.ceiling_age);
    if !missing.is_empty() {
        warn!(missing = ?missing, "age axis has gaps");
    }
    debug!(age_columns = resolved.len(), "resolved age columns");
    Ok(resolved)
}

fn is_age_column(name: &str, rules: &AgeColumnRules) -> bool {
    let has_age_marker =
        name.ends_with(&rules.age_unit_marker) || name.contains(&rules.and_above_marker);
    if !has_age_marker {
        return false;
    }
    match &rules.category_marker {
        Some(marker) => name
            .split(rules.segment_delimiter)
            .any(|segment| segment.trim() == marker.as_str()),
        None => true,
    }
}

fn extract_age(name: &str, rules: &AgeColumnRules) -> u32 {
    let segment = name.rsplit(rules.segment_delimiter).next().unwrap_or(name);
    let digits: String = segment
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return rules.ceiling_age;
    }
    // Digit runs too long for u32 are certainly past the ceiling.
    digits.parse().unwrap_or(u32::MAX)
}

/// Ages in `0..=ceiling` that no column covers.
pub fn missing_ages(columns: &[AgeColumn], ceiling: u32) -> Vec<u32> {
    let present: HashSet<u32> = columns.iter().map(|column| column.age).collect();
    (0..=ceiling).filter(|age| !present.contains(age)).collect()
}

/// Normalises a region label by dropping everything from the first `(`.
///
/// `"Seoul(11)"` and `"  Seoul (11)  "` both yield `"Seoul"`; a label
/// without a parenthesis is returned trimmed.
pub fn extract_region_key(label: &str) -> &str {
    match label.split_once('(') {
        Some((prefix, _)) => prefix.trim(),
        None => label.trim(),
    }
}

/// Distinct region keys in order of first appearance.
pub fn list_region_keys(table: &RawTable) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .rows
        .iter()
        .map(|row| extract_region_key(&row.label))
        .filter(|key| seen.insert(*key))
        .map(str::to_string)
        .collect()
}
