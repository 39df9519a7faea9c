use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::error::{DashboardError, Result};
use crate::model::{AgeColumn, AggregatedSeries, RawTable, RegionSeries};
use crate::resolve::extract_region_key;

/// Sums every age column per selected region key.
///
/// All rows sharing a key contribute. The age axis is returned ascending
/// whatever the column order, and duplicate keys in `selection` collapse to
/// their first occurrence. Keys without any matching row fail the whole
/// call with [`DashboardError::UnknownRegion`].
#[instrument(level = "info", skip_all, fields(selected = selection.len(), rows = table.rows.len()))]
pub fn aggregate<S: AsRef<str>>(
    table: &RawTable,
    age_columns: &[AgeColumn],
    selection: &[S],
) -> Result<AggregatedSeries> {
    let keys = dedup_selection(selection);
    if keys.is_empty() {
        return Err(DashboardError::EmptySelection);
    }

    let mut order: Vec<&AgeColumn> = age_columns.iter().collect();
    order.sort_by_key(|column| column.age);

    let slots: HashMap<&str, usize> = keys
        .iter()
        .enumerate()
        .map(|(slot, key)| (*key, slot))
        .collect();
    let mut totals = vec![vec![0u64; order.len()]; keys.len()];
    let mut matched = vec![0usize; keys.len()];

    for row in &table.rows {
        let key = extract_region_key(&row.label);
        let Some(&slot) = slots.get(key) else {
            continue;
        };
        matched[slot] += 1;
        for (position, column) in order.iter().enumerate() {
            let count = parse_count(row.cell(column.index)).ok_or_else(|| {
                DashboardError::MalformedCount {
                    region: row.label.clone(),
                    column: column.name.clone(),
                    value: row.cell(column.index).to_string(),
                }
            })?;
            let total = &mut totals[slot][position];
            *total = total
                .checked_add(count)
                .ok_or_else(|| DashboardError::CountOverflow {
                    region: key.to_string(),
                    column: column.name.clone(),
                })?;
        }
    }

    let unknown: Vec<String> = keys
        .iter()
        .zip(&matched)
        .filter(|(_, hits)| **hits == 0)
        .map(|(key, _)| key.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(DashboardError::UnknownRegion(unknown));
    }

    debug!(matched_rows = matched.iter().sum::<usize>(), "aggregated selection");

    Ok(AggregatedSeries {
        ages: order.iter().map(|column| column.age).collect(),
        regions: keys
            .into_iter()
            .zip(totals)
            .map(|(key, counts)| RegionSeries {
                region: key.to_string(),
                counts,
            })
            .collect(),
    })
}

fn dedup_selection<S: AsRef<str>>(selection: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    selection
        .iter()
        .map(|key| key.as_ref().trim())
        .filter(|key| seen.insert(*key))
        .collect()
}

/// Parses a population cell such as `"1,234"`.
///
/// Surrounding whitespace and `,` separators are ignored; anything left
/// must be a non-empty run of ASCII digits.
pub fn parse_count(raw: &str) -> Option<u64> {
    let digits: String = raw.trim().chars().filter(|ch| *ch != ',').collect();
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
