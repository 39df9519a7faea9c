use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::aggregate::aggregate;
use crate::cache::SourceCache;
use crate::chart::{ChartData, ChartKind, build_chart};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::io::excel_write;
use crate::io::{Source, load_table};
use crate::model::{AgeColumn, AggregatedSeries, RawTable};
use crate::resolve::{list_region_keys, resolve_age_columns};

/// A loaded table together with what is derived from it once per load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTable {
    pub table: RawTable,
    pub age_columns: Vec<AgeColumn>,
    pub region_keys: Vec<String>,
}

impl PreparedTable {
    /// Resolves age columns and region keys for a freshly loaded table.
    pub fn prepare(table: RawTable, config: &DashboardConfig) -> Result<Self> {
        let age_columns = resolve_age_columns(&table.headers, &config.age_rules)?;
        let region_keys = list_region_keys(&table);
        info!(
            age_columns = age_columns.len(),
            regions = region_keys.len(),
            "prepared population table"
        );
        Ok(Self {
            table,
            age_columns,
            region_keys,
        })
    }

    pub fn aggregate<S: AsRef<str>>(&self, selection: &[S]) -> Result<AggregatedSeries> {
        aggregate(&self.table, &self.age_columns, selection)
    }
}

/// One user session: the active configuration and the cached source.
#[derive(Debug, Default)]
pub struct Dashboard {
    config: DashboardConfig,
    cache: SourceCache<PreparedTable>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: SourceCache::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Loads and prepares `source`, reusing the previous result when the
    /// source has not changed.
    #[instrument(level = "info", skip_all, fields(source = %source.display_name()))]
    pub fn load(&mut self, source: &Source) -> Result<Arc<PreparedTable>> {
        let key = source.key()?;
        let config = &self.config;
        self.cache.get_or_try_load(key, || {
            let table = load_table(source, config)?;
            PreparedTable::prepare(table, config)
        })
    }

    /// Region keys of the loaded table; empty before the first load.
    pub fn region_keys(&self) -> Vec<String> {
        self.cache
            .current()
            .map(|prepared| prepared.region_keys.clone())
            .unwrap_or_default()
    }

    /// Aggregates `selection` on the loaded table and shapes it for `kind`.
    pub fn render<S: AsRef<str>>(
        &self,
        selection: &[S],
        kind: ChartKind,
    ) -> Result<(AggregatedSeries, ChartData)> {
        let prepared = self
            .cache
            .current()
            .ok_or(DashboardError::NotLoaded)?;
        let series = prepared.aggregate(selection)?;
        let chart = build_chart(&series, kind);
        Ok((series, chart))
    }

    /// Drops the cached table, e.g. when the user supplies a new upload.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

/// Loads `input` and renders `selection` in one go.
#[instrument(level = "info", skip_all, fields(input = %input.display(), ?kind))]
pub fn render_file<S: AsRef<str>>(
    config: DashboardConfig,
    input: &Path,
    selection: &[S],
    kind: ChartKind,
) -> Result<(AggregatedSeries, ChartData)> {
    let mut dashboard = Dashboard::new(config);
    dashboard.load(&Source::Path(input.to_path_buf()))?;
    dashboard.render(selection, kind)
}

pub fn chart_json(chart: &ChartData) -> Result<String> {
    Ok(serde_json::to_string_pretty(chart)?)
}

/// Loads `input`, renders `selection` and returns the chart as pretty JSON.
pub fn chart_to_json<S: AsRef<str>>(
    config: DashboardConfig,
    input: &Path,
    selection: &[S],
    kind: ChartKind,
) -> Result<String> {
    let (_, chart) = render_file(config, input, selection, kind)?;
    chart_json(&chart)
}

/// Loads `input`, renders `selection` and writes chart and aggregate sheets.
#[instrument(level = "info", skip_all, fields(input = %input.display(), output = %output.display(), ?kind))]
pub fn chart_to_excel<S: AsRef<str>>(
    config: DashboardConfig,
    input: &Path,
    output: &Path,
    selection: &[S],
    kind: ChartKind,
) -> Result<()> {
    let (series, chart) = render_file(config, input, selection, kind)?;
    excel_write::write_chart_workbook(output, &chart, &series)
}
