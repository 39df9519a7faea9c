pub mod csv_read;
pub mod excel_read;
pub mod excel_write;

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{info, instrument, warn};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::model::{RawRow, RawTable};

/// Where a population table comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A file on disk.
    Path(PathBuf),
    /// Bytes handed over by a presentation layer, e.g. a browser upload.
    Upload { name: String, bytes: Vec<u8> },
}

impl Source {
    /// Name shown in errors and logs.
    pub fn display_name(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Upload { name, .. } => name.clone(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        let name = match self {
            Source::Path(path) => path.as_os_str().to_string_lossy(),
            Source::Upload { name, .. } => name.as_str().into(),
        };
        SourceFormat::from_name(&name)
    }

    /// Identity used to memoise loads. Rewriting a file on disk changes its key.
    pub fn key(&self) -> Result<SourceKey> {
        match self {
            Source::Path(path) => {
                let canonical = fs::canonicalize(path)
                    .map_err(|err| DashboardError::unreadable(self.display_name(), err))?;
                let metadata = fs::metadata(&canonical)
                    .map_err(|err| DashboardError::unreadable(self.display_name(), err))?;
                Ok(SourceKey::File {
                    path: canonical,
                    modified: metadata.modified().ok(),
                    len: metadata.len(),
                })
            }
            Source::Upload { name, bytes } => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                Ok(SourceKey::Upload {
                    name: name.clone(),
                    len: bytes.len(),
                    digest: hasher.finish(),
                })
            }
        }
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Source::Path(path) => {
                fs::read(path).map_err(|err| DashboardError::unreadable(self.display_name(), err))
            }
            Source::Upload { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    File {
        path: PathBuf,
        modified: Option<SystemTime>,
        len: u64,
    },
    Upload {
        name: String,
        len: usize,
        digest: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Xlsx,
}

impl SourceFormat {
    fn from_name(name: &str) -> Self {
        let is_xlsx = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            SourceFormat::Xlsx
        } else {
            SourceFormat::Delimited
        }
    }
}

/// Reads `source` into a [`RawTable`].
///
/// Numeric cells are left as text; conversion happens during aggregation.
#[instrument(level = "info", skip_all, fields(source = %source.display_name()))]
pub fn load_table(source: &Source, config: &DashboardConfig) -> Result<RawTable> {
    let bytes = source.read_bytes()?;
    let grid = match source.format() {
        SourceFormat::Delimited => csv_read::read_grid(&bytes, config)
            .map_err(|err| reattribute(err, source))?,
        SourceFormat::Xlsx => excel_read::read_grid(bytes)
            .map_err(|err| DashboardError::unreadable(source.display_name(), err))?,
    };
    let table = build_table(grid, &config.region_column)?;
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded population table"
    );
    Ok(table)
}

fn reattribute(err: DashboardError, source: &Source) -> DashboardError {
    match err {
        DashboardError::SourceUnreadable { reason, .. } => {
            DashboardError::unreadable(source.display_name(), reason)
        }
        other => other,
    }
}

/// Turns a decoded grid (header row first) into a table keyed on `region_column`.
pub fn build_table(grid: Vec<Vec<String>>, region_column: &str) -> Result<RawTable> {
    let mut rows = grid.into_iter();
    let headers: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|header| header.trim().to_string())
        .collect();

    let wanted = region_column.trim();
    let region_index = headers
        .iter()
        .position(|header| header == wanted)
        .ok_or_else(|| DashboardError::MissingRequiredColumn(wanted.to_string()))?;

    let mut skipped = 0usize;
    let rows: Vec<RawRow> = rows
        .filter_map(|cells| {
            let label = cells.get(region_index).cloned().unwrap_or_default();
            if label.trim().is_empty() {
                skipped += 1;
                return None;
            }
            Some(RawRow { label, cells })
        })
        .collect();
    if skipped > 0 {
        warn!(skipped, "skipped rows without a region label");
    }

    Ok(RawTable {
        headers,
        region_index,
        rows,
    })
}
