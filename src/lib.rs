//! Core library for the `agepop` command line application.
//!
//! The library turns a monthly population-by-age export into chart-ready
//! series. Source adapters live under [`io`], header and label
//! interpretation in [`resolve`], summation in [`aggregate`], the
//! chart-shape policy in [`chart`], and the per-session cache and
//! orchestration under [`dashboard`].

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod model;
pub mod resolve;

pub use aggregate::aggregate;
pub use chart::{ChartData, ChartKind, build_chart};
pub use config::{AgeColumnRules, DashboardConfig, SourceEncoding};
pub use dashboard::{Dashboard, PreparedTable};
pub use error::{DashboardError, Result};
pub use io::{Source, load_table};
pub use resolve::{extract_region_key, list_region_keys, resolve_age_columns};
