//! Chart-shape policy. The presentation layer receives one of these shapes
//! and draws it; nothing here renders.

use serde::{Deserialize, Serialize};

use crate::model::AggregatedSeries;

/// Chart kind requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Which axis carries the age categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Ages along x.
    Vertical,
    /// Ages along y, oldest on top.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSeries {
    pub region: String,
    /// `(age, count)` points, age ascending.
    pub points: Vec<(u32, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidBar {
    pub age: u32,
    /// Negated count, drawn to the left of the axis.
    pub left: i64,
    pub right: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarGroup {
    pub age: u32,
    /// One bar per region, aligned with [`ChartShape::GroupedBars::regions`].
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartShape {
    Lines {
        series: Vec<LineSeries>,
    },
    Pyramid {
        region: String,
        bars: Vec<PyramidBar>,
    },
    GroupedBars {
        regions: Vec<String>,
        groups: Vec<BarGroup>,
    },
}

/// Chart-ready data handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub orientation: Orientation,
    #[serde(flatten)]
    pub shape: ChartShape,
}

/// Chooses the chart shape for `series` and `kind`.
///
/// Lines always get one series per region. Bars become a mirrored pyramid
/// for a single region and grouped bars otherwise.
pub fn build_chart(series: &AggregatedSeries, kind: ChartKind) -> ChartData {
    let names: Vec<String> = series
        .regions
        .iter()
        .map(|region| region.region.clone())
        .collect();

    match (kind, series.regions.as_slice()) {
        (ChartKind::Line, regions) => ChartData {
            title: format!("{} 연령별 인구 분포", names.join(", ")),
            orientation: Orientation::Vertical,
            shape: ChartShape::Lines {
                series: regions
                    .iter()
                    .map(|region| LineSeries {
                        region: region.region.clone(),
                        points: series
                            .ages
                            .iter()
                            .copied()
                            .zip(region.counts.iter().copied())
                            .collect(),
                    })
                    .collect(),
            },
        },
        (ChartKind::Bar, [single]) => ChartData {
            title: format!("{} 인구 피라미드", single.region),
            orientation: Orientation::Horizontal,
            shape: ChartShape::Pyramid {
                region: single.region.clone(),
                bars: series
                    .ages
                    .iter()
                    .zip(&single.counts)
                    .map(|(age, count)| {
                        let value = i64::try_from(*count).unwrap_or(i64::MAX);
                        PyramidBar {
                            age: *age,
                            left: -value,
                            right: value,
                        }
                    })
                    .collect(),
            },
        },
        (ChartKind::Bar, regions) => ChartData {
            title: format!("{} 연령별 인구 비교", names.join(", ")),
            orientation: Orientation::Vertical,
            shape: ChartShape::GroupedBars {
                regions: names.clone(),
                groups: series
                    .ages
                    .iter()
                    .enumerate()
                    .map(|(position, age)| BarGroup {
                        age: *age,
                        values: regions
                            .iter()
                            .map(|region| {
                                region.counts.get(position).copied().unwrap_or_default()
                            })
                            .collect(),
                    })
                    .collect(),
            },
        },
    }
}
